//! Cart and wishlist error types.

use shopfront_core::QuantityError;
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors returned by cart and wishlist operations.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// The entry does not exist or belongs to another user.
    ///
    /// Both cases are reported identically so entry IDs of other users
    /// cannot be probed.
    #[error("entry not found")]
    NotFound,

    /// The product being added does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The logged-in account was deleted while its session was still live.
    #[error("user not found")]
    UserNotFound,

    /// A submitted quantity could not be parsed.
    #[error("invalid quantity: {0}")]
    InvalidInput(#[from] QuantityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl MembershipError {
    /// Classify a store error from an add, where the missing row can be
    /// either the product or the user.
    pub(crate) fn from_add(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::ProductNotFound,
            RepositoryError::UserNotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_errors_name_the_missing_row() {
        assert!(matches!(
            MembershipError::from_add(RepositoryError::NotFound),
            MembershipError::ProductNotFound
        ));
        assert!(matches!(
            MembershipError::from_add(RepositoryError::UserNotFound),
            MembershipError::UserNotFound
        ));
        assert!(matches!(
            MembershipError::from_add(RepositoryError::Conflict("x".into())),
            MembershipError::Repository(RepositoryError::Conflict(_))
        ));
    }
}
