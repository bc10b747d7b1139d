//! Cart and wishlist membership types.
//!
//! An entry links one user to one product. Each `(user, product)` pair has
//! at most one cart entry and at most one wishlist entry.

use serde::Serialize;

use shopfront_core::{CartEntryId, Price, ProductId, Quantity, UserId, WishlistEntryId};

use super::Product;

/// A product in a user's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Always at least one; an entry that would reach zero is deleted.
    pub quantity: Quantity,
}

/// A product on a user's wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// A cart entry joined with its product and priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub entry: CartEntry,
    pub product: Product,
    /// `product.price × entry.quantity`.
    pub line_total: Price,
}

/// A user's whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Lines in the order they were first added.
    pub lines: Vec<CartLine>,
    /// Sum of all line totals.
    pub grand_total: Price,
}

impl CartSummary {
    /// Price a list of cart entries.
    #[must_use]
    pub fn from_entries(entries: Vec<(CartEntry, Product)>) -> Self {
        let lines: Vec<CartLine> = entries
            .into_iter()
            .map(|(entry, product)| CartLine {
                line_total: product.price.line_total(entry.quantity),
                entry,
                product,
            })
            .collect();
        let grand_total = lines.iter().map(|line| line.line_total).sum();

        Self { lines, grand_total }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> i64 {
        self.lines
            .iter()
            .map(|line| i64::from(line.entry.quantity.get()))
            .sum()
    }
}

/// A wishlist entry joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistLine {
    pub entry: WishlistEntry,
    pub product: Product,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::CategoryId;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: CategoryId::new(1),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            image_url: None,
        }
    }

    fn entry(id: i32, product_id: i32, quantity: i32) -> CartEntry {
        CartEntry {
            id: CartEntryId::new(id),
            user_id: UserId::new(1),
            product_id: ProductId::new(product_id),
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = CartSummary::from_entries(vec![
            (entry(1, 10, 3), product(10, 1000)),
            (entry(2, 11, 2), product(11, 250)),
        ]);

        assert_eq!(summary.lines[0].line_total, Price::from_cents(3000));
        assert_eq!(summary.lines[1].line_total, Price::from_cents(500));
        assert_eq!(summary.grand_total, Price::from_cents(3500));
        assert_eq!(summary.unit_count(), 5);
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::from_entries(Vec::new());
        assert!(summary.is_empty());
        assert_eq!(summary.grand_total, Price::ZERO);
        assert_eq!(summary.unit_count(), 0);
    }
}
