//! One-shot flash messages stored in the session.
//!
//! Handlers push a message before redirecting; the next rendered page drains
//! the queue.

use tower_sessions::Session;

use crate::models::{FlashLevel, FlashMessage, session_keys};

/// Queue a message for the next rendered page.
///
/// Failures are logged and swallowed; a lost message never fails a request.
pub async fn push_flash(session: &Session, level: FlashLevel, text: impl Into<String>) {
    let mut messages = peek(session).await;
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });

    if let Err(e) = session.insert(session_keys::FLASH, messages).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take all pending messages, leaving the queue empty.
pub async fn take_flashes(session: &Session) -> Vec<FlashMessage> {
    match session.remove::<Vec<FlashMessage>>(session_keys::FLASH).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

async fn peek(session: &Session) -> Vec<FlashMessage> {
    session
        .get::<Vec<FlashMessage>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Shorthand for [`FlashLevel::Success`].
pub async fn success(session: &Session, text: impl Into<String>) {
    push_flash(session, FlashLevel::Success, text).await;
}

/// Shorthand for [`FlashLevel::Info`].
pub async fn info(session: &Session, text: impl Into<String>) {
    push_flash(session, FlashLevel::Info, text).await;
}

/// Shorthand for [`FlashLevel::Warning`].
pub async fn warning(session: &Session, text: impl Into<String>) {
    push_flash(session, FlashLevel::Warning, text).await;
}

/// Shorthand for [`FlashLevel::Error`].
pub async fn error(session: &Session, text: impl Into<String>) {
    push_flash(session, FlashLevel::Error, text).await;
}
