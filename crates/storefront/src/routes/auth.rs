//! Authentication route handlers.
//!
//! Handles login, registration and logout for username/password accounts.
//! Results are reported through flash messages on the page the user lands on.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Page;
use super::redirect::safe_next;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{RequireAuth, clear_current_user, flash, set_current_user};
use crate::models::{CurrentUser, FlashLevel};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Registration page path.
const REGISTER_PATH: &str = "/auth/register";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
///
/// Missing fields deserialize as empty so the service reports them.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Where to go after logging in.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub username: String,
    /// Validated return path, carried through the form as a hidden field.
    pub next: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(page: Page, Query(query): Query<NextQuery>) -> LoginTemplate {
    LoginTemplate {
        page,
        username: String::new(),
        next: safe_next(query.next.as_deref()).map(str::to_owned),
    }
}

/// Handle login form submission.
///
/// On success the user lands on `next` (from the query string or the form)
/// or the home page. On failure the login page is shown again.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    mut page: Page,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(query.next.as_deref().or(form.next.as_deref())).map(str::to_owned);

    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials | AuthError::MissingFields) => {
            tracing::info!("Login failed");
            page.flash_now(FlashLevel::Error, "Invalid username or password.");
            return Ok(LoginTemplate {
                page,
                username: form.username.trim().to_string(),
                next,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store session: {e}")))?;
    set_sentry_user(&user.id, Some(user.username.as_str()));

    flash::success(&session, format!("Welcome back, {}!", user.username)).await;

    Ok(Redirect::to(next.as_deref().unwrap_or("/")).into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(page: Page) -> RegisterTemplate {
    RegisterTemplate { page }
}

/// Handle registration form submission.
///
/// The new account is not logged in; the user is sent to the login page.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect> {
    let message = match AuthService::new(state.pool())
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => {
            flash::success(&session, "Registration successful. Please log in.").await;
            return Ok(Redirect::to(LOGIN_PATH));
        }
        Err(AuthError::MissingFields) => "Username and password are required.".to_string(),
        Err(AuthError::UserAlreadyExists) => "Username already taken.".to_string(),
        Err(AuthError::InvalidUsername(e)) => format!("Invalid username: {e}."),
        Err(e) => return Err(e.into()),
    };

    flash::error(&session, message).await;
    Ok(Redirect::to(REGISTER_PATH))
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return to the login page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Redirect> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to clear session: {e}")))?;
    clear_sentry_user();

    flash::info(&session, "You have been logged out.").await;
    Ok(Redirect::to(LOGIN_PATH))
}

/// End a session whose account has been deleted and return to the login page.
pub(crate) async fn sign_out_missing_account(session: &Session) -> Result<Redirect> {
    clear_current_user(session)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to clear session: {e}")))?;
    clear_sentry_user();

    flash::error(session, "Your account no longer exists.").await;
    Ok(Redirect::to(LOGIN_PATH))
}
