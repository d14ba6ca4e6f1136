use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{Credentials, RegisterRequest};
use super::repository::{AccountRepository, TokenRepository};
use super::service::{IdentityError, IdentityService};

/// Extract the opaque token from an `Authorization` header. `Token <key>` is
/// the canonical scheme; `Bearer <key>` is accepted as an alias.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Router builder exposing sign-up, login, and logout.
pub fn identity_router<U, T>(service: Arc<IdentityService<U, T>>) -> Router
where
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    Router::new()
        .route("/api/v1/users", post(register_handler::<U, T>))
        .route("/api/v1/auth/login", post(login_handler::<U, T>))
        .route("/api/v1/auth/logout", post(logout_handler::<U, T>))
        .with_state(service)
}

pub(crate) async fn register_handler<U, T>(
    State(service): State<Arc<IdentityService<U, T>>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    match service.register(request) {
        Ok(_) => {
            let payload = json!({ "message": "Account created!" });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(IdentityError::Validation(error)) => error.into_response(),
        Err(IdentityError::DuplicateEmail) => {
            let payload = json!({ "email": "Email already exists." });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn login_handler<U, T>(
    State(service): State<Arc<IdentityService<U, T>>>,
    axum::Json(credentials): axum::Json<Credentials>,
) -> Response
where
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    match service.login(&credentials) {
        Ok(token) => (StatusCode::OK, axum::Json(json!({ "token": token }))).into_response(),
        Err(IdentityError::InvalidCredentials) => {
            let payload = json!({ "error": "Invalid credentials" });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn logout_handler<U, T>(
    State(service): State<Arc<IdentityService<U, T>>>,
    headers: HeaderMap,
) -> Response
where
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    let Some(token) = token_from_headers(&headers) else {
        return unauthorized("Authentication required");
    };

    match service.logout(token) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "message": "Logged out" }))).into_response(),
        Err(IdentityError::Unauthorized) => unauthorized("Invalid token"),
        Err(other) => internal_error(other),
    }
}

fn unauthorized(message: &str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn internal_error(error: IdentityError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
