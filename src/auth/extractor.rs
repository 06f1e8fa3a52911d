use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::auth::service::AccessIdentity;
use crate::error::{AppError, AuthError};
use crate::AppState;

/// Extracts the caller from an `Authorization: Bearer <access token>` header.
/// Handlers taking this argument reject unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AccessIdentity);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not registered".into()))?;

    let token = bearer_token(req).ok_or(AuthError::InvalidToken)?;
    let identity = state.sessions.verify_access_token(token)?;
    Ok(AuthenticatedUser(identity))
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
