use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::extractor::AuthenticatedUser;
use crate::auth::tokens::TokenPair;
use crate::config::Settings;
use crate::error::{AppError, AuthError};
use crate::response::ApiResponse;
use crate::validation::{validate_email, validate_name, validate_password};
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

impl SignUpRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_email(self.email.trim())?;
        validate_password(&self.password)?;
        validate_name(self.name.trim())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenBody {
    pub access_token: String,
}

fn refresh_cookie(settings: &Settings, token: String) -> Cookie<'static> {
    Cookie::build(settings.auth.cookie_name.clone(), token)
        .http_only(true)
        .secure(settings.is_production())
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(CookieDuration::seconds(settings.auth.refresh_ttl_secs))
        .finish()
}

/// Access token in the body, refresh token only in the HttpOnly cookie.
fn token_response(
    mut builder: actix_web::HttpResponseBuilder,
    settings: &Settings,
    message: &str,
    pair: TokenPair,
) -> HttpResponse {
    builder
        .cookie(refresh_cookie(settings, pair.refresh_token))
        .json(ApiResponse::success(
            message,
            AccessTokenBody { access_token: pair.access_token },
        ))
}

fn presented_refresh_token(req: &HttpRequest, settings: &Settings) -> Result<String, AppError> {
    req.cookie(&settings.auth.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::AccessDenied.into())
}

pub async fn sign_up(
    req: web::Json<SignUpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received sign-up request for email: {}", req.email);
    req.validate()?;

    let pair = state
        .sessions
        .sign_up(&req.email, &req.password, &req.name)
        .await?;

    Ok(token_response(
        HttpResponse::Created(),
        &state.config,
        "User signed up successfully",
        pair,
    ))
}

pub async fn sign_in(
    req: web::Json<SignInRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received sign-in request for email: {}", req.email);

    let pair = match state.sessions.sign_in(&req.email, &req.password).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!("Sign-in failed for email: {}", req.email);
            return Err(e);
        }
    };

    Ok(token_response(
        HttpResponse::Ok(),
        &state.config,
        "User signed in successfully",
        pair,
    ))
}

pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let presented = presented_refresh_token(&req, &state.config)?;
    let pair = state.sessions.refresh_tokens(&presented).await?;

    Ok(token_response(
        HttpResponse::Ok(),
        &state.config,
        "Tokens refreshed successfully",
        pair,
    ))
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let presented = presented_refresh_token(&req, &state.config)?;
    state.sessions.logout(&presented).await?;

    let mut removal = refresh_cookie(&state.config, String::new());
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(ApiResponse::message("Logged out successfully")))
}

pub async fn profile(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = state.sessions.profile(user.0.subject_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "User information retrieved successfully",
        profile,
    )))
}
