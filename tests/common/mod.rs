#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::test::TestRequest;
use actix_web::web;
use catbox_server::{AppState, Settings};
use serde_json::json;

pub const PASSWORD: &str = "Passw0rd!";
pub const COOKIE: &str = "refreshToken";

/// Fresh in-memory state with fast hashing parameters.
pub fn state() -> web::Data<AppState> {
    let config = Settings::new_for_test().expect("Failed to load test config");
    web::Data::new(AppState::in_memory(config).expect("Failed to build state"))
}

/// Full application over in-memory stores.
macro_rules! test_app {
    () => {
        test_app!(common::state())
    };
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state)
                .configure(catbox_server::configure_routes),
        )
        .await
    };
}

pub fn sign_up(email: &str, name: &str) -> TestRequest {
    TestRequest::post().uri("/api/auth/signup").set_json(json!({
        "email": email,
        "password": PASSWORD,
        "name": name,
    }))
}

pub fn sign_in(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({ "email": email, "password": password }))
}

pub fn with_refresh(req: TestRequest, token: &str) -> TestRequest {
    req.cookie(Cookie::new(COOKIE, token.to_string()))
}

pub fn bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", token)))
}

pub fn refresh_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE)
        .map(|c| c.into_owned())
}

pub fn access_token(body: &serde_json::Value) -> String {
    body["data"]["accessToken"]
        .as_str()
        .expect("response should carry an access token")
        .to_string()
}
