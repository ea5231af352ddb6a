#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::json;
use taskflow::auth::{AuthMiddleware, AuthResponse, TokenCodec};
use taskflow::routes::{self, health};
use taskflow::state::AppState;
use taskflow::store::{MemoryTaskStore, MemoryUserStore};

pub const SECRET: &str = "t3sT-s1gn1ng-K3y-f0r-1nt3grat10n-sU1te!";
pub const PASSWORD: &str = "Password123!";

/// Lowest cost bcrypt accepts; keeps the suites fast.
pub const BCRYPT_COST: u32 = 4;

pub struct TestContext {
    pub state: AppState,
    /// Same store as `state.users`, kept concrete so tests can remove accounts.
    pub users: Arc<MemoryUserStore>,
}

pub fn codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(SECRET.as_bytes(), Duration::hours(24)).unwrap())
}

pub fn context() -> TestContext {
    let users = Arc::new(MemoryUserStore::new());
    let state = AppState::new(
        users.clone(),
        Arc::new(MemoryTaskStore::new()),
        codec(),
        BCRYPT_COST,
    );
    TestContext { state, users }
}

/// The full application as `main` assembles it, over the given state.
pub async fn init_app(
    state: &AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let authenticator = Arc::new(state.authenticator("/api/auth/"));
    test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(AuthMiddleware::new(authenticator))
            .wrap(Logger::default())
            .wrap(routes::cors(&[]))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

/// Registers `email` and returns the issued token and id.
pub async fn signup(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Test User",
            "email": email,
            "password": PASSWORD
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "signup for {} failed",
        email
    );
    test::read_body_json(resp).await
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
