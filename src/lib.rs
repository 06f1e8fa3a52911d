pub mod auth;
pub mod cats;
pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod validation;

use std::sync::Arc;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthenticatedUser, SessionAuthority, TokenPair};
pub use db::{CatStore, CredentialStore, DbOperations, MemoryStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub sessions: Arc<SessionAuthority>,
    pub cats: Arc<dyn CatStore>,
    db: Option<DbOperations>,
}

impl AppState {
    /// Connects to Postgres, applies migrations and wires the stores.
    pub async fn new(config: Settings) -> Result<Self> {
        let db = DbOperations::connect(&config.database).await?;
        db.run_migrations().await?;
        info!("Database connected and migrations applied");

        let mut state = Self::with_stores(config, Arc::new(db.clone()), Arc::new(db.clone()))?;
        state.db = Some(db);
        Ok(state)
    }

    /// Backs everything with one process-local [`MemoryStore`].
    pub fn in_memory(config: Settings) -> Result<Self> {
        let store = MemoryStore::new();
        Self::with_stores(config, Arc::new(store.clone()), Arc::new(store))
    }

    pub fn with_stores(
        config: Settings,
        credentials: Arc<dyn CredentialStore>,
        cats: Arc<dyn CatStore>,
    ) -> Result<Self> {
        let sessions = SessionAuthority::new(credentials, &config.auth, &config.hashing)?;

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            cats,
            db: None,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(db) = &self.db {
            db.close().await;
        }
        Ok(())
    }
}

/// Registers every route. Shared by `main` and the integration tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .route("/health", web::get().to(health_check))
    .service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::handlers::sign_up))
                    .route("/signin", web::post().to(auth::handlers::sign_in))
                    .route("/refresh", web::post().to(auth::handlers::refresh))
                    .route("/logout", web::post().to(auth::handlers::logout))
                    .route("/profile", web::get().to(auth::handlers::profile)),
            )
            .service(
                web::scope("/cats")
                    .app_data(web::PathConfig::default().error_handler(|_err, _req| {
                        AppError::NotFound("Cat not found".into()).into()
                    }))
                    .route("", web::get().to(cats::handlers::list_cats))
                    .route("", web::post().to(cats::handlers::create_cat))
                    .route("/{id}", web::get().to(cats::handlers::get_cat))
                    .route("/{id}", web::patch().to(cats::handlers::update_cat))
                    .route("/{id}", web::delete().to(cats::handlers::delete_cat)),
            ),
    );
}
