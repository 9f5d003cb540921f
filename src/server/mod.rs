//! HTTP server implementation
//!
//! This module wires the authentication system into an actix-web server:
//! application state, route registration, and the authorization middleware.

pub mod middleware;
pub mod routes;
pub mod state;

use crate::auth::AuthSystem;
use crate::auth::reset::LogNotifier;
use crate::config::Config;
use crate::storage::StorageLayer;
use crate::utils::error::{GateError, Result};
use actix_web::{App, HttpServer, web};
use state::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Register all routes on a service config
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(routes::health::health))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(routes::auth::register))
                .route("/login", web::post().to(routes::auth::login))
                .route(
                    "/forgot_password",
                    web::post().to(routes::auth::forgot_password),
                )
                .route(
                    "/reset_password/{token}",
                    web::post().to(routes::auth::reset_password),
                ),
        );
}

/// Build application state from configuration
pub fn build_state(config: Config) -> Result<AppState> {
    config.validate()?;

    let storage = Arc::new(StorageLayer::in_memory(&config.auth.rbac));
    let auth = Arc::new(AuthSystem::new(
        &config.auth,
        Arc::clone(&storage),
        Arc::new(LogNotifier),
    ));

    Ok(AppState::new(Arc::new(config), auth, storage))
}

/// Run the server until shutdown
pub async fn run(config: Config) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;

    let state = web::Data::new(build_state(config)?);

    info!("Server starting at http://{}:{}", host, port);
    info!("API endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /auth/register - Create an account");
    info!("   POST /auth/login - Obtain a bearer token");
    info!("   POST /auth/forgot_password - Request a reset token");
    info!("   POST /auth/reset_password/{{token}} - Consume a reset token");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))
    .map_err(|e| GateError::Config(format!("failed to bind {host}:{port}: {e}")))?
    .run()
    .await
    .map_err(|e| GateError::internal(format!("server error: {e}")))
}
