//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;

use config::AppConfig;
use quill_core::ports::{PasswordService, TokenService};
use quill_infra::{Argon2PasswordService, JwtTokenService};
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::from_env();

    let Some(db_config) = config.database else {
        tracing::error!("DATABASE_URL environment variable is required");
        std::process::exit(1);
    };

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    // Build application state; the storage client is owned here and closed at
    // shutdown, never held in a global.
    let (state, db) = AppState::new(&db_config).await.map_err(|e| {
        tracing::error!("Failed to connect to database: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    if let Err(e) = db.close().await {
        tracing::warn!("error closing database connection: {}", e);
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,api_server=debug,quill_infra=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
