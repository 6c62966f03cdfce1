//! # Todolist API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::auth::AuthGate;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "Server exited with error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    tracing::info!(
        "Starting Todolist API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::init(&config).await?;
    let gate = AuthGate::new(&config.gate, state.tokens.clone());
    tracing::info!(gate = ?config.gate, "Auth gate configured");

    HttpServer::new(move || {
        let gate = gate.clone();
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, gate))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
