// SPDX-License-Identifier: MIT

//! Crewsync API Server
//!
//! Backend for the rowing club management app: exchanges Concept2 OAuth
//! tokens, verifies them, and syncs rower workouts into Supabase.

use crewsync::{
    config::Config,
    db::SupabaseDb,
    services::{Concept2Client, SyncService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Crewsync API");

    // Initialize Supabase REST client
    let db = SupabaseDb::new(&config.supabase_url, &config.supabase_service_key);
    tracing::info!(url = %config.supabase_url, "Supabase client initialized");

    // Initialize Concept2 client and sync service
    let concept2 = Concept2Client::new(
        config.concept2_client_id.clone(),
        config.concept2_client_secret.clone(),
    );
    let sync_service = SyncService::new(concept2.clone(), db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        concept2,
        sync_service,
    });

    // Build router
    let app = crewsync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crewsync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
