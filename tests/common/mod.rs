// SPDX-License-Identifier: MIT

pub mod mock_supabase;

use axum::Router;
use crewsync::config::Config;
use crewsync::db::SupabaseDb;
use crewsync::routes::create_router;
use crewsync::services::{Concept2Client, SyncService};
use crewsync::AppState;
use std::sync::Arc;

/// Create a test app with an offline database and an unroutable provider.
///
/// Any handler that hits the network or storage fails loudly, so tests
/// asserting validation behavior also prove no I/O happened first.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_app_with_backends(Config::test_default(), "http://127.0.0.1:1", SupabaseDb::new_mock())
}

/// Create a test app wired to explicit provider/database backends.
#[allow(dead_code)]
pub fn create_app_with_backends(
    config: Config,
    provider_url: &str,
    db: SupabaseDb,
) -> (Router, Arc<AppState>) {
    let concept2 = Concept2Client::with_base_url(
        config.concept2_client_id.clone(),
        config.concept2_client_secret.clone(),
        provider_url.to_string(),
    );
    let sync_service = SyncService::new(concept2.clone(), db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        concept2,
        sync_service,
    });

    (create_router(state.clone()), state)
}

/// Serve a router on an ephemeral local port, returning its base URL.
#[allow(dead_code)]
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock server died");
    });

    format!("http://{}", addr)
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}

/// Build a JSON POST request for the app router.
#[allow(dead_code)]
pub fn json_post(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("Failed to build request")
}
