mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::geocode::{BatchGeocoder, NominatimOracle};

pub fn build_router(geocoder: BatchGeocoder<NominatimOracle>) -> Router {
    let state = Arc::new(AppState {
        geocoder: Mutex::new(geocoder),
    });

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/resolve", post(handlers::resolve_batch))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, geocoder: BatchGeocoder<NominatimOracle>) {
    let app = build_router(geocoder);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  News Atlas server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
