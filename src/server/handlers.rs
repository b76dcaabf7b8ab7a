use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::geocode::{GeocodeError, LocationBatch, ResolvedLocation};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── POST /api/resolve ───────────────────────────────────────────

pub async fn resolve_batch(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<LocationBatch>,
) -> Result<Json<Vec<ResolvedLocation>>, ApiError> {
    let start = Instant::now();

    let resolved = {
        let geocoder = state.geocoder.lock().unwrap();
        geocoder.resolve_batch(&batch)
    };

    match resolved {
        Ok(table) => {
            let elapsed = start.elapsed();
            eprintln!(
                "[{}] POST /api/resolve {} rows -> {} located ({:.1}ms)",
                Utc::now().format("%H:%M:%S"),
                table.len(),
                table.iter().filter(|r| r.lat.is_some()).count(),
                elapsed.as_secs_f64() * 1000.0,
            );
            Ok(Json(table))
        }
        Err(e @ GeocodeError::MalformedBatch(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, format!("{}", e)))
        }
        Err(e) => Err(api_error(StatusCode::BAD_GATEWAY, format!("{}", e))),
    }
}
