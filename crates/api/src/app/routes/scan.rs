use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use larder_inventory::ScanIntent;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(scan_screen).post(scan))
}

/// What the scan screen shows before anything is scanned.
pub async fn scan_screen(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.dispatcher().recent_barcodes().await {
        Ok(recent) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "default_action": ScanIntent::default(),
                "recent_barcodes": dto::barcodes_to_json(&recent),
            })),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn scan(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ScanRequest>,
) -> axum::response::Response {
    let intent = match body.action.as_deref() {
        None => ScanIntent::default(),
        Some(action) => match action.parse::<ScanIntent>() {
            Ok(v) => v,
            Err(e) => return errors::domain_error_to_response(e),
        },
    };

    match services.dispatcher().scan(&body.barcode, intent).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::scan_outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
