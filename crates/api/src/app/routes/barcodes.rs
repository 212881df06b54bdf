use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_barcodes).post(create_barcode))
        .route("/:id", get(get_barcode).put(edit_barcode).delete(delete_barcode))
}

pub async fn list_barcodes(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.dispatcher().barcodes().await {
        Ok(barcodes) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": barcodes.len(),
                "barcodes": dto::barcodes_to_json(&barcodes),
            })),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn create_barcode(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BarcodeRequest>,
) -> axum::response::Response {
    let details = match body.into_details() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.dispatcher().create_barcode(details).await {
        Ok(barcode) => (StatusCode::CREATED, Json(dto::barcode_to_json(&barcode))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn get_barcode(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_barcode_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().barcode(id).await {
        Ok(barcode) => (StatusCode::OK, Json(dto::barcode_to_json(&barcode))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn edit_barcode(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::BarcodeRequest>,
) -> axum::response::Response {
    let id = match errors::parse_barcode_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let details = match body.into_details() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.dispatcher().edit_barcode(id, details).await {
        Ok(barcode) => (StatusCode::OK, Json(dto::barcode_to_json(&barcode))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn delete_barcode(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_barcode_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().delete_barcode(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
