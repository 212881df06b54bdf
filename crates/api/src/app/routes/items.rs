use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use larder_core::Quantity;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(edit_item).delete(delete_item))
        .route(
            "/:id/needed",
            get(get_needed).post(set_needed).delete(clear_needed),
        )
        .route("/:id/purchase", get(get_purchase).post(purchase))
        .route("/:id/stock", put(update_stock))
        .route("/:id/toggle-open", post(toggle_open))
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.dispatcher().items().await {
        Ok(items) => (StatusCode::OK, Json(dto::items_to_json(&items))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn inventory_list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.dispatcher().inventory_list().await {
        Ok(items) => (StatusCode::OK, Json(dto::items_to_json(&items))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn shopping_list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.dispatcher().shopping_list().await {
        Ok(items) => (StatusCode::OK, Json(dto::items_to_json(&items))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let new_item = match body.into_new_item() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.dispatcher().create_item(new_item).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().item(id).await {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn edit_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::EditItemRequest>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let details = match body.into_details() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.dispatcher().edit_item(id, details).await {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().delete_item(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

/// Prefill for the "set needed" form.
pub async fn get_needed(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().item(id).await {
        Ok(item) => suggestion_response(&item, item.suggested_needed_quantity()),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn set_needed(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let quantity = match Quantity::new(body.quantity) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.dispatcher().set_needed(id, quantity).await {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn clear_needed(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().clear_needed(id).await {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

/// Prefill for the purchase form.
pub async fn get_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().item(id).await {
        Ok(item) => suggestion_response(&item, item.suggested_purchase_quantity()),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let quantity = match Quantity::new(body.quantity) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.dispatcher().purchase(id, quantity).await {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStockRequest>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let sealed = match Quantity::new(body.sealed_quantity) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .dispatcher()
        .update_quantity(id, sealed, body.is_open, body.location)
        .await
    {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn toggle_open(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.dispatcher().toggle_open(id).await {
        Ok(item) => item_response(&item),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

fn item_response(item: &larder_inventory::Item) -> axum::response::Response {
    (StatusCode::OK, Json(dto::item_to_json(item))).into_response()
}

fn suggestion_response(item: &larder_inventory::Item, suggested: Quantity) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "item": dto::item_to_json(item),
            "suggested_quantity": suggested,
        })),
    )
        .into_response()
}
