use axum::{routing::get, Router};

pub mod barcodes;
pub mod items;
pub mod scan;
pub mod system;

/// Router for all inventory endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/inventory", get(items::inventory_list))
        .route("/shopping", get(items::shopping_list))
        .nest("/items", items::router())
        .nest("/barcodes", barcodes::router())
        .nest("/scan", scan::router())
}
