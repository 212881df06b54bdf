//! Record store for items and barcodes.
//!
//! The reconciliation engine never writes fields itself: it hands the store a
//! [`StockChange`] and the store executes it as one atomic update (a single
//! locked section in memory, a single `UPDATE` statement in SQLite). That
//! keeps concurrent requests against the same item from losing increments.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use larder_core::{BarcodeId, DomainError, ItemId};
use larder_inventory::{Barcode, BarcodeDetails, Item, ItemDetails, StockChange};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryInventoryStore;
pub use sqlite::SqliteInventoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Not found, duplicate key, insufficient stock, ...
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Which items a listing returns. Listings are ordered by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    /// `sealed_quantity > 0 OR is_open`.
    InStock,
    /// `quantity_needed > 0`.
    ShoppingList,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::InStock => item.is_in_stock(),
            ItemFilter::ShoppingList => item.is_on_shopping_list(),
        }
    }
}

/// Persistence boundary for items and barcodes.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Insert a new item. Fails with `Conflict` on a duplicate name.
    async fn insert_item(&self, item: Item) -> Result<Item, StoreError>;

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Replace name, unit and location.
    async fn update_item_details(&self, id: ItemId, details: ItemDetails) -> Result<Item, StoreError>;

    /// Delete an item together with all of its barcodes.
    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError>;

    async fn list_items(&self, filter: ItemFilter) -> Result<Vec<Item>, StoreError>;

    /// Atomically apply a reconciliation change and return the updated item.
    ///
    /// A shortfall fails with `InsufficientStock` and leaves the row untouched.
    async fn apply_stock_change(&self, id: ItemId, change: &StockChange) -> Result<Item, StoreError>;

    /// Insert a new barcode. Fails with `Conflict` on a duplicate code and
    /// `NotFound` when the owning item does not exist.
    async fn insert_barcode(&self, barcode: Barcode) -> Result<Barcode, StoreError>;

    async fn get_barcode(&self, id: BarcodeId) -> Result<Option<Barcode>, StoreError>;

    async fn find_barcode(&self, code: &str) -> Result<Option<Barcode>, StoreError>;

    async fn update_barcode(&self, id: BarcodeId, details: BarcodeDetails) -> Result<Barcode, StoreError>;

    async fn delete_barcode(&self, id: BarcodeId) -> Result<(), StoreError>;

    /// All barcodes ordered by code.
    async fn list_barcodes(&self) -> Result<Vec<Barcode>, StoreError>;

    /// Most recently created barcodes, newest first.
    async fn recent_barcodes(&self, limit: usize) -> Result<Vec<Barcode>, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn insert_item(&self, item: Item) -> Result<Item, StoreError> {
        (**self).insert_item(item).await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get_item(id).await
    }

    async fn update_item_details(&self, id: ItemId, details: ItemDetails) -> Result<Item, StoreError> {
        (**self).update_item_details(id, details).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        (**self).delete_item(id).await
    }

    async fn list_items(&self, filter: ItemFilter) -> Result<Vec<Item>, StoreError> {
        (**self).list_items(filter).await
    }

    async fn apply_stock_change(&self, id: ItemId, change: &StockChange) -> Result<Item, StoreError> {
        (**self).apply_stock_change(id, change).await
    }

    async fn insert_barcode(&self, barcode: Barcode) -> Result<Barcode, StoreError> {
        (**self).insert_barcode(barcode).await
    }

    async fn get_barcode(&self, id: BarcodeId) -> Result<Option<Barcode>, StoreError> {
        (**self).get_barcode(id).await
    }

    async fn find_barcode(&self, code: &str) -> Result<Option<Barcode>, StoreError> {
        (**self).find_barcode(code).await
    }

    async fn update_barcode(&self, id: BarcodeId, details: BarcodeDetails) -> Result<Barcode, StoreError> {
        (**self).update_barcode(id, details).await
    }

    async fn delete_barcode(&self, id: BarcodeId) -> Result<(), StoreError> {
        (**self).delete_barcode(id).await
    }

    async fn list_barcodes(&self) -> Result<Vec<Barcode>, StoreError> {
        (**self).list_barcodes().await
    }

    async fn recent_barcodes(&self, limit: usize) -> Result<Vec<Barcode>, StoreError> {
        (**self).recent_barcodes(limit).await
    }
}
