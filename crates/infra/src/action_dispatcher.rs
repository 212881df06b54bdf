//! Action execution pipeline (application-level orchestration).
//!
//! The `ActionDispatcher` turns a user action or a barcode scan into one
//! store call:
//!
//! ```text
//! action (manual edit, or scan code + intent)
//!   ↓
//! 1. Validate input (before any store access)
//!   ↓
//! 2. Resolve the scan code to its barcode + item (scans only)
//!   ↓
//! 3. Describe the action as a StockChange (pure)
//!   ↓
//! 4. Store applies the change atomically, returns the updated item
//!   ↓
//! 5. Outcome message (scans only)
//! ```
//!
//! Failures leave the stored state untouched and come back as
//! [`DispatchError`]; nothing is retried.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use larder_core::{BarcodeId, DomainError, ItemId, Quantity};
use larder_inventory::scan::{barcode_not_found_message, insufficient_stock_message};
use larder_inventory::{
    Barcode, BarcodeDetails, Item, ItemDetails, NewItem, ScanIntent, ScanMessage, StockAction,
};

use crate::store::{InventoryStore, ItemFilter, StoreError};

/// How many barcodes the scan screen lists.
pub const RECENT_BARCODES: usize = 5;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Input rejected before reaching the engine.
    #[error("{0}")]
    Validation(String),
    /// Unknown item, barcode or scan code.
    #[error("{0}")]
    NotFound(String),
    /// Duplicate item name or barcode code.
    #[error("{0}")]
    Conflict(String),
    /// A removal asked for more than the sealed quantity.
    #[error("{}", insufficient_stock_message(.item))]
    InsufficientStock {
        item: String,
        requested: Quantity,
        available: Quantity,
    },
    /// Backend failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => DispatchError::Validation(msg),
            DomainError::InvalidId(msg) => DispatchError::Validation(msg),
            e @ DomainError::NotFound { .. } => DispatchError::NotFound(e.to_string()),
            DomainError::InsufficientStock {
                item,
                requested,
                available,
            } => DispatchError::InsufficientStock {
                item,
                requested,
                available,
            },
            DomainError::Conflict(msg) => DispatchError::Conflict(msg),
        }
    }
}

impl From<StoreError> for DispatchError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(e) => DispatchError::from(e),
            other => DispatchError::Store(other),
        }
    }
}

/// Result of a processed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub intent: ScanIntent,
    pub barcode: Barcode,
    /// Item state after the scan.
    pub item: Item,
    pub message: ScanMessage,
}

/// Resolves actions and scans against an [`InventoryStore`].
#[derive(Debug)]
pub struct ActionDispatcher<S> {
    store: S,
}

impl<S> ActionDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> ActionDispatcher<S>
where
    S: InventoryStore,
{
    // -------------------------
    // Items
    // -------------------------

    pub async fn create_item(&self, new: NewItem) -> Result<Item, DispatchError> {
        let item = Item::create(ItemId::new(), new, Utc::now());
        let item = self.store.insert_item(item).await?;
        info!(item_id = %item.id_typed(), name = item.name(), "item created");
        Ok(item)
    }

    pub async fn item(&self, id: ItemId) -> Result<Item, DispatchError> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| DomainError::not_found("item", id).into())
    }

    /// Replace name, unit and location; quantities are left alone.
    pub async fn edit_item(&self, id: ItemId, details: ItemDetails) -> Result<Item, DispatchError> {
        let item = self.store.update_item_details(id, details).await?;
        info!(item_id = %id, "item details updated");
        Ok(item)
    }

    /// Delete an item and, with it, all of its barcodes.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), DispatchError> {
        self.store.delete_item(id).await?;
        info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Every item, for pickers such as the barcode form.
    pub async fn items(&self) -> Result<Vec<Item>, DispatchError> {
        Ok(self.store.list_items(ItemFilter::All).await?)
    }

    /// Items physically present: sealed units left or an open one in use.
    pub async fn inventory_list(&self) -> Result<Vec<Item>, DispatchError> {
        Ok(self.store.list_items(ItemFilter::InStock).await?)
    }

    /// Items with a positive quantity needed.
    pub async fn shopping_list(&self) -> Result<Vec<Item>, DispatchError> {
        Ok(self.store.list_items(ItemFilter::ShoppingList).await?)
    }

    // -------------------------
    // Reconciliation
    // -------------------------

    /// Validate `action` and apply it to the item in one atomic store update.
    pub async fn apply(&self, id: ItemId, action: StockAction) -> Result<Item, DispatchError> {
        action.validate()?;
        let change = action.change();

        match self.store.apply_stock_change(id, &change).await {
            Ok(item) => {
                info!(
                    item_id = %id,
                    action = action.name(),
                    sealed_quantity = %item.sealed_quantity(),
                    quantity_needed = %item.quantity_needed(),
                    is_open = item.is_open(),
                    "stock reconciled"
                );
                Ok(item)
            }
            Err(e) => {
                let e = DispatchError::from(e);
                warn!(item_id = %id, action = action.name(), error = %e, "stock action refused");
                Err(e)
            }
        }
    }

    pub async fn purchase(&self, id: ItemId, quantity: Quantity) -> Result<Item, DispatchError> {
        self.apply(id, StockAction::Purchase { quantity }).await
    }

    pub async fn set_needed(&self, id: ItemId, quantity: Quantity) -> Result<Item, DispatchError> {
        self.apply(id, StockAction::SetNeeded { quantity }).await
    }

    pub async fn clear_needed(&self, id: ItemId) -> Result<Item, DispatchError> {
        self.apply(id, StockAction::ClearNeeded).await
    }

    pub async fn toggle_open(&self, id: ItemId) -> Result<Item, DispatchError> {
        self.apply(id, StockAction::ToggleOpen).await
    }

    pub async fn update_quantity(
        &self,
        id: ItemId,
        sealed_quantity: Quantity,
        is_open: bool,
        location: Option<String>,
    ) -> Result<Item, DispatchError> {
        let location = larder_inventory::item::normalize_label(
            "location",
            location,
            larder_inventory::item::MAX_LOCATION_LEN,
        )?;
        self.apply(
            id,
            StockAction::ManualUpdate {
                sealed_quantity,
                is_open,
                location,
            },
        )
        .await
    }

    // -------------------------
    // Barcodes
    // -------------------------

    pub async fn create_barcode(&self, details: BarcodeDetails) -> Result<Barcode, DispatchError> {
        // Resolve the owner first so a bad reference reads as "item not found".
        self.item(details.item_id).await?;
        let barcode = Barcode::new(BarcodeId::new(), details, Utc::now());
        let barcode = self.store.insert_barcode(barcode).await?;
        info!(barcode_id = %barcode.id_typed(), code = barcode.code(), item_id = %barcode.item_id(), "barcode registered");
        Ok(barcode)
    }

    pub async fn barcode(&self, id: BarcodeId) -> Result<Barcode, DispatchError> {
        self.store
            .get_barcode(id)
            .await?
            .ok_or_else(|| DomainError::not_found("barcode", id).into())
    }

    pub async fn edit_barcode(&self, id: BarcodeId, details: BarcodeDetails) -> Result<Barcode, DispatchError> {
        self.item(details.item_id).await?;
        let barcode = self.store.update_barcode(id, details).await?;
        info!(barcode_id = %id, code = barcode.code(), "barcode updated");
        Ok(barcode)
    }

    pub async fn delete_barcode(&self, id: BarcodeId) -> Result<(), DispatchError> {
        self.store.delete_barcode(id).await?;
        info!(barcode_id = %id, "barcode deleted");
        Ok(())
    }

    pub async fn barcodes(&self) -> Result<Vec<Barcode>, DispatchError> {
        Ok(self.store.list_barcodes().await?)
    }

    pub async fn recent_barcodes(&self) -> Result<Vec<Barcode>, DispatchError> {
        Ok(self.store.recent_barcodes(RECENT_BARCODES).await?)
    }

    // -------------------------
    // Scanning
    // -------------------------

    /// Resolve `code`, apply the matching scan action and describe the outcome.
    pub async fn scan(&self, code: &str, intent: ScanIntent) -> Result<ScanOutcome, DispatchError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DispatchError::Validation("barcode cannot be empty".to_string()));
        }

        let Some(barcode) = self.store.find_barcode(code).await? else {
            warn!(code, intent = %intent, "scan of unknown barcode");
            return Err(DispatchError::NotFound(barcode_not_found_message(code)));
        };
        let before = self.item(barcode.item_id()).await?;
        debug!(code, intent = %intent, item_id = %before.id_typed(), "barcode resolved");

        let item = self.apply(before.id_typed(), intent.action(&barcode)).await?;
        let message = ScanMessage::for_scan(intent, &before, &item, &barcode);
        info!(code, intent = %intent, item_id = %item.id_typed(), message = %message, "scan processed");

        Ok(ScanOutcome {
            intent,
            barcode,
            item,
            message,
        })
    }
}
