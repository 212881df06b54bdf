use rust_decimal::Decimal;
use serde::Deserialize;

use larder_core::{DomainResult, ItemId, Quantity};
use larder_infra::action_dispatcher::ScanOutcome;
use larder_inventory::{Barcode, BarcodeDetails, Item, ItemDetails, NewItem, StockLevels};

// -------------------------
// Request DTOs
// -------------------------
//
// Quantities arrive as raw decimals (JSON number or string) and are validated
// into `Quantity` here, so a bad amount yields the same 400 body as any other
// validation failure.

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub unit: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub sealed_quantity: Decimal,
    #[serde(default)]
    pub quantity_needed: Decimal,
    #[serde(default)]
    pub is_open: bool,
}

impl CreateItemRequest {
    pub fn into_new_item(self) -> DomainResult<NewItem> {
        Ok(NewItem {
            details: ItemDetails::new(self.name, self.unit, self.location)?,
            stock: StockLevels::new(
                Quantity::new(self.sealed_quantity)?,
                Quantity::new(self.quantity_needed)?,
                self.is_open,
            ),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditItemRequest {
    pub name: String,
    pub unit: Option<String>,
    pub location: Option<String>,
}

impl EditItemRequest {
    pub fn into_details(self) -> DomainResult<ItemDetails> {
        ItemDetails::new(self.name, self.unit, self.location)
    }
}

/// Body of purchase and set-needed requests.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub sealed_quantity: Decimal,
    #[serde(default)]
    pub is_open: bool,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BarcodeRequest {
    pub code: String,
    pub item_id: String,
    pub quantity: Decimal,
    pub description: Option<String>,
}

impl BarcodeRequest {
    pub fn into_details(self) -> DomainResult<BarcodeDetails> {
        BarcodeDetails::new(
            self.code,
            self.item_id.parse::<ItemId>()?,
            Quantity::new(self.quantity)?,
            self.description,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
    /// `add` (default), `remove` or `open`.
    pub action: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id_typed().to_string(),
        "name": item.name(),
        "unit": item.unit(),
        "location": item.location(),
        "sealed_quantity": item.sealed_quantity(),
        "quantity_needed": item.quantity_needed(),
        "is_open": item.is_open(),
        "is_on_shopping_list": item.is_on_shopping_list(),
        "added_at": item.added_at().to_rfc3339(),
    })
}

pub fn items_to_json(items: &[Item]) -> serde_json::Value {
    serde_json::json!({
        "count": items.len(),
        "items": items.iter().map(item_to_json).collect::<Vec<_>>(),
    })
}

pub fn barcode_to_json(barcode: &Barcode) -> serde_json::Value {
    serde_json::json!({
        "id": barcode.id_typed().to_string(),
        "code": barcode.code(),
        "item_id": barcode.item_id().to_string(),
        "quantity": barcode.quantity(),
        "description": barcode.description(),
        "created_at": barcode.created_at().to_rfc3339(),
    })
}

pub fn barcodes_to_json(barcodes: &[Barcode]) -> Vec<serde_json::Value> {
    barcodes.iter().map(barcode_to_json).collect()
}

pub fn scan_outcome_to_json(outcome: &ScanOutcome) -> serde_json::Value {
    serde_json::json!({
        "action": outcome.intent,
        "message": outcome.message.text,
        "location": outcome.message.location_segment(),
        "item": item_to_json(&outcome.item),
        "barcode": barcode_to_json(&outcome.barcode),
    })
}
