use chrono::{DateTime, Utc};

use larder_core::{BarcodeId, DomainError, DomainResult, ItemId, Quantity};

use crate::item::{ensure_max_len, normalize_label};

pub const MAX_CODE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Editable fields of a barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeDetails {
    /// Scanned value; unique across all barcodes.
    pub code: String,
    /// Owning item. Deleting the item deletes the barcode.
    pub item_id: ItemId,
    /// How much one scan adds or removes.
    pub quantity: Quantity,
    /// e.g. "1lb box", "12oz can".
    pub description: Option<String>,
}

impl BarcodeDetails {
    pub fn new(
        code: impl Into<String>,
        item_id: ItemId,
        quantity: Quantity,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(DomainError::validation("barcode cannot be empty"));
        }
        ensure_max_len("barcode", &code, MAX_CODE_LEN)?;

        if quantity.is_zero() {
            return Err(DomainError::validation(
                "barcode quantity must be at least 0.01",
            ));
        }

        Ok(Self {
            code,
            item_id,
            quantity,
            description: normalize_label("description", description, MAX_DESCRIPTION_LEN)?,
        })
    }
}

/// Entity: a scan code mapped to an item and a represented quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    id: BarcodeId,
    details: BarcodeDetails,
    created_at: DateTime<Utc>,
}

impl Barcode {
    pub fn new(id: BarcodeId, details: BarcodeDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at,
        }
    }

    pub fn id_typed(&self) -> BarcodeId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.details.code
    }

    pub fn item_id(&self) -> ItemId {
        self.details.item_id
    }

    pub fn quantity(&self) -> Quantity {
        self.details.quantity
    }

    pub fn description(&self) -> Option<&str> {
        self.details.description.as_deref()
    }

    pub fn details(&self) -> &BarcodeDetails {
        &self.details
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_details(&mut self, details: BarcodeDetails) {
        self.details = details;
    }
}
