use chrono::{DateTime, Utc};

use larder_core::{DomainError, DomainResult, ItemId, Quantity};

use crate::stock::{LocationChange, StockChange, StockLevels};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_UNIT_LEN: usize = 20;
pub const MAX_LOCATION_LEN: usize = 100;

/// Descriptive (non-stock) fields of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    pub name: String,
    pub unit: Option<String>,
    pub location: Option<String>,
}

impl ItemDetails {
    /// Validate and normalize user input. Blank `unit`/`location` become `None`.
    pub fn new(
        name: impl Into<String>,
        unit: Option<String>,
        location: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        ensure_max_len("name", &name, MAX_NAME_LEN)?;

        Ok(Self {
            name,
            unit: normalize_label("unit", unit, MAX_UNIT_LEN)?,
            location: normalize_label("location", location, MAX_LOCATION_LEN)?,
        })
    }
}

/// Trim an optional free-text field; blank input counts as absent.
pub fn normalize_label(
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> DomainResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    ensure_max_len(field, value, max_len)?;
    Ok(Some(value.to_string()))
}

pub(crate) fn ensure_max_len(field: &str, value: &str, max_len: usize) -> DomainResult<()> {
    if value.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Input for creating an item: details plus the initial stock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub details: ItemDetails,
    pub stock: StockLevels,
}

/// Entity: an inventory item.
///
/// Stock levels are private; they only change through [`Item::apply_change`],
/// i.e. through the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    details: ItemDetails,
    stock: StockLevels,
    added_at: DateTime<Utc>,
}

impl Item {
    pub fn create(id: ItemId, new: NewItem, added_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details: new.details,
            stock: new.stock,
            added_at,
        }
    }

    /// Rebuild an item loaded from storage.
    pub fn from_parts(
        id: ItemId,
        details: ItemDetails,
        stock: StockLevels,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            details,
            stock,
            added_at,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn unit(&self) -> Option<&str> {
        self.details.unit.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.details.location.as_deref()
    }

    pub fn details(&self) -> &ItemDetails {
        &self.details
    }

    pub fn stock(&self) -> StockLevels {
        self.stock
    }

    pub fn sealed_quantity(&self) -> Quantity {
        self.stock.sealed_quantity
    }

    pub fn quantity_needed(&self) -> Quantity {
        self.stock.quantity_needed
    }

    pub fn is_open(&self) -> bool {
        self.stock.is_open
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn is_on_shopping_list(&self) -> bool {
        self.stock.is_on_shopping_list()
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock.is_in_stock()
    }

    /// Prefill for the purchase form: whatever is currently listed.
    pub fn suggested_purchase_quantity(&self) -> Quantity {
        self.stock.quantity_needed
    }

    /// Prefill for the "add to shopping list" form.
    pub fn suggested_needed_quantity(&self) -> Quantity {
        if self.stock.quantity_needed.is_positive() {
            self.stock.quantity_needed
        } else {
            Quantity::ONE
        }
    }

    /// Replace name, unit and location. Stock is untouched.
    pub fn set_details(&mut self, details: ItemDetails) {
        self.details = details;
    }

    /// Apply a reconciliation change; on a shortfall nothing is modified.
    pub fn apply_change(&mut self, change: &StockChange) -> DomainResult<()> {
        let next = change.apply(self.stock).map_err(|s| {
            DomainError::insufficient_stock(self.details.name.clone(), s.requested, s.available)
        })?;

        if let LocationChange::Set(location) = &change.location {
            self.details.location = location.clone();
        }
        self.stock = next;
        Ok(())
    }
}

impl core::fmt::Display for Item {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
