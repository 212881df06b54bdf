//! Barcode scan intents and outcome messages.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use larder_core::{DomainError, Quantity};

use crate::barcode::Barcode;
use crate::item::Item;
use crate::stock::StockAction;

/// What the user meant by scanning a code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanIntent {
    /// Received: add the barcode's quantity to stock.
    #[default]
    Add,
    /// Consumed: take the barcode's quantity out of stock.
    Remove,
    /// Opened a package.
    Open,
}

impl ScanIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanIntent::Add => "add",
            ScanIntent::Remove => "remove",
            ScanIntent::Open => "open",
        }
    }

    /// Reconciliation action for a scan of `barcode`.
    pub fn action(self, barcode: &Barcode) -> StockAction {
        match self {
            ScanIntent::Add => StockAction::ScanAdd {
                quantity: barcode.quantity(),
            },
            ScanIntent::Remove => StockAction::ScanRemove {
                quantity: barcode.quantity(),
            },
            ScanIntent::Open => StockAction::ScanOpen,
        }
    }
}

impl core::fmt::Display for ScanIntent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanIntent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(ScanIntent::Add),
            "remove" => Ok(ScanIntent::Remove),
            "open" => Ok(ScanIntent::Open),
            _ => Err(DomainError::validation(
                "action must be one of: add, remove, open",
            )),
        }
    }
}

/// Human-readable outcome of a successful scan.
///
/// The storage location is kept apart from the main text so a presentation
/// layer can style it as its own segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanMessage {
    pub text: String,
    pub location: Option<String>,
}

impl ScanMessage {
    /// `before` is the item as it was prior to the scan, `after` as persisted.
    pub fn for_scan(intent: ScanIntent, before: &Item, after: &Item, barcode: &Barcode) -> Self {
        let amount = quantity_with_unit(barcode.quantity(), after.unit());
        let text = match intent {
            ScanIntent::Add if before.is_on_shopping_list() => format!(
                "Added {amount} of {} to inventory and updated shopping list",
                after.name()
            ),
            ScanIntent::Add => format!("Added {amount} of {} to inventory", after.name()),
            ScanIntent::Remove => format!(
                "Removed {amount} of {} from inventory and updated shopping list",
                after.name()
            ),
            ScanIntent::Open => format!("Marked {} as open and added to shopping list", after.name()),
        };

        Self {
            text,
            location: after.location().map(str::to_string),
        }
    }

    /// `Store in: <location>`, when the item has one.
    pub fn location_segment(&self) -> Option<String> {
        self.location.as_ref().map(|l| format!("Store in: {l}"))
    }
}

impl core::fmt::Display for ScanMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)?;
        if let Some(segment) = self.location_segment() {
            write!(f, " ({segment})")?;
        }
        Ok(())
    }
}

pub fn barcode_not_found_message(code: &str) -> String {
    format!("Barcode {code} not found. Please add it first.")
}

pub fn insufficient_stock_message(item_name: &str) -> String {
    format!("Not enough {item_name} in inventory to remove")
}

fn quantity_with_unit(quantity: Quantity, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{quantity} {unit}"),
        None => quantity.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::BarcodeDetails;
    use crate::item::{ItemDetails, NewItem};
    use crate::stock::StockLevels;
    use chrono::Utc;
    use larder_core::{BarcodeId, ItemId};

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    fn item(unit: Option<&str>, location: Option<&str>, needed: &str) -> Item {
        Item::create(
            ItemId::new(),
            NewItem {
                details: ItemDetails::new(
                    "Coffee",
                    unit.map(str::to_string),
                    location.map(str::to_string),
                )
                .unwrap(),
                stock: StockLevels::new(q("1"), q(needed), false),
            },
            Utc::now(),
        )
    }

    fn barcode_for(item: &Item, quantity: &str) -> Barcode {
        Barcode::new(
            BarcodeId::new(),
            BarcodeDetails::new("4006381333931", item.id_typed(), q(quantity), None).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn intents_parse_case_insensitively() {
        assert_eq!("ADD".parse::<ScanIntent>().unwrap(), ScanIntent::Add);
        assert_eq!(" remove ".parse::<ScanIntent>().unwrap(), ScanIntent::Remove);
        assert!("eat".parse::<ScanIntent>().is_err());
        assert_eq!(ScanIntent::default(), ScanIntent::Add);
    }

    #[test]
    fn intent_maps_to_barcode_quantity() {
        let it = item(None, None, "0");
        let code = barcode_for(&it, "0.5");
        assert_eq!(ScanIntent::Remove.action(&code), StockAction::ScanRemove { quantity: q("0.5") });
        assert_eq!(ScanIntent::Open.action(&code), StockAction::ScanOpen);
    }

    #[test]
    fn add_message_mentions_shopping_list_only_when_item_was_listed() {
        let listed = item(Some("bags"), None, "2");
        let code = barcode_for(&listed, "1");
        let msg = ScanMessage::for_scan(ScanIntent::Add, &listed, &listed, &code);
        assert_eq!(msg.text, "Added 1 bags of Coffee to inventory and updated shopping list");

        let unlisted = item(Some("bags"), None, "0");
        let msg = ScanMessage::for_scan(ScanIntent::Add, &unlisted, &unlisted, &code);
        assert_eq!(msg.text, "Added 1 bags of Coffee to inventory");
        assert_eq!(msg.location, None);
    }

    #[test]
    fn unit_is_omitted_when_absent() {
        let it = item(None, None, "0");
        let code = barcode_for(&it, "2");
        let msg = ScanMessage::for_scan(ScanIntent::Remove, &it, &it, &code);
        assert_eq!(msg.text, "Removed 2 of Coffee from inventory and updated shopping list");
    }

    #[test]
    fn location_is_a_separate_segment() {
        let it = item(None, Some("Pantry"), "0");
        let code = barcode_for(&it, "1");
        let msg = ScanMessage::for_scan(ScanIntent::Open, &it, &it, &code);
        assert_eq!(msg.text, "Marked Coffee as open and added to shopping list");
        assert_eq!(msg.location_segment().as_deref(), Some("Store in: Pantry"));
        assert_eq!(
            msg.to_string(),
            "Marked Coffee as open and added to shopping list (Store in: Pantry)"
        );
    }

    #[test]
    fn failure_messages() {
        assert_eq!(barcode_not_found_message("999"), "Barcode 999 not found. Please add it first.");
        assert_eq!(insufficient_stock_message("Milk"), "Not enough Milk in inventory to remove");
    }
}
