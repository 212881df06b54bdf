//! Household inventory domain module.
//!
//! This crate contains business rules for items, barcodes and stock
//! reconciliation, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod barcode;
pub mod item;
pub mod scan;
pub mod stock;

pub use barcode::{Barcode, BarcodeDetails};
pub use item::{Item, ItemDetails, NewItem};
pub use scan::{ScanIntent, ScanMessage};
pub use stock::{
    LocationChange, NeededChange, OpenChange, SealedChange, Shortfall, StockAction, StockChange,
    StockLevels,
};
