//! Infrastructure layer: persistence backends and the action pipeline that
//! drives them.

pub mod action_dispatcher;
pub mod store;

pub use action_dispatcher::{ActionDispatcher, DispatchError, ScanOutcome};
pub use store::{InMemoryInventoryStore, InventoryStore, ItemFilter, SqliteInventoryStore, StoreError};
