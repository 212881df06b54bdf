use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use larder_core::{BarcodeId, DomainError, ItemId};
use larder_inventory::{Barcode, BarcodeDetails, Item, ItemDetails, StockChange};

use super::{InventoryStore, ItemFilter, StoreError};

#[derive(Debug, Default)]
struct Records {
    items: HashMap<ItemId, Item>,
    barcodes: HashMap<BarcodeId, Barcode>,
}

impl Records {
    fn ensure_unique_name(&self, name: &str, except: Option<ItemId>) -> Result<(), StoreError> {
        let taken = self
            .items
            .values()
            .any(|i| i.name() == name && Some(i.id_typed()) != except);
        if taken {
            return Err(DomainError::conflict(format!("an item named {name:?} already exists")).into());
        }
        Ok(())
    }

    fn ensure_unique_code(&self, code: &str, except: Option<BarcodeId>) -> Result<(), StoreError> {
        let taken = self
            .barcodes
            .values()
            .any(|b| b.code() == code && Some(b.id_typed()) != except);
        if taken {
            return Err(DomainError::conflict(format!("barcode {code:?} is already registered")).into());
        }
        Ok(())
    }

    fn ensure_item_exists(&self, id: ItemId) -> Result<(), StoreError> {
        if !self.items.contains_key(&id) {
            return Err(DomainError::not_found("item", id).into());
        }
        Ok(())
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<Records>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_item(&self, item: Item) -> Result<Item, StoreError> {
        let mut records = self.write()?;
        records.ensure_unique_name(item.name(), None)?;
        records.items.insert(item.id_typed(), item.clone());
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn update_item_details(&self, id: ItemId, details: ItemDetails) -> Result<Item, StoreError> {
        let mut records = self.write()?;
        records.ensure_item_exists(id)?;
        records.ensure_unique_name(&details.name, Some(id))?;

        let item = records
            .items
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("item", id))?;
        item.set_details(details);
        Ok(item.clone())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let mut records = self.write()?;
        if records.items.remove(&id).is_none() {
            return Err(DomainError::not_found("item", id).into());
        }
        records.barcodes.retain(|_, b| b.item_id() != id);
        Ok(())
    }

    async fn list_items(&self, filter: ItemFilter) -> Result<Vec<Item>, StoreError> {
        let records = self.read()?;
        let mut items: Vec<Item> = records
            .items
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(items)
    }

    async fn apply_stock_change(&self, id: ItemId, change: &StockChange) -> Result<Item, StoreError> {
        // Read, evaluate and write back under one write guard.
        let mut records = self.write()?;
        let item = records
            .items
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("item", id))?;
        item.apply_change(change)?;
        Ok(item.clone())
    }

    async fn insert_barcode(&self, barcode: Barcode) -> Result<Barcode, StoreError> {
        let mut records = self.write()?;
        records.ensure_item_exists(barcode.item_id())?;
        records.ensure_unique_code(barcode.code(), None)?;
        records.barcodes.insert(barcode.id_typed(), barcode.clone());
        Ok(barcode)
    }

    async fn get_barcode(&self, id: BarcodeId) -> Result<Option<Barcode>, StoreError> {
        Ok(self.read()?.barcodes.get(&id).cloned())
    }

    async fn find_barcode(&self, code: &str) -> Result<Option<Barcode>, StoreError> {
        Ok(self
            .read()?
            .barcodes
            .values()
            .find(|b| b.code() == code)
            .cloned())
    }

    async fn update_barcode(&self, id: BarcodeId, details: BarcodeDetails) -> Result<Barcode, StoreError> {
        let mut records = self.write()?;
        records.ensure_item_exists(details.item_id)?;
        records.ensure_unique_code(&details.code, Some(id))?;

        let barcode = records
            .barcodes
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("barcode", id))?;
        barcode.set_details(details);
        Ok(barcode.clone())
    }

    async fn delete_barcode(&self, id: BarcodeId) -> Result<(), StoreError> {
        if self.write()?.barcodes.remove(&id).is_none() {
            return Err(DomainError::not_found("barcode", id).into());
        }
        Ok(())
    }

    async fn list_barcodes(&self) -> Result<Vec<Barcode>, StoreError> {
        let mut barcodes: Vec<Barcode> = self.read()?.barcodes.values().cloned().collect();
        barcodes.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(barcodes)
    }

    async fn recent_barcodes(&self, limit: usize) -> Result<Vec<Barcode>, StoreError> {
        let mut barcodes: Vec<Barcode> = self.read()?.barcodes.values().cloned().collect();
        // UUIDv7 ids break ties between equal timestamps in creation order.
        barcodes.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id_typed().as_uuid().cmp(a.id_typed().as_uuid()))
        });
        barcodes.truncate(limit);
        Ok(barcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use larder_core::Quantity;
    use larder_inventory::{NewItem, StockAction, StockLevels};

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    fn new_item(name: &str, sealed: &str, needed: &str, is_open: bool) -> Item {
        Item::create(
            ItemId::new(),
            NewItem {
                details: ItemDetails::new(name, None, None).unwrap(),
                stock: StockLevels::new(q(sealed), q(needed), is_open),
            },
            Utc::now(),
        )
    }

    fn new_barcode(code: &str, item: &Item) -> Barcode {
        Barcode::new(
            BarcodeId::new(),
            BarcodeDetails::new(code, item.id_typed(), Quantity::ONE, None).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn duplicate_item_names_conflict() {
        let store = InMemoryInventoryStore::new();
        store.insert_item(new_item("Milk", "1", "0", false)).await.unwrap();

        let err = store.insert_item(new_item("Milk", "2", "0", false)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn listings_filter_and_sort_by_name() {
        let store = InMemoryInventoryStore::new();
        store.insert_item(new_item("Yogurt", "0", "2", false)).await.unwrap();
        store.insert_item(new_item("Bread", "0", "0", true)).await.unwrap();
        store.insert_item(new_item("Apples", "3", "1", false)).await.unwrap();
        store.insert_item(new_item("Salt", "0", "0", false)).await.unwrap();

        let names = |items: Vec<Item>| items.iter().map(|i| i.name().to_string()).collect::<Vec<_>>();

        let in_stock = store.list_items(ItemFilter::InStock).await.unwrap();
        assert_eq!(names(in_stock), vec!["Apples", "Bread"]);

        let shopping = store.list_items(ItemFilter::ShoppingList).await.unwrap();
        assert_eq!(names(shopping), vec!["Apples", "Yogurt"]);

        assert_eq!(store.list_items(ItemFilter::All).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn refused_removal_leaves_item_untouched() {
        let store = InMemoryInventoryStore::new();
        let item = store.insert_item(new_item("Rice", "2", "0", false)).await.unwrap();

        let change = StockAction::ScanRemove { quantity: q("5") }.change();
        let err = store.apply_stock_change(item.id_typed(), &change).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InsufficientStock { .. })));

        let after = store.get_item(item.id_typed()).await.unwrap().unwrap();
        assert_eq!(after, item);
    }

    #[tokio::test]
    async fn deleting_an_item_deletes_its_barcodes() {
        let store = InMemoryInventoryStore::new();
        let keep = store.insert_item(new_item("Tea", "1", "0", false)).await.unwrap();
        let gone = store.insert_item(new_item("Beans", "1", "0", false)).await.unwrap();
        store.insert_barcode(new_barcode("111", &keep)).await.unwrap();
        store.insert_barcode(new_barcode("222", &gone)).await.unwrap();

        store.delete_item(gone.id_typed()).await.unwrap();

        assert!(store.find_barcode("222").await.unwrap().is_none());
        assert!(store.find_barcode("111").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn barcode_requires_existing_item_and_unique_code() {
        let store = InMemoryInventoryStore::new();
        let orphan = new_item("Ghost", "0", "0", false);
        let err = store.insert_barcode(new_barcode("333", &orphan)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound { entity: "item", .. })));

        let item = store.insert_item(new_item("Pasta", "1", "0", false)).await.unwrap();
        store.insert_barcode(new_barcode("333", &item)).await.unwrap();
        let err = store.insert_barcode(new_barcode("333", &item)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn recent_barcodes_are_newest_first() {
        let store = InMemoryInventoryStore::new();
        let item = store.insert_item(new_item("Soup", "1", "0", false)).await.unwrap();
        let start = Utc::now();
        for (offset, code) in ["a", "b", "c"].into_iter().enumerate() {
            let barcode = Barcode::new(
                BarcodeId::new(),
                BarcodeDetails::new(code, item.id_typed(), Quantity::ONE, None).unwrap(),
                start + chrono::Duration::seconds(offset as i64),
            );
            store.insert_barcode(barcode).await.unwrap();
        }

        let recent = store.recent_barcodes(2).await.unwrap();
        let codes: Vec<&str> = recent.iter().map(|b| b.code()).collect();
        assert_eq!(codes, vec!["c", "b"]);
    }
}
