//! SQLite-backed record store.
//!
//! Quantities are persisted as INTEGER hundredths of a unit so the atomic
//! `UPDATE ... SET col = col + ?` deltas stay exact. Every stock change is
//! one `UPDATE` statement; the shortfall guard for removals is part of its
//! `WHERE` clause, so a refused removal touches no row.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;

use larder_core::{BarcodeId, DomainError, ItemId, Quantity};
use larder_inventory::{
    Barcode, BarcodeDetails, Item, ItemDetails, LocationChange, NeededChange, OpenChange,
    SealedChange, StockChange, StockLevels,
};

use super::{InventoryStore, ItemFilter, StoreError};

const ITEM_COLUMNS: &str =
    "id, name, sealed_quantity, unit, quantity_needed, is_open, location, added_at";
const BARCODE_COLUMNS: &str = "id, code, item_id, quantity, description, created_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL UNIQUE,
        sealed_quantity INTEGER NOT NULL DEFAULT 0 CHECK (sealed_quantity >= 0),
        unit            TEXT NULL,
        quantity_needed INTEGER NOT NULL DEFAULT 0 CHECK (quantity_needed >= 0),
        is_open         INTEGER NOT NULL DEFAULT 0,
        location        TEXT NULL,
        added_at        TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS barcodes (
        id          TEXT PRIMARY KEY,
        code        TEXT NOT NULL UNIQUE,
        item_id     TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
        quantity    INTEGER NOT NULL CHECK (quantity > 0),
        description TEXT NULL,
        created_at  TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS barcodes_item_id ON barcodes (item_id)",
];

/// SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    /// Connect to `url` (e.g. `sqlite://larder.db`), creating the file and
    /// schema if missing.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database (tests/dev). A single connection is kept
    /// open for the lifetime of the pool so the database is not dropped.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("sqlite schema ready");
        Ok(())
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn fetch_barcode(&self, id: BarcodeId) -> Result<Option<Barcode>, StoreError> {
        let row = sqlx::query(&format!("SELECT {BARCODE_COLUMNS} FROM barcodes WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(barcode_from_row).transpose()
    }
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn insert_item(&self, item: Item) -> Result<Item, StoreError> {
        let stock = item.stock();
        sqlx::query(
            r#"
            INSERT INTO items (id, name, sealed_quantity, unit, quantity_needed, is_open, location, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id_typed().to_string())
        .bind(item.name())
        .bind(stock.sealed_quantity.hundredths())
        .bind(item.unit())
        .bind(stock.quantity_needed.hundredths())
        .bind(stock.is_open)
        .bind(item.location())
        .bind(item.added_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("an item named {:?} already exists", item.name())))?;
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        self.fetch_item(id).await
    }

    async fn update_item_details(&self, id: ItemId, details: ItemDetails) -> Result<Item, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE items SET name = ?, unit = ?, location = ? WHERE id = ? RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&details.name)
        .bind(details.unit.as_deref())
        .bind(details.location.as_deref())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("an item named {:?} already exists", details.name)))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(DomainError::not_found("item", id).into()),
        }
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        // Explicit as well as ON DELETE CASCADE: pools opened elsewhere may
        // not have foreign keys enabled.
        sqlx::query("DELETE FROM barcodes WHERE item_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(DomainError::not_found("item", id).into());
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_items(&self, filter: ItemFilter) -> Result<Vec<Item>, StoreError> {
        let condition = match filter {
            ItemFilter::All => "1 = 1",
            ItemFilter::InStock => "sealed_quantity > 0 OR is_open = 1",
            ItemFilter::ShoppingList => "quantity_needed > 0",
        };
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE {condition} ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn apply_stock_change(&self, id: ItemId, change: &StockChange) -> Result<Item, StoreError> {
        let mut qb = stock_update(id, change);
        let row = qb.build().fetch_optional(&self.pool).await?;
        if let Some(row) = row {
            return item_from_row(&row);
        }

        // No row updated: either the item is gone or the removal guard failed.
        let current = self
            .fetch_item(id)
            .await?
            .ok_or_else(|| DomainError::not_found("item", id))?;
        let requested = match change.sealed {
            SealedChange::Remove(q) => q,
            _ => return Err(StoreError::Corrupt(format!("stock update for item {id} matched no row"))),
        };
        Err(DomainError::insufficient_stock(current.name(), requested, current.sealed_quantity()).into())
    }

    async fn insert_barcode(&self, barcode: Barcode) -> Result<Barcode, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO barcodes (id, code, item_id, quantity, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(barcode.id_typed().to_string())
        .bind(barcode.code())
        .bind(barcode.item_id().to_string())
        .bind(barcode.quantity().hundredths())
        .bind(barcode.description())
        .bind(barcode.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if foreign_key_violation(&e) {
                DomainError::not_found("item", barcode.item_id()).into()
            } else {
                map_write_error(e, || format!("barcode {:?} is already registered", barcode.code()))
            }
        })?;
        Ok(barcode)
    }

    async fn get_barcode(&self, id: BarcodeId) -> Result<Option<Barcode>, StoreError> {
        self.fetch_barcode(id).await
    }

    async fn find_barcode(&self, code: &str) -> Result<Option<Barcode>, StoreError> {
        let row = sqlx::query(&format!("SELECT {BARCODE_COLUMNS} FROM barcodes WHERE code = ?"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(barcode_from_row).transpose()
    }

    async fn update_barcode(&self, id: BarcodeId, details: BarcodeDetails) -> Result<Barcode, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE barcodes SET code = ?, item_id = ?, quantity = ?, description = ? WHERE id = ? RETURNING {BARCODE_COLUMNS}"
        ))
        .bind(&details.code)
        .bind(details.item_id.to_string())
        .bind(details.quantity.hundredths())
        .bind(details.description.as_deref())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if foreign_key_violation(&e) {
                DomainError::not_found("item", details.item_id).into()
            } else {
                map_write_error(e, || format!("barcode {:?} is already registered", details.code))
            }
        })?;

        match row {
            Some(row) => barcode_from_row(&row),
            None => Err(DomainError::not_found("barcode", id).into()),
        }
    }

    async fn delete_barcode(&self, id: BarcodeId) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM barcodes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(DomainError::not_found("barcode", id).into());
        }
        Ok(())
    }

    async fn list_barcodes(&self) -> Result<Vec<Barcode>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {BARCODE_COLUMNS} FROM barcodes ORDER BY code"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(barcode_from_row).collect()
    }

    async fn recent_barcodes(&self, limit: usize) -> Result<Vec<Barcode>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {BARCODE_COLUMNS} FROM barcodes ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(barcode_from_row).collect()
    }
}

/// Build the single `UPDATE ... RETURNING` statement for a stock change.
fn stock_update(id: ItemId, change: &StockChange) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("UPDATE items SET sealed_quantity = ");
    match change.sealed {
        SealedChange::Keep => {
            qb.push("sealed_quantity");
        }
        SealedChange::Add(q) => {
            qb.push("sealed_quantity + ").push_bind(q.hundredths());
        }
        SealedChange::Remove(q) => {
            qb.push("sealed_quantity - ").push_bind(q.hundredths());
        }
        SealedChange::Set(q) => {
            qb.push_bind(q.hundredths());
        }
    }

    qb.push(", quantity_needed = ");
    match change.needed {
        NeededChange::Keep => {
            qb.push("quantity_needed");
        }
        NeededChange::Set(q) => {
            qb.push_bind(q.hundredths());
        }
        NeededChange::Add(q) => {
            qb.push("quantity_needed + ").push_bind(q.hundredths());
        }
        NeededChange::ReduceBy(q) => {
            qb.push("MAX(quantity_needed - ").push_bind(q.hundredths()).push(", 0)");
        }
        NeededChange::EnrollIfClear(q) => {
            qb.push("CASE WHEN quantity_needed = 0 THEN ")
                .push_bind(q.hundredths())
                .push(" ELSE quantity_needed END");
        }
    }

    qb.push(", is_open = ");
    match change.open {
        OpenChange::Keep => {
            qb.push("is_open");
        }
        OpenChange::Set(v) => {
            qb.push_bind(v);
        }
        OpenChange::Toggle => {
            qb.push("CASE WHEN is_open = 0 THEN 1 ELSE 0 END");
        }
    }

    if let LocationChange::Set(location) = &change.location {
        qb.push(", location = ").push_bind(location.clone());
    }

    qb.push(" WHERE id = ").push_bind(id.to_string());
    if let SealedChange::Remove(q) = change.sealed {
        qb.push(" AND sealed_quantity >= ").push_bind(q.hundredths());
    }
    qb.push(" RETURNING ").push(ITEM_COLUMNS);
    qb
}

fn foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn map_write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::conflict(conflict()).into(),
        _ => StoreError::Database(err),
    }
}

fn corrupt(what: &str, e: impl core::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{what}: {e}"))
}

fn quantity_column(row: &SqliteRow, column: &str) -> Result<Quantity, StoreError> {
    let hundredths: i64 = row.try_get(column)?;
    Quantity::from_hundredths(hundredths).map_err(|e| corrupt(column, e))
}

fn item_from_row(row: &SqliteRow) -> Result<Item, StoreError> {
    let id: String = row.try_get("id")?;
    let id = ItemId::from_str(&id).map_err(|e| corrupt("items.id", e))?;
    let added_at: DateTime<Utc> = row.try_get("added_at")?;

    let details = ItemDetails {
        name: row.try_get("name")?,
        unit: row.try_get("unit")?,
        location: row.try_get("location")?,
    };
    let stock = StockLevels::new(
        quantity_column(row, "sealed_quantity")?,
        quantity_column(row, "quantity_needed")?,
        row.try_get("is_open")?,
    );
    Ok(Item::from_parts(id, details, stock, added_at))
}

fn barcode_from_row(row: &SqliteRow) -> Result<Barcode, StoreError> {
    let id: String = row.try_get("id")?;
    let id = BarcodeId::from_str(&id).map_err(|e| corrupt("barcodes.id", e))?;
    let item_id: String = row.try_get("item_id")?;
    let item_id = ItemId::from_str(&item_id).map_err(|e| corrupt("barcodes.item_id", e))?;

    let details = BarcodeDetails {
        code: row.try_get("code")?,
        item_id,
        quantity: quantity_column(row, "quantity")?,
        description: row.try_get("description")?,
    };
    Ok(Barcode::new(id, details, row.try_get("created_at")?))
}
