//! Durable string key-value area.
//!
//! Values are opaque strings; every write replaces the whole value stored
//! under a key.

use super::db::Db;
use crate::libs::error::AppResult;
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA_KV_STORE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT NOT NULL PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);";
const SELECT_ITEM: &str = "SELECT value FROM kv_store WHERE key = ?";
const UPSERT_ITEM: &str = "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
const DELETE_ITEM: &str = "DELETE FROM kv_store WHERE key = ?";

pub struct KvStore {
    pub conn: Connection,
}

impl KvStore {
    pub fn new() -> AppResult<KvStore> {
        Self::with_db(Db::new()?)
    }

    pub fn with_db(db: Db) -> AppResult<KvStore> {
        db.conn.execute(SCHEMA_KV_STORE, [])?;
        Ok(KvStore { conn: db.conn })
    }

    pub fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let value = self.conn.query_row(SELECT_ITEM, params![key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    pub fn set_item(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.conn.execute(UPSERT_ITEM, params![key, value])?;
        Ok(())
    }

    /// Returns whether a value was stored under `key`.
    pub fn remove_item(&mut self, key: &str) -> AppResult<bool> {
        let removed = self.conn.execute(DELETE_ITEM, params![key])?;
        Ok(removed > 0)
    }
}
