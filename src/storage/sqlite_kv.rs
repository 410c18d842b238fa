use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::json_file::parse_product_list;
use super::Backend;
use crate::entity::Product;
use crate::error::{Result, TaarifaError};

/// Default namespaced key the product list is stored under.
pub const DEFAULT_KEY: &str = "taarifa_products";

/// A key-value table in SQLite holding the product list as one JSON blob.
pub struct SqliteKvBackend {
    conn: Connection,
    key: String,
}

impl SqliteKvBackend {
    /// Open or create the database at `path` (`:memory:` for a private in-memory db).
    pub fn open(path: &Path, key: impl Into<String>) -> Result<Self> {
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(path)?
        };

        let backend = Self {
            conn,
            key: key.into(),
        };
        backend.init_schema()?;
        Ok(backend)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Read the raw blob stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous blob.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl Backend for SqliteKvBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> Result<Vec<Product>> {
        let blob = self
            .get(&self.key)
            .map_err(|e| TaarifaError::Persistence(e.to_string()))?;
        match blob {
            Some(data) => parse_product_list(&data),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, products: &[Product]) -> Result<()> {
        let json = serde_json::to_string(products)?;
        self.set(&self.key, &json)
            .map_err(|e| TaarifaError::Persistence(e.to_string()))
    }
}
