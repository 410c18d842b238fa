//! Product storage: one store type over swappable persistence backends.

mod json_file;
mod memory;
mod product_store;
mod sqlite_kv;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use product_store::ProductStore;
pub use sqlite_kv::{SqliteKvBackend, DEFAULT_KEY};

use crate::entity::Product;
use crate::error::Result;

/// Persistence medium behind a [`ProductStore`].
///
/// Backends only move whole product lists in and out; the store owns the
/// canonical list and decides when to persist it.
pub trait Backend: Send {
    /// Short name used in logs and status output.
    fn name(&self) -> &'static str;

    /// Read every persisted product, in insertion order.
    fn load(&self) -> Result<Vec<Product>>;

    /// Replace the persisted list with `products`.
    fn persist(&self, products: &[Product]) -> Result<()>;
}
