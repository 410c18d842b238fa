use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::{Backend, MemoryBackend};
use crate::entity::{Product, ProductUpdate};
use crate::error::{Result, TaarifaError};
use crate::identity::{generate_id, HashStrategy};

/// Attempts at drawing an id not already present in the store.
const MAX_ID_ATTEMPTS: usize = 16;

/// Owns the canonical product list and writes it through to a [`Backend`].
///
/// Every mutation is applied in memory first and persisted afterwards.
/// Persistence failures are logged and do not undo the in-memory change.
/// Readers always get copies, never the backing list.
pub struct ProductStore {
    products: Vec<Product>,
    backend: Box<dyn Backend>,
    strategy: HashStrategy,
}

impl ProductStore {
    /// Open a store over `backend`. Unreadable or malformed persisted data is
    /// logged and the store starts empty.
    pub fn open(backend: Box<dyn Backend>, strategy: HashStrategy) -> Self {
        let products = match backend.load() {
            Ok(products) => products,
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "failed to load products, starting empty");
                Vec::new()
            }
        };
        debug!(backend = backend.name(), count = products.len(), "product store opened");

        Self {
            products,
            backend,
            strategy,
        }
    }

    /// A store that keeps nothing outside the process.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryBackend), HashStrategy::default())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn hash_strategy(&self) -> HashStrategy {
        self.strategy
    }

    /// Create and append a new product. Callers validate `name` and
    /// `description` beforehand.
    pub fn add(&mut self, name: String, description: String) -> Product {
        let id = self.unique_id();
        let product = Product::new(id, name, description, self.strategy);

        self.products.push(product.clone());
        self.persist();

        info!(id = %product.id, name = %product.name, "product added");
        product
    }

    /// Snapshot of all products in insertion order.
    pub fn list(&self) -> Vec<Product> {
        self.products.clone()
    }

    pub fn find_by_hash(&self, hash: &str) -> Option<Product> {
        self.products.iter().find(|p| p.hash == hash).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Product> {
        self.products.iter().find(|p| p.id == id).cloned()
    }

    /// Merge `update` into the product with `id`. Returns `None` if absent.
    pub fn update(&mut self, id: &str, update: ProductUpdate) -> Option<Product> {
        let product = self.products.iter_mut().find(|p| p.id == id)?;
        product.apply(update);
        let updated = product.clone();

        self.persist();
        info!(id = %id, "product updated");
        Some(updated)
    }

    /// Remove the product with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.products.iter().position(|p| p.id == id) else {
            return false;
        };
        self.products.remove(index);

        self.persist();
        info!(id = %id, "product deleted");
        true
    }

    /// Remove every product.
    pub fn clear(&mut self) {
        self.products.clear();
        self.persist();
        info!("all products cleared");
    }

    pub fn count(&self) -> usize {
        self.products.len()
    }

    /// All products as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.products)?)
    }

    /// Replace the store's contents with a JSON array of products.
    /// Input that is not an array of products leaves the store untouched.
    /// Returns the number of records kept after duplicate ids collapse.
    pub fn import_json(&mut self, data: &str) -> Result<usize> {
        let products: Vec<Product> = serde_json::from_str(data)
            .map_err(|e| TaarifaError::Parse(format!("import: {}", e)))?;
        let total = products.len();

        // Repeated ids keep their first occurrence.
        let mut seen = HashSet::new();
        let products: Vec<Product> = products
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        let count = products.len();
        if count < total {
            warn!(dropped = total - count, "duplicate ids in import, keeping first occurrence");
        }

        self.products = products;
        self.persist();

        info!(count, "products imported");
        Ok(count)
    }

    fn unique_id(&self) -> String {
        let mut id = generate_id();
        for _ in 1..MAX_ID_ATTEMPTS {
            if !self.products.iter().any(|p| p.id == id) {
                break;
            }
            debug!(id = %id, "generated id already in use, drawing another");
            id = generate_id();
        }
        id
    }

    fn persist(&self) {
        if let Err(e) = self.backend.persist(&self.products) {
            warn!(backend = self.backend.name(), error = %e, "failed to persist products");
        }
    }
}
