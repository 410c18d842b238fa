// src/entity/product.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::HashStrategy;

/// A catalog entry. `id`, `hash` and `created_at` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: String, name: String, description: String, strategy: HashStrategy) -> Self {
        let created_at = Utc::now();
        let hash = strategy.derive(&id, &name, &description, &created_at);
        Self {
            id,
            name,
            description,
            hash,
            created_at,
        }
    }

    /// Merge the mutable fields of `update` into this record.
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
    }
}

/// Update payload for a product. Only `name` and `description` can change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
