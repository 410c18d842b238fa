use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::Backend;
use crate::entity::Product;
use crate::error::{Result, TaarifaError};

/// Products kept as a pretty-printed JSON array in a single file.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn load(&self) -> Result<Vec<Product>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TaarifaError::Persistence(format!(
                    "reading {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        parse_product_list(&data)
    }

    fn persist(&self, products: &[Product]) -> Result<()> {
        let json = serde_json::to_string_pretty(products)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    TaarifaError::Persistence(format!("creating {}: {}", parent.display(), e))
                })?;
            }
        }

        fs::write(&self.path, json).map_err(|e| {
            TaarifaError::Persistence(format!("writing {}: {}", self.path.display(), e))
        })
    }
}

/// Parse a JSON array of products.
pub(crate) fn parse_product_list(data: &str) -> Result<Vec<Product>> {
    serde_json::from_str(data).map_err(|e| TaarifaError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::HashStrategy;
    use tempfile::TempDir;

    fn product(id: &str, name: &str) -> Product {
        Product::new(
            id.to_string(),
            name.to_string(),
            "Some description".to_string(),
            HashStrategy::Sha256,
        )
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path().join("products.json"));
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_persist_creates_parent_dirs_and_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data/nested/products.json");
        let backend = JsonFileBackend::new(&path);

        let products = vec![product("aaa", "First product"), product("bbb", "Second product")];
        backend.persist(&products).unwrap();

        assert!(path.exists());
        let loaded = backend.load().unwrap();
        assert_eq!(loaded, products);
    }

    #[test]
    fn test_file_is_pretty_printed_camel_case() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("products.json");
        let backend = JsonFileBackend::new(&path);
        backend.persist(&[product("aaa", "First product")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  {"));
        assert!(raw.contains("\"createdAt\""));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("products.json");
        fs::write(&path, "{ not json").unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(matches!(backend.load(), Err(TaarifaError::Parse(_))));
    }

    #[test]
    fn test_persist_into_unwritable_location_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        // A regular file where a directory is expected.
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let backend = JsonFileBackend::new(blocker.join("products.json"));
        let result = backend.persist(&[product("aaa", "First product")]);
        assert!(matches!(result, Err(TaarifaError::Persistence(_))));
    }
}
