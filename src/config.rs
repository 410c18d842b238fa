//! Project configuration: `.taarifa/config.yaml` plus environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaarifaError};
use crate::identity::HashStrategy;
use crate::reconcile::{BaselineSource, Reconciler};
use crate::storage::{
    Backend, JsonFileBackend, MemoryBackend, ProductStore, SqliteKvBackend, DEFAULT_KEY,
};

pub const TAARIFA_DIR: &str = ".taarifa";
pub const CONFIG_FILE: &str = "config.yaml";

/// Which persistence medium backs the product store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    #[default]
    Json,
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Json => write!(f, "json"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "json" | "file" => Ok(BackendKind::Json),
            "sqlite" | "kv" => Ok(BackendKind::Sqlite),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Data location. Relative paths resolve against the project root.
    /// Defaults to `.taarifa/products.json` or `.taarifa/products.db`.
    pub path: Option<PathBuf>,
    /// Namespaced key for the sqlite key-value backend.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: None,
            key: DEFAULT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub hash: HashStrategy,
    pub server: ServerConfig,
    /// Read-only product list merged under the store on reads: a file path or
    /// an `http(s)://` URL.
    pub baseline: Option<String>,
}

impl Config {
    /// Load configuration for the project at `root`.
    ///
    /// An explicit `path` must exist. Otherwise `.taarifa/config.yaml` is used
    /// when present, and defaults when not.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(TaarifaError::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => {
                let default = root.join(TAARIFA_DIR).join(CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        match file {
            Some(file) => Self::from_yaml(&fs::read_to_string(file)?),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `TAARIFA_*` overrides looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("TAARIFA_BACKEND") {
            self.storage.backend = v.parse().map_err(TaarifaError::Config)?;
        }
        if let Some(v) = var("TAARIFA_DATA_PATH") {
            self.storage.path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("TAARIFA_HASH") {
            self.hash = v.parse().map_err(TaarifaError::Config)?;
        }
        if let Some(v) = var("TAARIFA_HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("TAARIFA_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| TaarifaError::Config(format!("Invalid port: {}", v)))?;
        }
        if let Some(v) = var("TAARIFA_BASELINE") {
            self.baseline = if v.is_empty() { None } else { Some(v) };
        }
        Ok(())
    }

    /// Resolved data location for file-based backends.
    pub fn data_path(&self, root: &Path) -> PathBuf {
        let path = match &self.storage.path {
            Some(p) => p.clone(),
            None => {
                let file = match self.storage.backend {
                    BackendKind::Sqlite => "products.db",
                    _ => "products.json",
                };
                Path::new(TAARIFA_DIR).join(file)
            }
        };

        if path.is_absolute() || path.as_os_str() == ":memory:" {
            path
        } else {
            root.join(path)
        }
    }

    /// Build the configured backend and open a store over it.
    pub fn open_store(&self, root: &Path) -> Result<ProductStore> {
        let backend: Box<dyn Backend> = match self.storage.backend {
            BackendKind::Memory => Box::new(MemoryBackend),
            BackendKind::Json => Box::new(JsonFileBackend::new(self.data_path(root))),
            BackendKind::Sqlite => Box::new(SqliteKvBackend::open(
                &self.data_path(root),
                self.storage.key.clone(),
            )?),
        };
        Ok(ProductStore::open(backend, self.hash))
    }

    /// Reconciler for the configured baseline. Relative file baselines
    /// resolve against `root`.
    pub fn reconciler(&self, root: &Path) -> Reconciler {
        let source = self.baseline.as_deref().map(|location| {
            match BaselineSource::parse(location) {
                BaselineSource::File(path) if path.is_relative() => {
                    BaselineSource::File(root.join(path))
                }
                other => other,
            }
        });
        Reconciler::new(source)
    }
}
