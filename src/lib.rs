pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod server;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use entity::{Product, ProductUpdate};
pub use error::{Result, TaarifaError};
pub use reconcile::{merge, BaselineSource, Reconciler};
pub use storage::ProductStore;
