mod product;

pub use product::{Product, ProductUpdate};
