pub mod catalog_loader;
pub mod config;
pub mod paths;

pub use crate::catalog_loader::load_catalog;
pub use crate::config::{AppConfig, DetectionMode};
pub use crate::paths::MostradorPaths;
