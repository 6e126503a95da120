pub mod catalog;
pub mod error;
pub mod extract;
pub mod intent;
pub mod model;
pub mod sanitize;
pub mod session;
pub mod store_info;
pub mod text;
pub mod tool;

// Re-export common error type
pub use error::{MostradorError, Result};
