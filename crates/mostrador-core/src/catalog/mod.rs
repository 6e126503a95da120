//! Product catalog domain module.
//!
//! # Module Structure
//!
//! - `model`: product and query types (`Product`, `SearchQuery`, `SearchOutcome`)
//! - `price`: price coercion for CSV cells
//! - `store`: the read-only `Catalog` with search/lookup/sample operations
//!
//! Loading the catalog from disk lives in `mostrador-infrastructure`.

mod model;
mod price;
mod store;

pub use model::{PriceSort, Product, RefineFilters, SearchOutcome, SearchQuery};
pub use price::parse_price;
pub use store::{Catalog, SAMPLE_CAP, SEARCH_LIMIT};
