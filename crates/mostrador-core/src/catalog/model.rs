//! Catalog domain models.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// A single product row of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, used as the lookup key
    pub name: String,
    /// Price coerced to a number at load time (0.0 when unparseable)
    pub price: f64,
    /// Free-text list of sizes, possibly empty
    #[serde(default)]
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl Product {
    /// Creates a product with only the mandatory columns set.
    pub fn new(name: impl Into<String>, price: f64, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            size: size.into(),
            color: None,
            category: None,
            description: None,
            sku: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Formats the price the way the assistant shows it to customers.
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// Ordering applied to search results by price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PriceSort {
    /// Cheapest first
    Asc,
    /// Most expensive first
    Desc,
}

/// Parameters of a catalog search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text matched against product names; every word must appear
    pub term: String,
    /// Restricts to products whose size list contains this substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PriceSort>,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size_filter = Some(size.into());
        self
    }

    pub fn with_sort(mut self, sort: PriceSort) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Filters used to narrow down a previous search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefineFilters {
    /// Term of the search being refined, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PriceSort>,
}

/// Outcome of a catalog search.
///
/// "Nothing matched" is a normal outcome and is kept apart from errors,
/// which travel through `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<Product>),
    NotFound { message: String },
}

impl SearchOutcome {
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Found(products) => products,
            Self::NotFound { .. } => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_sort_parses_case_insensitively() {
        assert_eq!(PriceSort::from_str("ASC").unwrap(), PriceSort::Asc);
        assert_eq!(PriceSort::from_str("desc").unwrap(), PriceSort::Desc);
        assert!(PriceSort::from_str("cheapest").is_err());
        assert_eq!(PriceSort::Asc.as_ref(), "asc");
    }

    #[test]
    fn test_display_price() {
        let product = Product::new("Jeans", 49.5, "M");
        assert_eq!(product.display_price(), "$49.50");
    }
}
