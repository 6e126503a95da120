//! In-memory product catalog.
//!
//! The catalog is loaded once at startup and never mutated afterwards, so it
//! can be shared freely behind an `Arc` by the chat session and the tools.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use super::model::{PriceSort, Product, RefineFilters, SearchOutcome, SearchQuery};
use crate::text::{clean_argument, fold};

/// Maximum number of products returned by searches and recommendations.
pub const SEARCH_LIMIT: usize = 5;

/// Upper bound for `sample`, keeps the console from being flooded.
pub const SAMPLE_CAP: usize = 30;

/// Read-only product table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// An empty catalog, used when the CSV could not be loaded and the
    /// configuration allows running without one.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Searches products by name.
    ///
    /// Every whitespace-separated word of the term must appear in the name
    /// (case and accents ignored). A term that is exactly a category of the
    /// catalog matches the category column instead, so `"shirt"` does not
    /// return every `"t-shirt"`. Results are sorted by price when asked,
    /// de-duplicated by name and truncated to [`SEARCH_LIMIT`].
    pub fn search(&self, query: &SearchQuery) -> SearchOutcome {
        let term = TermFilter::new(self, &query.term);
        let size_filter = query
            .size_filter
            .as_deref()
            .map(|s| fold(clean_argument(s)))
            .filter(|s| !s.is_empty());

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| term.matches(p))
            .filter(|p| match &size_filter {
                Some(size) => fold(&p.size).contains(size.as_str()),
                None => true,
            })
            .collect();

        sort_by_price(&mut matches, query.sort);
        let results = dedup_and_limit(matches, SEARCH_LIMIT);

        if results.is_empty() {
            let mut message = format!("No encontré productos para '{}'", query.term.trim());
            if let Some(size) = &query.size_filter {
                message.push_str(&format!(" en talle {}", size));
            }
            SearchOutcome::NotFound { message }
        } else {
            SearchOutcome::Found(results)
        }
    }

    fn has_category(&self, folded: &str) -> bool {
        self.products
            .iter()
            .filter_map(|p| p.category.as_deref())
            .any(|c| fold(c.trim()) == folded)
    }

    /// Looks a product up by name: exact match first, then substring match.
    /// Ties are resolved by table order.
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        let wanted = fold(clean_argument(name));
        if wanted.is_empty() {
            return None;
        }

        self.products
            .iter()
            .find(|p| fold(&p.name) == wanted)
            .or_else(|| self.products.iter().find(|p| fold(&p.name).contains(&wanted)))
    }

    pub fn find_by_sku(&self, sku: &str) -> Option<&Product> {
        let wanted = clean_argument(sku);
        self.products
            .iter()
            .find(|p| p.sku.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(wanted)))
    }

    /// Products sharing the category of the product with the given sku.
    pub fn similar_to(&self, sku: &str) -> Option<Vec<Product>> {
        let base = self.find_by_sku(sku)?;
        let category = base.category.as_deref()?;

        let similar = self
            .products
            .iter()
            .filter(|p| p.name != base.name)
            .filter(|p| p.category.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(category)))
            .collect();
        Some(dedup_and_limit(similar, SEARCH_LIMIT))
    }

    /// Products priced within 20% of the mean catalog price.
    pub fn recommend(&self) -> Vec<Product> {
        if self.products.is_empty() {
            return Vec::new();
        }
        let mean = self.products.iter().map(|p| p.price).sum::<f64>() / self.products.len() as f64;
        let (low, high) = (mean * 0.8, mean * 1.2);

        let picks = self
            .products
            .iter()
            .filter(|p| p.price >= low && p.price <= high)
            .collect();
        dedup_and_limit(picks, SEARCH_LIMIT)
    }

    /// Narrows the catalog (or a previous search term) by color, size and price.
    pub fn refine(&self, filters: &RefineFilters) -> SearchOutcome {
        let term = TermFilter::new(self, filters.base_term.as_deref().unwrap_or_default());
        let color = filters.color.as_deref().map(|c| fold(clean_argument(c)));
        let size = filters.size.as_deref().map(|s| fold(clean_argument(s)));

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| term.matches(p))
            .filter(|p| match &color {
                Some(color) => {
                    let in_column = p.color.as_deref().is_some_and(|c| fold(c).contains(color.as_str()));
                    in_column || fold(&p.name).contains(color.as_str())
                }
                None => true,
            })
            .filter(|p| match &size {
                Some(size) => fold(&p.size).contains(size.as_str()),
                None => true,
            })
            .filter(|p| filters.max_price.is_none_or(|max| p.price <= max))
            .collect();

        sort_by_price(&mut matches, filters.sort);
        let results = dedup_and_limit(matches, SEARCH_LIMIT);

        if results.is_empty() {
            SearchOutcome::NotFound {
                message: "No encontré productos con esos filtros".to_string(),
            }
        } else {
            SearchOutcome::Found(results)
        }
    }

    /// Random products to show as examples; `count` is clamped to `1..=SAMPLE_CAP`.
    pub fn sample(&self, count: usize) -> Vec<Product> {
        let count = count.clamp(1, SAMPLE_CAP);
        let mut rng = rand::thread_rng();
        self.products
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect()
    }
}

/// How a search term selects products.
enum TermFilter {
    /// The term names a category of the catalog
    Category(String),
    /// Every word must appear in the name
    Words(Vec<String>),
}

impl TermFilter {
    fn new(catalog: &Catalog, raw: &str) -> Self {
        let term = fold(clean_argument(raw));
        if !term.is_empty() && catalog.has_category(&term) {
            return Self::Category(term);
        }
        Self::Words(term.split_whitespace().map(str::to_string).collect())
    }

    fn matches(&self, product: &Product) -> bool {
        match self {
            Self::Category(category) => product
                .category
                .as_deref()
                .is_some_and(|c| fold(c.trim()) == *category),
            Self::Words(words) => {
                let name = fold(&product.name);
                words.iter().all(|w| name.contains(w.as_str()))
            }
        }
    }
}

fn sort_by_price(products: &mut [&Product], sort: Option<PriceSort>) {
    match sort {
        Some(PriceSort::Asc) => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Some(PriceSort::Desc) => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        None => {}
    }
}

fn dedup_and_limit(products: Vec<&Product>, limit: usize) -> Vec<Product> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|p| seen.insert(fold(&p.name)))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new("Remera básica blanca", 15.0, "S, M, L")
                .with_color("blanco")
                .with_category("t-shirt")
                .with_sku("A1"),
            Product::new("Remera estampada negra", 22.0, "M, L")
                .with_color("negro")
                .with_category("t-shirt")
                .with_sku("A2"),
            Product::new("Remera básica blanca", 15.0, "S")
                .with_category("t-shirt")
                .with_sku("A3"),
            Product::new("Jeans slim azul", 60.0, "28, 30, 32")
                .with_color("azul")
                .with_category("jeans")
                .with_sku("B1"),
            Product::new("Jeans mom negro", 55.0, "30")
                .with_color("negro")
                .with_category("jeans")
                .with_sku("B2"),
            Product::new("Campera de cuero", 180.0, "M")
                .with_category("jacket")
                .with_sku("C1"),
            Product::new("Vestido floreado", 40.0, "")
                .with_category("dress")
                .with_sku("D1"),
        ])
    }

    #[test]
    fn test_empty_term_is_capped_and_unique() {
        let outcome = catalog().search(&SearchQuery::new(""));
        let products = outcome.products();
        assert_eq!(products.len(), SEARCH_LIMIT);

        let names: HashSet<_> = products.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names.len(), products.len(), "duplicate names in results");
    }

    #[test]
    fn test_multi_word_terms_must_all_match() {
        let outcome = catalog().search(&SearchQuery::new("jeans NEGRO"));
        let products = outcome.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Jeans mom negro");
    }

    #[test]
    fn test_accents_are_ignored() {
        let outcome = catalog().search(&SearchQuery::new("basica"));
        assert_eq!(outcome.products().len(), 1);
    }

    #[test]
    fn test_category_term_matches_category_column() {
        let cat = Catalog::new(vec![
            Product::new("Oversized t-shirt in black", 18.0, "M").with_category("t-shirt"),
            Product::new("Oxford shirt in white", 28.0, "L").with_category("shirt"),
            Product::new("Denim shirt jacket", 49.0, "S").with_category("jacket"),
        ]);

        let shirts = cat.search(&SearchQuery::new("shirt"));
        assert_eq!(shirts.products().len(), 1);
        assert_eq!(shirts.products()[0].name, "Oxford shirt in white");

        let tees = cat.search(&SearchQuery::new("T-Shirt"));
        assert_eq!(tees.products().len(), 1);

        // not a category: plain name matching
        assert_eq!(cat.search(&SearchQuery::new("in")).products().len(), 2);
    }

    #[test]
    fn test_decomposed_accents_match() {
        let outcome = catalog().search(&SearchQuery::new("ba\u{301}sica"));
        assert_eq!(outcome.products().len(), 1);
        assert_eq!(outcome.products()[0].name, "Remera básica blanca");
    }

    #[test]
    fn test_sort_and_size_filter() {
        let cat = catalog();
        let asc = cat.search(&SearchQuery::new("remera").with_sort(PriceSort::Asc));
        assert_eq!(asc.products()[0].price, 15.0);

        let desc = cat.search(&SearchQuery::new("remera").with_sort(PriceSort::Desc));
        assert_eq!(desc.products()[0].price, 22.0);

        let sized = cat.search(&SearchQuery::new("jeans").with_size("32"));
        assert_eq!(sized.products().len(), 1);
        assert_eq!(sized.products()[0].name, "Jeans slim azul");
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        match catalog().search(&SearchQuery::new("sombrero")) {
            SearchOutcome::NotFound { message } => assert!(message.contains("sombrero")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_find_by_name_prefers_exact_match() {
        let cat = Catalog::new(vec![
            Product::new("Jeans slim azul oscuro", 70.0, ""),
            Product::new("Jeans slim azul", 60.0, ""),
        ]);
        assert_eq!(cat.find_by_name("jeans slim azul").unwrap().price, 60.0);
        assert_eq!(cat.find_by_name("\"slim\"").unwrap().price, 70.0);
        assert!(cat.find_by_name("pollera").is_none());
        assert!(cat.find_by_name("  ").is_none());
    }

    #[test]
    fn test_sample_is_clamped() {
        let cat = catalog();
        assert_eq!(cat.sample(0).len(), 1);
        assert_eq!(cat.sample(3).len(), 3);
        // never more than the catalog holds
        assert_eq!(cat.sample(100).len(), cat.len());
    }

    #[test]
    fn test_similar_and_recommend() {
        let cat = catalog();
        let similar = cat.similar_to("B1").unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].name, "Jeans mom negro");
        assert!(cat.similar_to("ZZZ").is_none());

        // mean price is 55.28, band is 44.23..=66.34
        let picks = cat.recommend();
        assert!(picks.iter().all(|p| p.price >= 44.0 && p.price <= 67.0));
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_refine_uses_base_term_and_filters() {
        let cat = catalog();
        let filters = RefineFilters {
            base_term: Some("jeans".to_string()),
            color: Some("negro".to_string()),
            ..RefineFilters::default()
        };
        let outcome = cat.refine(&filters);
        assert_eq!(outcome.products().len(), 1);

        let cheap = RefineFilters {
            max_price: Some(20.0),
            ..RefineFilters::default()
        };
        assert_eq!(cat.refine(&cheap).products().len(), 1);

        let impossible = RefineFilters {
            max_price: Some(1.0),
            ..RefineFilters::default()
        };
        assert!(!cat.refine(&impossible).is_found());
    }
}
