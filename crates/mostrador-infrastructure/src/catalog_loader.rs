//! Loads the product catalog from a CSV file.
//!
//! Header names vary between exports (`nombre`, `Precio`, `talles`...), so each
//! header is folded and mapped onto a canonical column before any row is read.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use mostrador_core::catalog::{Catalog, Product, parse_price};
use mostrador_core::text::fold;
use mostrador_core::{MostradorError, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Price,
    Size,
    Color,
    Category,
    Description,
    Sku,
}

const COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (Column::Name, &["name", "nombre", "producto", "product", "title"]),
    (Column::Price, &["price", "precio"]),
    (Column::Size, &["size", "talle", "talla", "sizes", "talles"]),
    (Column::Color, &["color", "colour"]),
    (Column::Category, &["category", "categoria"]),
    (Column::Description, &["description", "descripcion"]),
    (Column::Sku, &["sku", "id", "codigo"]),
];

fn column_for(header: &str) -> Option<Column> {
    let folded = fold(header.trim());
    COLUMN_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&folded.as_str()))
        .map(|(column, _)| *column)
}

/// Position of every recognised column in the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    price: Option<usize>,
    size: Option<usize>,
    color: Option<usize>,
    category: Option<usize>,
    description: Option<usize>,
    sku: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = Self::default();
        for (index, header) in headers.iter().enumerate() {
            let Some(column) = column_for(header) else {
                debug!(header, "Ignoring unknown catalog column");
                continue;
            };
            let slot = match column {
                Column::Name => &mut map.name,
                Column::Price => &mut map.price,
                Column::Size => &mut map.size,
                Column::Color => &mut map.color,
                Column::Category => &mut map.category,
                Column::Description => &mut map.description,
                Column::Sku => &mut map.sku,
            };
            // first matching header wins
            slot.get_or_insert(index);
        }
        map
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reads every product from `path`.
///
/// # Errors
///
/// - [`MostradorError::NotFound`] when the file does not exist
/// - [`MostradorError::Catalog`] when the name or price column is missing
/// - I/O or CSV errors while reading rows
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MostradorError::not_found("catalog file", path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let columns = ColumnMap::from_headers(reader.headers()?);
    let name_index = columns
        .name
        .ok_or_else(|| MostradorError::catalog(format!("{}: missing name column", path.display())))?;
    let price_index = columns
        .price
        .ok_or_else(|| MostradorError::catalog(format!("{}: missing price column", path.display())))?;

    let mut products = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        let Some(name) = cell(&record, Some(name_index)) else {
            skipped += 1;
            continue;
        };
        let price = record.get(price_index).map(parse_price).unwrap_or(0.0);

        products.push(Product {
            name,
            price,
            size: cell(&record, columns.size).unwrap_or_default(),
            color: cell(&record, columns.color),
            category: cell(&record, columns.category),
            description: cell(&record, columns.description),
            sku: cell(&record, columns.sku),
        });
    }

    if skipped > 0 {
        warn!(skipped, "Skipped catalog rows without a name");
    }
    info!(path = %path.display(), products = products.len(), "Catalog loaded");
    Ok(Catalog::new(products))
}
