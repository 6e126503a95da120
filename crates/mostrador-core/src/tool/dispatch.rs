//! Executes normalized tool calls against the catalog and store information.

use std::str::FromStr;

use tracing::{debug, warn};

use super::call::{ToolArguments, ToolCall, arg_f64, arg_str};
use super::output::{ToolOutput, render_products};
use super::registry::{ToolKind, ToolRegistry, ToolSpec};
use crate::catalog::{Catalog, PriceSort, Product, RefineFilters, SearchOutcome, SearchQuery};
use crate::error::{MostradorError, Result};
use crate::session::SessionMemory;
use crate::store_info::StoreInfo;

/// Everything a tool may read or update while it runs.
pub struct ToolContext<'a> {
    pub catalog: &'a Catalog,
    pub store: &'a StoreInfo,
    pub memory: &'a mut SessionMemory,
}

/// Result of running one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    /// Name the call was dispatched under (canonical when known)
    pub name: String,
    /// Tool that ran, `None` when the name was not found
    pub kind: Option<ToolKind>,
    pub output: ToolOutput,
}

impl ToolExecution {
    pub fn is_chat(&self) -> bool {
        self.kind.is_some_and(|k| k.is_chat())
    }
}

/// Maps canonical names to typed handlers.
pub struct ToolDispatcher {
    registry: &'static ToolRegistry,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(ToolRegistry::builtin())
    }
}

impl ToolDispatcher {
    pub fn new(registry: &'static ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'static ToolRegistry {
        self.registry
    }

    /// Runs a call that has already been normalized.
    ///
    /// Never fails: unknown tools and handler errors are turned into
    /// [`ToolOutput::Error`].
    pub fn execute(&self, call: &ToolCall, ctx: &mut ToolContext<'_>) -> ToolExecution {
        let Some(spec) = self.registry.lookup(&call.name) else {
            warn!(tool = %call.name, "Tool not found");
            return ToolExecution {
                name: call.name.clone(),
                kind: None,
                output: ToolOutput::error(format!("Herramienta no encontrada: {}", call.name)),
            };
        };

        let arguments = with_defaults(spec, &call.arguments);
        debug!(tool = spec.name(), args = ?arguments, "Executing tool");

        let output = match run(spec.kind, &arguments, ctx) {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = spec.name(), error = %err, "Tool execution failed");
                ToolOutput::error(err.to_string())
            }
        };

        ToolExecution {
            name: spec.name().to_string(),
            kind: Some(spec.kind),
            output,
        }
    }
}

fn with_defaults(spec: &ToolSpec, arguments: &ToolArguments) -> ToolArguments {
    let mut arguments = arguments.clone();
    for param in &spec.params {
        if let Some(default) = param.default {
            arguments
                .entry(param.name.to_string())
                .or_insert_with(|| default.to_value());
        }
    }
    arguments
}

fn run(kind: ToolKind, args: &ToolArguments, ctx: &mut ToolContext<'_>) -> Result<ToolOutput> {
    match kind {
        ToolKind::FindProducts => find_products(args, ctx),
        ToolKind::RefineProducts => refine_products(args, ctx),
        ToolKind::GetProductPrice => get_product_price(args, ctx.catalog),
        ToolKind::CheckSize => check_size(args, ctx.catalog),
        ToolKind::ListSampleProducts => list_sample_products(args, ctx.catalog),
        ToolKind::GetProductBySku => {
            let sku = required(kind, args, "sku")?;
            Ok(match ctx.catalog.find_by_sku(&sku) {
                Some(product) => ToolOutput::Products(vec![product.clone()]),
                None => ToolOutput::NotFound(format!("No encontré ese producto (SKU {})", sku)),
            })
        }
        ToolKind::GetSimilarProducts => {
            let sku = required(kind, args, "sku")?;
            Ok(match ctx.catalog.similar_to(&sku) {
                Some(products) if !products.is_empty() => ToolOutput::Products(products),
                _ => ToolOutput::NotFound(format!("No encontré productos similares a {}", sku)),
            })
        }
        ToolKind::SummarizeProduct => {
            let sku = required(kind, args, "sku")?;
            Ok(match ctx.catalog.find_by_sku(&sku) {
                Some(product) => ToolOutput::Text(summarize(product)),
                None => ToolOutput::NotFound(format!("No encontré ese producto (SKU {})", sku)),
            })
        }
        ToolKind::RecommendProducts => {
            let products = ctx.catalog.recommend();
            Ok(if products.is_empty() {
                ToolOutput::NotFound("No tengo recomendaciones por ahora.".to_string())
            } else {
                ToolOutput::Products(products)
            })
        }
        ToolKind::GetStoreHours => Ok(ToolOutput::Text(ctx.store.hours.clone())),
        ToolKind::GetStoreLocation => Ok(ToolOutput::Text(ctx.store.location.clone())),
        ToolKind::GetReturnPolicy => Ok(ToolOutput::Text(ctx.store.return_policy.clone())),
        ToolKind::BusinessInfo => {
            let topic = required(kind, args, "topic")?;
            Ok(match ctx.store.topic(&topic) {
                Some(text) => ToolOutput::Text(text.to_string()),
                None => ToolOutput::NotFound("No tengo esa información.".to_string()),
            })
        }
        ToolKind::ChatResponse => {
            let message = required(kind, args, "message")?;
            Ok(ToolOutput::Chat(message))
        }
    }
}

/// One sentence with name, color when known, description and price.
fn summarize(product: &Product) -> String {
    let mut summary = product.name.clone();
    if let Some(color) = product.color.as_deref().filter(|c| !c.trim().is_empty()) {
        summary.push_str(&format!(" en color {}", color.trim()));
    }
    match product.description.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(description) => summary.push_str(&format!(". {}", description.trim())),
        None => summary.push_str(", ideal para uso diario"),
    }
    format!("{}. Precio {}.", summary, product.display_price())
}

fn required(kind: ToolKind, args: &ToolArguments, key: &str) -> Result<String> {
    arg_str(args, key)
        .ok_or_else(|| MostradorError::invalid_arguments(kind.name(), format!("falta '{}'", key)))
}

fn parse_sort(args: &ToolArguments) -> Option<PriceSort> {
    let raw = arg_str(args, "sort_by_price")?;
    let lowered = raw.to_lowercase();
    let sort = PriceSort::from_str(&lowered).ok().or_else(|| {
        if lowered.starts_with("asc") {
            Some(PriceSort::Asc)
        } else if lowered.starts_with("desc") {
            Some(PriceSort::Desc)
        } else {
            None
        }
    });
    if sort.is_none() {
        debug!(value = %raw, "Ignoring unknown sort_by_price value");
    }
    sort
}

fn find_products(args: &ToolArguments, ctx: &mut ToolContext<'_>) -> Result<ToolOutput> {
    let term = arg_str(args, "search_term").unwrap_or_default();
    let mut query = SearchQuery::new(term.clone());
    if let Some(size) = arg_str(args, "size_filter") {
        query = query.with_size(size);
    }
    if let Some(sort) = parse_sort(args) {
        query = query.with_sort(sort);
    }

    Ok(match ctx.catalog.search(&query) {
        SearchOutcome::Found(products) => {
            ctx.memory.remember_search(term, render_products(&products));
            ToolOutput::Products(products)
        }
        SearchOutcome::NotFound { message } => ToolOutput::NotFound(message),
    })
}

fn refine_products(args: &ToolArguments, ctx: &mut ToolContext<'_>) -> Result<ToolOutput> {
    let filters = RefineFilters {
        base_term: ctx.memory.last_search_term.clone(),
        color: arg_str(args, "color"),
        size: arg_str(args, "size"),
        max_price: arg_f64(args, "max_price"),
        sort: parse_sort(args),
    };

    Ok(match ctx.catalog.refine(&filters) {
        SearchOutcome::Found(products) => {
            let term = filters.base_term.unwrap_or_default();
            ctx.memory.remember_search(term, render_products(&products));
            ToolOutput::Products(products)
        }
        SearchOutcome::NotFound { message } => ToolOutput::NotFound(message),
    })
}

fn get_product_price(args: &ToolArguments, catalog: &Catalog) -> Result<ToolOutput> {
    let name = required(ToolKind::GetProductPrice, args, "product")?;
    Ok(match catalog.find_by_name(&name) {
        Some(product) => ToolOutput::Price {
            product: product.name.clone(),
            price: product.price,
        },
        None => ToolOutput::NotFound(format!("Producto no encontrado: '{}'", name)),
    })
}

fn check_size(args: &ToolArguments, catalog: &Catalog) -> Result<ToolOutput> {
    let name = required(ToolKind::CheckSize, args, "product")?;
    let size = required(ToolKind::CheckSize, args, "size")?;

    let Some(product) = catalog.find_by_name(&name) else {
        return Ok(ToolOutput::NotFound(format!("Producto no encontrado: '{}'", name)));
    };

    let (available, reason) = if product.size.trim().is_empty() {
        (false, Some("Este producto no tiene talles listados.".to_string()))
    } else if product.size.to_lowercase().contains(&size.to_lowercase()) {
        (true, None)
    } else {
        (false, Some("Talle no disponible en la lista.".to_string()))
    };

    Ok(ToolOutput::SizeAvailability {
        product: product.name.clone(),
        size,
        available,
        reason,
    })
}

fn list_sample_products(args: &ToolArguments, catalog: &Catalog) -> Result<ToolOutput> {
    let count = arg_f64(args, "count").ok_or_else(|| {
        MostradorError::invalid_arguments(
            ToolKind::ListSampleProducts.name(),
            "Por favor, dame un número válido.",
        )
    })?;
    // the model sometimes sends floats ("5.0") or negative values
    let count = if count.is_finite() && count >= 1.0 {
        count as usize
    } else {
        1
    };

    if catalog.is_empty() {
        return Ok(ToolOutput::NotFound("El catálogo está vacío.".to_string()));
    }
    Ok(ToolOutput::Products(catalog.sample(count)))
}
