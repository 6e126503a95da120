//! Results produced by tools and their compact text rendering.

use serde::Serialize;

use crate::catalog::Product;

/// What a tool produced.
///
/// Failures are results too: an `Error` flows through the same re-phrasing
/// path as a successful answer, so the user sees a polite message instead of
/// a crash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ToolOutput {
    Products(Vec<Product>),
    Price {
        product: String,
        price: f64,
    },
    SizeAvailability {
        product: String,
        size: String,
        available: bool,
        reason: Option<String>,
    },
    /// Informational text (store hours, policies...)
    Text(String),
    /// Answer of the chat tool, shown verbatim
    Chat(String),
    /// Nothing matched; not an error
    NotFound(String),
    Error(String),
}

impl ToolOutput {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Renders the result as short bullet text for the re-phrasing prompt and
    /// as the last-resort answer.
    pub fn render(&self) -> String {
        match self {
            Self::Products(products) => render_products(products),
            Self::Price { product, price } => format!("• {} → ${:.2}", product, price),
            Self::SizeAvailability {
                product,
                size,
                available,
                reason,
            } => {
                if *available {
                    format!("{} está disponible en talle {}.", product, size)
                } else {
                    match reason {
                        Some(reason) => {
                            format!("{} no está disponible en talle {}. {}", product, size, reason)
                        }
                        None => format!("{} no está disponible en talle {}.", product, size),
                    }
                }
            }
            Self::Text(text) | Self::Chat(text) | Self::NotFound(text) => text.clone(),
            Self::Error(message) => format!("Error: {}", message),
        }
    }
}

/// `• name → $price (talles: size)` per product.
pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No encontré resultados.".to_string();
    }
    products
        .iter()
        .map(|p| {
            if p.size.trim().is_empty() {
                format!("• {} → {}", p.name, p.display_price())
            } else {
                format!("• {} → {} (talles: {})", p.name, p.display_price(), p.size.trim())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_products_as_bullets() {
        let output = ToolOutput::Products(vec![
            Product::new("Remera", 15.0, "S, M"),
            Product::new("Vestido", 40.5, ""),
        ]);
        assert_eq!(
            output.render(),
            "• Remera → $15.00 (talles: S, M)\n• Vestido → $40.50"
        );
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(ToolOutput::Products(vec![]).render(), "No encontré resultados.");
    }

    #[test]
    fn test_render_size_availability() {
        let output = ToolOutput::SizeAvailability {
            product: "Jeans".to_string(),
            size: "XL".to_string(),
            available: false,
            reason: Some("Talle no disponible en la lista.".to_string()),
        };
        assert_eq!(
            output.render(),
            "Jeans no está disponible en talle XL. Talle no disponible en la lista."
        );
    }
}
