//! Static store information answered by the info tools.

use serde::{Deserialize, Serialize};

use crate::text::fold;

/// Texts returned by the hours/location/returns/business-info tools.
///
/// Every field can be overridden from the `[store]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreInfo {
    pub hours: String,
    pub location: String,
    pub return_policy: String,
    pub shipping: String,
    pub payments: String,
}

impl Default for StoreInfo {
    fn default() -> Self {
        Self {
            hours: "Abrimos de lunes a sábado de 10 a 20 hs. Los domingos está cerrado.".to_string(),
            location: "Estamos en Av. Corrientes 1234, Buenos Aires.".to_string(),
            return_policy: "Aceptamos cambios y devoluciones hasta 30 días después de la compra, con el ticket."
                .to_string(),
            shipping: "Enviamos a todo el país.".to_string(),
            payments: "Aceptamos tarjetas y transferencias.".to_string(),
        }
    }
}

impl StoreInfo {
    /// Answers a `business_info` topic (`envios`, `pagos`, `cambios`).
    pub fn topic(&self, topic: &str) -> Option<&str> {
        let folded = fold(topic.trim());
        let key = folded.trim_end_matches('s');
        match key {
            "envio" | "shipping" => Some(&self.shipping),
            "pago" | "payment" => Some(&self.payments),
            "cambio" | "devolucione" | "devolucion" | "return" => Some(&self.return_policy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_accept_accents_and_plurals() {
        let info = StoreInfo::default();
        assert_eq!(info.topic("Envíos"), Some(info.shipping.as_str()));
        assert_eq!(info.topic("pago"), Some(info.payments.as_str()));
        assert_eq!(info.topic("cambios"), Some(info.return_policy.as_str()));
        assert_eq!(info.topic("stock"), None);
    }
}
