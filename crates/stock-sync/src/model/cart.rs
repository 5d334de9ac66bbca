use crate::model::ProductId;
use serde::{Deserialize, Serialize};

/// One purchased entry of an order's cart.
///
/// Produced by the order workflow and owned by the caller for the duration
/// of a stock adjustment; never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub quantity: i64,
    #[serde(default)]
    pub is_combination: bool,
    #[serde(default)]
    pub variant: Option<CartVariant>,
}

/// The variant a combination line item refers to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartVariant {
    #[serde(default)]
    pub product_id: Option<String>,
}

impl CartLineItem {
    /// Line item for a product without variants.
    pub fn simple(id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            id: id.into(),
            quantity,
            is_combination: false,
            variant: None,
        }
    }

    /// Line item for one variant of a combination product.
    pub fn combination(
        id: impl Into<ProductId>,
        variant_id: impl Into<String>,
        quantity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            quantity,
            is_combination: true,
            variant: Some(CartVariant {
                product_id: Some(variant_id.into()),
            }),
        }
    }

    /// The purchased variant's id, or `""` when the item names none.
    pub fn variant_id(&self) -> &str {
        self.variant
            .as_ref()
            .and_then(|v| v.product_id.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_wire_format() {
        let json = r#"[
            {"_id": "p-1", "quantity": 2},
            {"_id": "p-2", "quantity": 1, "isCombination": true, "variant": {"productId": "p-2-red"}},
            {"_id": "p-3", "quantity": 1, "isCombination": true, "variant": {}}
        ]"#;
        let cart: Vec<CartLineItem> = serde_json::from_str(json).unwrap();

        assert_eq!(cart[0], CartLineItem::simple("p-1", 2));
        assert_eq!(cart[1], CartLineItem::combination("p-2", "p-2-red", 1));
        assert!(cart[2].is_combination);
        assert_eq!(cart[2].variant_id(), "");
        assert_eq!(CartLineItem::simple("p-4", 1).variant_id(), "");
    }
}
