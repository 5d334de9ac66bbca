use crate::model::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a product in the catalog.
///
/// # Document Store
/// This struct implements the [`Document`](doc_store::Document) trait,
/// allowing it to be stored in a [`CollectionActor`](doc_store::CollectionActor).
///
/// See [`impl Document for Product`](#impl-Document-for-Product) for details on:
/// - Filters ([`ProductFilter`](crate::product_store::ProductFilter))
/// - Updates ([`ProductUpdate`](crate::product_store::ProductUpdate))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub sales: i64,
    #[serde(default)]
    pub is_combination: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Creates a simple product without variants.
    ///
    /// # Arguments
    /// * `id` - Unique identifier
    /// * `title` - Display title
    /// * `stock` - Units on hand
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, stock: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            stock,
            sales: 0,
            is_combination: false,
            variants: Vec::new(),
        }
    }

    /// Creates a combination product; `stock` is the sum of the variant quantities.
    pub fn with_variants(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        variants: Vec<Variant>,
    ) -> Self {
        let stock = variants.iter().map(|v| v.quantity).sum();
        Self {
            id: id.into(),
            title: title.into(),
            stock,
            sales: 0,
            is_combination: true,
            variants,
        }
    }

    /// Returns the variant whose `productId` equals `variant_id`.
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.product_id == variant_id)
    }
}

/// One purchasable configuration of a combination product.
///
/// Attribute keys are flattened into the record next to `productId` and
/// `quantity`, so `{"productId": "v1", "quantity": 4, "color": "red"}` has the
/// single attribute `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Variant {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
