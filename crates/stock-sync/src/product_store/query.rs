//! Filters and updates understood by the product collection.

use crate::model::ProductId;
use crate::product_store::VariantPredicate;

/// Selects products.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    /// The product with this id.
    Id(ProductId),
    /// The product with this id, provided it has a variant whose `productId`
    /// is `variant_id`. An empty `variant_id` matches nothing.
    IdWithVariant { id: ProductId, variant_id: String },
    /// Every product flagged `isCombination`.
    Combination,
    /// Every product.
    All,
}

/// Mutates one product atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductUpdate {
    /// Adds signed deltas to the counters.
    Increment(StockIncrement),
    /// Removes every variant matched by the predicate.
    PullVariants(VariantPredicate),
}

/// Signed deltas applied together in one update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockIncrement {
    pub stock: i64,
    pub sales: i64,
    pub variant: Option<VariantIncrement>,
}

/// Delta for the `quantity` of one variant, addressed by its `productId`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantIncrement {
    pub variant_id: String,
    pub delta: i64,
}

impl StockIncrement {
    /// A sale of `quantity` units: `stock` goes down, `sales` goes up.
    ///
    /// `None` when the decrement is not representable (`i64::MIN`).
    pub fn sale(quantity: i64) -> Option<Self> {
        Some(Self {
            stock: quantity.checked_neg()?,
            sales: quantity,
            variant: None,
        })
    }

    /// Also decrements the quantity of the sold variant.
    pub fn of_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant = Some(VariantIncrement {
            variant_id: variant_id.into(),
            delta: self.stock,
        });
        self
    }

    pub fn is_noop(&self) -> bool {
        self.stock == 0 && self.sales == 0 && self.variant.as_ref().map_or(true, |v| v.delta == 0)
    }
}
