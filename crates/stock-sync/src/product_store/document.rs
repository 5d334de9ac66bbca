//! Document trait implementation for the Product domain type.
//!
//! This module contains the [`Document`] trait implementation that enables
//! [`Product`] to be stored in the generic [`doc_store::CollectionActor`].
//!
//! Updates are applied by the collection to a copy of the product; an error
//! returned from [`Document::apply`] leaves the stored product untouched.

use crate::model::{Product, ProductId};
use crate::product_store::{ProductError, ProductFilter, ProductUpdate, StockIncrement};
use doc_store::Document;

impl Document for Product {
    type Id = ProductId;
    type Filter = ProductFilter;
    type Update = ProductUpdate;
    type Error = ProductError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        match filter {
            ProductFilter::Id(id) => self.id == *id,
            ProductFilter::IdWithVariant { id, variant_id } => {
                self.id == *id && !variant_id.is_empty() && self.variant(variant_id).is_some()
            }
            ProductFilter::Combination => self.is_combination,
            ProductFilter::All => true,
        }
    }

    /// Handles updates to the Product document.
    ///
    /// # Updates
    /// - `Increment`: adds the deltas to `stock`, `sales` and optionally one
    ///   variant's `quantity`, all or nothing
    /// - `PullVariants`: removes every variant the predicate matches
    fn apply(&mut self, update: &ProductUpdate) -> Result<bool, ProductError> {
        match update {
            ProductUpdate::Increment(increment) => self.increment(increment),
            ProductUpdate::PullVariants(predicate) => {
                let before = self.variants.len();
                self.variants.retain(|variant| !predicate.matches(variant));
                Ok(self.variants.len() != before)
            }
        }
    }
}

impl Product {
    fn increment(&mut self, increment: &StockIncrement) -> Result<bool, ProductError> {
        let overflow = |field| ProductError::CounterOverflow {
            product: self.id.to_string(),
            field,
        };
        let stock = self
            .stock
            .checked_add(increment.stock)
            .ok_or_else(|| overflow("stock"))?;
        let sales = self
            .sales
            .checked_add(increment.sales)
            .ok_or_else(|| overflow("sales"))?;

        if let Some(target) = &increment.variant {
            let product = self.id.to_string();
            let variant = self
                .variants
                .iter_mut()
                .find(|v| v.product_id == target.variant_id)
                .ok_or_else(|| ProductError::VariantNotFound {
                    product: product.clone(),
                    variant: target.variant_id.clone(),
                })?;
            variant.quantity = variant.quantity.checked_add(target.delta).ok_or(
                ProductError::CounterOverflow {
                    product,
                    field: "variants.quantity",
                },
            )?;
        }

        self.stock = stock;
        self.sales = sales;
        Ok(!increment.is_noop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variant;
    use crate::product_store::{AttributeMatch, AttributeSchema, VariantPredicate};

    fn shirt() -> Product {
        Product::with_variants(
            "shirt",
            "Shirt",
            vec![
                Variant::new("shirt-red", 5).attribute("color", "red"),
                Variant::new("shirt-blue", 3).attribute("color", "blue"),
            ],
        )
    }

    #[test]
    fn test_filters() {
        let product = shirt();
        assert!(product.matches(&ProductFilter::Id("shirt".into())));
        assert!(product.matches(&ProductFilter::Combination));
        assert!(product.matches(&ProductFilter::IdWithVariant {
            id: "shirt".into(),
            variant_id: "shirt-red".into(),
        }));
        assert!(!product.matches(&ProductFilter::IdWithVariant {
            id: "shirt".into(),
            variant_id: "shirt-green".into(),
        }));
        assert!(!product.matches(&ProductFilter::IdWithVariant {
            id: "shirt".into(),
            variant_id: String::new(),
        }));
        assert!(!Product::new("mug", "Mug", 1).matches(&ProductFilter::Combination));
        assert!(Product::new("mug", "Mug", 1).matches(&ProductFilter::All));
    }

    #[test]
    fn test_sale_of_variant_moves_all_counters() {
        let mut product = shirt();
        let changed = product
            .apply(&ProductUpdate::Increment(
                StockIncrement::sale(2).unwrap().of_variant("shirt-red"),
            ))
            .unwrap();

        assert!(changed);
        assert_eq!(product.stock, 6);
        assert_eq!(product.sales, 2);
        assert_eq!(product.variant("shirt-red").unwrap().quantity, 3);
        assert_eq!(product.variant("shirt-blue").unwrap().quantity, 3);
    }

    #[test]
    fn test_stock_may_go_negative() {
        let mut product = Product::new("mug", "Mug", 1);
        product
            .apply(&ProductUpdate::Increment(StockIncrement::sale(3).unwrap()))
            .unwrap();
        assert_eq!(product.stock, -2);
    }

    #[test]
    fn test_failed_increment_changes_nothing() {
        let mut product = shirt();
        let result = product.apply(&ProductUpdate::Increment(
            StockIncrement::sale(1).unwrap().of_variant("shirt-green"),
        ));
        assert_eq!(
            result,
            Err(ProductError::VariantNotFound {
                product: "shirt".into(),
                variant: "shirt-green".into(),
            })
        );
        assert_eq!(product, shirt());

        let mut product = Product::new("mug", "Mug", 0);
        product.sales = i64::MAX;
        let result = product.apply(&ProductUpdate::Increment(StockIncrement::sale(1).unwrap()));
        assert_eq!(
            result,
            Err(ProductError::CounterOverflow {
                product: "mug".into(),
                field: "sales",
            })
        );
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_pull_variants() {
        let schema = AttributeSchema::new(["color"]).unwrap();
        let predicate = VariantPredicate {
            field: schema.field("color").unwrap(),
            criterion: AttributeMatch::Equals("red".into()),
        };

        let mut product = shirt();
        assert!(product
            .apply(&ProductUpdate::PullVariants(predicate.clone()))
            .unwrap());
        assert_eq!(product.variants.len(), 1);
        assert!(product.variant("shirt-red").is_none());
        // Counters are not recomputed.
        assert_eq!(product.stock, 8);

        assert!(!product
            .apply(&ProductUpdate::PullVariants(predicate))
            .unwrap());
    }
}
