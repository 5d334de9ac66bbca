//! # Stock Adjuster
//!
//! Applies a placed order's cart to the catalog: every line item lowers its
//! product's `stock` (and, for combination products, the purchased variant's
//! `quantity`) and raises `sales` by the purchased quantity.
//!
//! Each line item is one atomic find-and-update. Items are processed in cart
//! order, one at a time; there is no transaction spanning the cart, so a
//! failure part way through leaves earlier items applied. The returned
//! [`StockReport`] says exactly which.

use crate::clients::ProductClient;
use crate::model::CartLineItem;
use crate::product_store::{ProductError, ProductFilter, StockIncrement};
use crate::report::{FailurePolicy, ItemOutcome, ReportBuilder, StockReport};
use tracing::{error, info, instrument, warn};

/// Decrements stock for purchased cart items.
#[derive(Clone)]
pub struct StockAdjuster {
    products: ProductClient,
    policy: FailurePolicy,
}

impl StockAdjuster {
    pub fn new(products: ProductClient) -> Self {
        Self {
            products,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Applies every line item of `cart` and reports the outcome of each.
    ///
    /// Never fails as a whole. Under [`FailurePolicy::AbortRemaining`] the
    /// items after the first failure are reported as skipped and not sent.
    #[instrument(skip(self, cart), fields(items = cart.len(), policy = ?self.policy))]
    pub async fn adjust_stock(&self, cart: &[CartLineItem]) -> StockReport {
        let mut report = ReportBuilder::new(self.policy);

        for (index, item) in cart.iter().enumerate() {
            if !report.should_attempt() {
                report.push(item.id.clone(), ItemOutcome::Skipped);
                continue;
            }

            let sale = match line_item_update(item) {
                Ok(update) => update,
                Err(e) => {
                    error!(index, product_id = %item.id, quantity = item.quantity, error = %e, "Line item rejected");
                    report.push(item.id.clone(), ItemOutcome::Failed(e));
                    continue;
                }
            };
            let outcome = match self.products.record_sale(sale.0, sale.1).await {
                Ok(Some(product)) => ItemOutcome::Applied(product),
                Ok(None) => {
                    warn!(index, product_id = %item.id, variant_id = item.variant_id(), "No product matched line item");
                    ItemOutcome::Unmatched
                }
                Err(e) => {
                    error!(index, product_id = %item.id, error = %e, "Stock adjustment failed");
                    ItemOutcome::Failed(e)
                }
            };
            report.push(item.id.clone(), outcome);
        }

        let report = report.finish();
        let summary = report.summary();
        if report.is_complete() {
            info!(%summary, "Stock adjusted");
        } else {
            warn!(%summary, "Stock adjustment incomplete");
        }
        report
    }
}

/// Filter and increment for one line item.
///
/// A combination item addresses its variant by `productId`. When the item
/// names no variant the id is empty, and the filter matches nothing. A
/// quantity whose negation overflows is a `CounterOverflow` on `quantity`.
pub fn line_item_update(
    item: &CartLineItem,
) -> Result<(ProductFilter, StockIncrement), ProductError> {
    let sale = StockIncrement::sale(item.quantity).ok_or_else(|| ProductError::CounterOverflow {
        product: item.id.to_string(),
        field: "quantity",
    })?;
    if item.is_combination {
        let variant_id = item.variant_id().to_string();
        Ok((
            ProductFilter::IdWithVariant {
                id: item.id.clone(),
                variant_id: variant_id.clone(),
            },
            sale.of_variant(variant_id),
        ))
    } else {
        Ok((ProductFilter::Id(item.id.clone()), sale))
    }
}
