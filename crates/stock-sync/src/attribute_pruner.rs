//! # Attribute Pruner
//!
//! Removes retired attribute values from the catalog: every variant of every
//! combination product whose attribute matches is pulled from the product's
//! `variants`. Stock counters are left as they are.
//!
//! Keys are resolved through the [`AttributeSchema`], so only configured
//! attribute fields can be addressed.

use crate::clients::ProductClient;
use crate::product_store::{
    AttributeMatch, AttributeSchema, ProductError, PruneValue, VariantPredicate,
};
use crate::report::{FailurePolicy, ItemOutcome, PruneReport, ReportBuilder};
use doc_store::UpdateResult;
use tracing::{error, info, instrument, warn};

pub struct AttributePruner {
    products: ProductClient,
    schema: AttributeSchema,
    policy: FailurePolicy,
}

impl AttributePruner {
    pub fn new(products: ProductClient, schema: AttributeSchema) -> Self {
        Self {
            products,
            schema,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Validates a `(key, value, multi)` request into a typed predicate.
    pub fn predicate(
        &self,
        key: &str,
        value: PruneValue,
        multi: bool,
    ) -> Result<VariantPredicate, ProductError> {
        Ok(VariantPredicate {
            field: self.schema.field(key)?,
            criterion: AttributeMatch::from_request(value, multi)?,
        })
    }

    /// Pulls matching variants from each combination product, one update per
    /// product.
    ///
    /// Returns `Err` only when nothing was written: an invalid request or a
    /// failure to list the combination products. Per-product failures are
    /// recorded in the report.
    #[instrument(skip(self, value), fields(policy = ?self.policy))]
    pub async fn prune_attribute(
        &self,
        key: &str,
        value: PruneValue,
        multi: bool,
    ) -> Result<PruneReport, ProductError> {
        let predicate = self.predicate(key, value, multi)?;
        let products = self.products.combination_products().await.map_err(|e| {
            error!(error = %e, "Failed to list combination products");
            e
        })?;

        let mut report = ReportBuilder::new(self.policy);
        for (index, product) in products.into_iter().enumerate() {
            if !report.should_attempt() {
                report.push(product.id, ItemOutcome::Skipped);
                continue;
            }

            let outcome = match self
                .products
                .pull_variants(product.id.clone(), predicate.clone())
                .await
            {
                Ok(UpdateResult {
                    matched_count: 0, ..
                }) => {
                    warn!(index, product_id = %product.id, "Product vanished before pruning");
                    ItemOutcome::Unmatched
                }
                Ok(result) => ItemOutcome::Applied(result),
                Err(e) => {
                    error!(index, product_id = %product.id, error = %e, "Attribute prune failed");
                    ItemOutcome::Failed(e)
                }
            };
            report.push(product.id, outcome);
        }

        let report = report.finish();
        let summary = report.summary();
        let modified: u64 = report.applied().map(|r| r.modified_count).sum();
        if report.is_complete() {
            info!(%summary, modified, "Attribute pruned");
        } else {
            warn!(%summary, modified, "Attribute prune incomplete");
        }
        Ok(report)
    }

    /// Pulls matching variants from every combination product in one
    /// update-many request.
    ///
    /// The store stops at the first product it cannot update; products
    /// before it keep their changes.
    #[instrument(skip(self, value))]
    pub async fn prune_attribute_bulk(
        &self,
        key: &str,
        value: PruneValue,
        multi: bool,
    ) -> Result<UpdateResult, ProductError> {
        let predicate = self.predicate(key, value, multi)?;
        match self.products.pull_variants_everywhere(predicate).await {
            Ok(result) => {
                info!(
                    matched = result.matched_count,
                    modified = result.modified_count,
                    "Attribute pruned in bulk"
                );
                Ok(result)
            }
            Err(e) => {
                error!(error = %e, "Bulk attribute prune failed");
                Err(e)
            }
        }
    }
}
