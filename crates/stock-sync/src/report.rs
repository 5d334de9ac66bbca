//! Per-item outcome reports returned by the batch operations.
//!
//! A batch never fails as a whole once it has started: every input item ends
//! up in the report with an [`ItemOutcome`], and the caller decides what a
//! failure means.

use crate::model::{Product, ProductId};
use crate::product_store::ProductError;
use doc_store::UpdateResult;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// What a batch does after an item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure; later items are reported as skipped.
    #[default]
    AbortRemaining,
    /// Attempt every item regardless of earlier failures.
    ContinueOnError,
}

/// Result of processing one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome<T> {
    /// The update was written. Carries what the store returned.
    Applied(T),
    /// The filter selected no document; nothing was written.
    Unmatched,
    /// The update was rejected or the store could not be reached.
    Failed(ProductError),
    /// Not attempted because an earlier item failed.
    Skipped,
}

impl<T> ItemOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport<T> {
    /// Position of the item in the input.
    pub index: usize,
    pub product_id: ProductId,
    pub outcome: ItemOutcome<T>,
}

/// Ordered outcomes of one batch, one entry per input item.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport<T> {
    pub policy: FailurePolicy,
    pub items: Vec<ItemReport<T>>,
}

/// Counts per outcome kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    pub total: usize,
    pub applied: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} items: {} applied, {} unmatched, {} failed, {} skipped",
            self.total, self.applied, self.unmatched, self.failed, self.skipped
        )
    }
}

/// Report of a stock adjustment; applied items carry the updated product.
pub type StockReport = UpdateReport<Product>;

/// Report of an attribute prune; applied items carry the update counts.
pub type PruneReport = UpdateReport<UpdateResult>;

impl<T> UpdateReport<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values returned for applied items, in input order.
    pub fn applied(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Applied(value) => Some(value),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport<T>> {
        self.items.iter().filter(|item| item.outcome.is_failed())
    }

    pub fn first_failure(&self) -> Option<&ProductError> {
        self.items.iter().find_map(|item| match &item.outcome {
            ItemOutcome::Failed(error) => Some(error),
            _ => None,
        })
    }

    /// `true` when every item was attempted and none failed.
    pub fn is_complete(&self) -> bool {
        let summary = self.summary();
        summary.failed == 0 && summary.skipped == 0
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.items.len(),
            ..Default::default()
        };
        for item in &self.items {
            match item.outcome {
                ItemOutcome::Applied(_) => summary.applied += 1,
                ItemOutcome::Unmatched => summary.unmatched += 1,
                ItemOutcome::Failed(_) => summary.failed += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Accumulates outcomes and tracks whether the policy says to stop.
pub(crate) struct ReportBuilder<T> {
    report: UpdateReport<T>,
    aborted: bool,
}

impl<T> ReportBuilder<T> {
    pub(crate) fn new(policy: FailurePolicy) -> Self {
        Self {
            report: UpdateReport {
                policy,
                items: Vec::new(),
            },
            aborted: false,
        }
    }

    /// `false` once a failure has aborted the batch.
    pub(crate) fn should_attempt(&self) -> bool {
        !self.aborted
    }

    pub(crate) fn push(&mut self, product_id: ProductId, outcome: ItemOutcome<T>) {
        if outcome.is_failed() && self.report.policy == FailurePolicy::AbortRemaining {
            self.aborted = true;
        }
        let index = self.report.items.len();
        self.report.items.push(ItemReport {
            index,
            product_id,
            outcome,
        });
    }

    pub(crate) fn finish(self) -> UpdateReport<T> {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ItemOutcome<u32> {
        ItemOutcome::Failed(ProductError::StoreError("Collection closed".into()))
    }

    fn run(policy: FailurePolicy, outcomes: Vec<ItemOutcome<u32>>) -> UpdateReport<u32> {
        let mut builder = ReportBuilder::new(policy);
        for (i, outcome) in outcomes.into_iter().enumerate() {
            let id = ProductId(format!("p-{i}"));
            if builder.should_attempt() {
                builder.push(id, outcome);
            } else {
                builder.push(id, ItemOutcome::Skipped);
            }
        }
        builder.finish()
    }

    #[test]
    fn test_abort_remaining_skips_after_first_failure() {
        let report = run(
            FailurePolicy::AbortRemaining,
            vec![ItemOutcome::Applied(1), failure(), ItemOutcome::Applied(3), ItemOutcome::Unmatched],
        );

        assert_eq!(
            report.summary(),
            ReportSummary {
                total: 4,
                applied: 1,
                unmatched: 0,
                failed: 1,
                skipped: 2,
            }
        );
        assert_eq!(report.items[2].outcome, ItemOutcome::Skipped);
        assert_eq!(report.items[3].index, 3);
        assert_eq!(report.failures().next().unwrap().product_id, ProductId("p-1".into()));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_continue_on_error_attempts_everything() {
        let report = run(
            FailurePolicy::ContinueOnError,
            vec![failure(), ItemOutcome::Applied(2), ItemOutcome::Unmatched],
        );

        assert_eq!(report.applied().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(report.summary().skipped, 0);
        assert!(matches!(report.first_failure(), Some(ProductError::StoreError(_))));
        assert_eq!(
            report.summary().to_string(),
            "3 items: 1 applied, 1 unmatched, 1 failed, 0 skipped"
        );
    }

    #[test]
    fn test_unmatched_items_still_complete() {
        let report = run(FailurePolicy::default(), vec![ItemOutcome::Unmatched]);
        assert!(report.is_complete());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_policy_names() {
        let policy: FailurePolicy = serde_json::from_str(r#""continue_on_error""#).unwrap();
        assert_eq!(policy, FailurePolicy::ContinueOnError);
        assert_eq!(FailurePolicy::default(), FailurePolicy::AbortRemaining);
    }
}
