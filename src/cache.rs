//! Lazily built, never evicted per-(type, shape) yearly budgets.
//!
//! Each slot is filled the first time its combination is requested. The
//! underlying dataset is immutable for the life of the process, so there is
//! nothing to invalidate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::models::{BudgetKind, SourceShape, YearlyBudget};
use crate::services::adapters;
use crate::services::loader::Dataset;

struct Slot<T> {
    inner: RwLock<Option<Arc<T>>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    fn get(&self) -> Option<Arc<T>> {
        let guard = self.inner.read().ok()?;
        guard.as_ref().cloned()
    }

    /// Return the cached value, building it with `build` if the slot is empty.
    /// When two callers race, the first value stored wins.
    fn get_or_build(&self, build: impl FnOnce() -> T) -> (Arc<T>, bool) {
        if let Some(cached) = self.get() {
            return (cached, false);
        }
        let built = Arc::new(build());
        match self.inner.write() {
            Ok(mut guard) => {
                if let Some(existing) = guard.as_ref() {
                    return (Arc::clone(existing), false);
                }
                *guard = Some(Arc::clone(&built));
                (built, true)
            }
            Err(_) => (built, true),
        }
    }
}

pub struct BudgetCache {
    builds: AtomicUsize,
    relational_revenue: Slot<Vec<YearlyBudget>>,
    relational_expenditure: Slot<Vec<YearlyBudget>>,
    nested_revenue: Slot<Vec<YearlyBudget>>,
    nested_expenditure: Slot<Vec<YearlyBudget>>,
}

impl Default for BudgetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetCache {
    pub fn new() -> Self {
        Self {
            builds: AtomicUsize::new(0),
            relational_revenue: Slot::new(),
            relational_expenditure: Slot::new(),
            nested_revenue: Slot::new(),
            nested_expenditure: Slot::new(),
        }
    }

    fn slot(&self, kind: BudgetKind, shape: SourceShape) -> &Slot<Vec<YearlyBudget>> {
        match (shape, kind) {
            (SourceShape::Relational, BudgetKind::Revenue) => &self.relational_revenue,
            (SourceShape::Relational, BudgetKind::Expenditure) => &self.relational_expenditure,
            (SourceShape::Nested, BudgetKind::Revenue) => &self.nested_revenue,
            (SourceShape::Nested, BudgetKind::Expenditure) => &self.nested_expenditure,
        }
    }

    /// Yearly budgets for one side and source shape, ascending by year.
    pub fn yearly(
        &self,
        dataset: &Dataset,
        kind: BudgetKind,
        shape: SourceShape,
    ) -> Arc<Vec<YearlyBudget>> {
        let (budgets, built) = self.slot(kind, shape).get_or_build(|| {
            let mut budgets = match shape {
                SourceShape::Relational => {
                    adapters::from_relational(dataset.relational(kind), dataset.source_unit)
                }
                SourceShape::Nested => {
                    adapters::from_nested(&dataset.detail, kind, dataset.nested_unit)
                }
            };
            budgets.sort_by_key(|b| b.year);
            budgets
        });

        if built {
            self.builds.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                kind = kind.as_str(),
                shape = shape.as_str(),
                years = budgets.len(),
                "Built yearly budget trees"
            );
        }
        budgets
    }

    /// Number of slots built so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}
