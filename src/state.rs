use std::sync::Arc;

use crate::cache::BudgetCache;
use crate::config::Config;
use crate::models::{BudgetKind, SourceShape, YearlyBudget};
use crate::services::loader::Dataset;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dataset: Arc<Dataset>,
    pub cache: Arc<BudgetCache>,
}

impl AppState {
    pub fn new(config: Config, dataset: Dataset) -> Self {
        Self {
            config: Arc::new(config),
            dataset: Arc::new(dataset),
            cache: Arc::new(BudgetCache::new()),
        }
    }

    /// Yearly budgets for one kind and source shape, sorted by year.
    pub fn yearly(&self, kind: BudgetKind, shape: SourceShape) -> Arc<Vec<YearlyBudget>> {
        self.cache.yearly(&self.dataset, kind, shape)
    }

    /// Years present in the yearly budgets for this kind and shape.
    pub fn years(&self, kind: BudgetKind, shape: SourceShape) -> Vec<i32> {
        self.yearly(kind, shape).iter().map(|b| b.year).collect()
    }

    /// Latest year of any source, used when a request names none.
    pub fn default_year(&self) -> i32 {
        self.dataset.years().last().copied().unwrap_or_default()
    }
}
