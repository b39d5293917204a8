use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{BudgetKind, BudgetRow, FundRow, Unit};

use super::adapters::{NestedYear, RelationalYear};
use super::csv_parser;

pub const REVENUE_FILE: &str = "revenue_by_source.json";
pub const EXPENDITURE_FILE: &str = "expenditure_by_function.json";
pub const DETAIL_FILE: &str = "budget_detail.json";
pub const BUDGET_CSV_FILE: &str = "budget_all.csv";
pub const FUNDS_CSV_FILE: &str = "funds_all.csv";

/// Everything read from the data directory, exactly once per process.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub revenue: Vec<RelationalYear>,
    pub expenditure: Vec<RelationalYear>,
    pub detail: Vec<NestedYear>,
    pub rows: Vec<BudgetRow>,
    pub funds: Vec<FundRow>,
    /// Unit of the relational and tabular files.
    pub source_unit: Unit,
    /// Unit of the nested detail export.
    pub nested_unit: Unit,
}

impl Dataset {
    pub fn relational(&self, kind: BudgetKind) -> &[RelationalYear] {
        match kind {
            BudgetKind::Revenue => &self.revenue,
            BudgetKind::Expenditure => &self.expenditure,
        }
    }

    /// Every fiscal year present in any of the files, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .revenue
            .iter()
            .chain(self.expenditure.iter())
            .map(|y| y.year)
            .chain(self.detail.iter().map(|y| y.year))
            .chain(self.rows.iter().map(|r| r.year))
            .chain(self.funds.iter().map(|f| f.year))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty()
            && self.expenditure.is_empty()
            && self.detail.is_empty()
            && self.rows.is_empty()
            && self.funds.is_empty()
    }
}

/// Load every known file from `config.data_path`.
///
/// Missing files are logged and treated as empty. A file that exists but
/// cannot be parsed fails the whole load.
pub fn load_dataset(config: &Config) -> AppResult<Dataset> {
    let dir = config.data_path.as_path();
    info!(path = %dir.display(), "Loading fiscal data");

    let source_unit = config.source_unit;

    let dataset = Dataset {
        revenue: read_json(dir, REVENUE_FILE)?,
        expenditure: read_json(dir, EXPENDITURE_FILE)?,
        detail: read_json(dir, DETAIL_FILE)?,
        rows: match read_bytes(dir, BUDGET_CSV_FILE)? {
            Some(bytes) => csv_parser::parse_budget_csv(&bytes, source_unit)?.rows,
            None => Vec::new(),
        },
        funds: match read_bytes(dir, FUNDS_CSV_FILE)? {
            Some(bytes) => csv_parser::parse_fund_csv(&bytes, source_unit)?.rows,
            None => Vec::new(),
        },
        source_unit,
        nested_unit: config.nested_unit,
    };

    info!(
        revenue_years = dataset.revenue.len(),
        expenditure_years = dataset.expenditure.len(),
        detail_years = dataset.detail.len(),
        budget_rows = dataset.rows.len(),
        fund_rows = dataset.funds.len(),
        "Fiscal data loaded"
    );
    if dataset.is_empty() {
        warn!(path = %dir.display(), "No fiscal data files found");
    }

    Ok(dataset)
}

fn read_bytes(dir: &Path, name: &str) -> AppResult<Option<Vec<u8>>> {
    let path = dir.join(name);
    match fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} not found, treating as empty", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> AppResult<Vec<T>> {
    match read_bytes(dir, name)? {
        Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| AppError::Json {
            file: name.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}
