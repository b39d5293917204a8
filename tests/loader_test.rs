//! Integration tests for reading the data directory.

mod common;

use common::{config_for, write_fixture};
use fiscal_insight::error::AppError;
use fiscal_insight::models::{Amount, BudgetKind, Unit};
use fiscal_insight::server;
use fiscal_insight::services::loader::{self, load_dataset};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_loads_every_file() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let dataset = load_dataset(&config_for(dir.path())).unwrap();
    assert_eq!(dataset.relational(BudgetKind::Expenditure).len(), 3);
    assert_eq!(dataset.relational(BudgetKind::Revenue).len(), 2);
    assert_eq!(dataset.detail.len(), 1);
    assert_eq!(dataset.rows.len(), 12);
    assert_eq!(dataset.funds.len(), 4);
    assert_eq!(dataset.years(), vec![111, 112, 113]);
}

#[test]
fn test_fund_surplus_is_derived_when_blank() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let dataset = load_dataset(&config_for(dir.path())).unwrap();
    assert_eq!(
        dataset.funds[0].surplus,
        Amount::new(100.0, Unit::ThousandNtd)
    );
    assert_eq!(
        dataset.funds[3].surplus,
        Amount::new(100.0, Unit::ThousandNtd)
    );
}

#[test]
fn test_missing_files_are_empty() {
    let dir = TempDir::new().unwrap();
    let dataset = load_dataset(&config_for(dir.path())).unwrap();
    assert!(dataset.is_empty());
    assert!(dataset.years().is_empty());
}

#[test]
fn test_malformed_json_fails() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    fs::write(dir.path().join(loader::EXPENDITURE_FILE), "[{\"year\": ").unwrap();

    match load_dataset(&config_for(dir.path())) {
        Err(AppError::Json { file, .. }) => assert_eq!(file, loader::EXPENDITURE_FILE),
        other => panic!("expected JSON error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_csv_without_required_column_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(loader::BUDGET_CSV_FILE),
        "year,category_1,amount\n113,教育,50\n",
    )
    .unwrap();

    let result = load_dataset(&config_for(dir.path()));
    assert!(matches!(result, Err(AppError::CsvParse(_))));
}

#[test]
fn test_bad_csv_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(loader::BUDGET_CSV_FILE),
        "year,type,category_1,amount\n\
         113,歲出,教育,\"1,200\"\n\
         abc,歲出,國防,40\n\
         113,盈餘,社福,30\n",
    )
    .unwrap();

    let dataset = load_dataset(&config_for(dir.path())).unwrap();
    assert_eq!(dataset.rows.len(), 1);
    assert_eq!(dataset.rows[0].amount.value, 1200.0);
}

#[test]
fn test_build_app_fails_on_malformed_data() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(loader::DETAIL_FILE), "{not json").unwrap();
    assert!(server::build_app(config_for(dir.path())).is_err());
}

#[tokio::test]
async fn test_build_app_loads_fixture() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let (state, _app) = server::build_app(config_for(dir.path())).unwrap();
    assert_eq!(state.default_year(), 113);
}
