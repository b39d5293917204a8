//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that drives the router against a small
//! fiscal dataset written to a temporary data directory. Methods are broad to
//! support the different test files.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fiscal_insight::config::Config;
use fiscal_insight::handlers;
use fiscal_insight::services::loader;
use fiscal_insight::state::AppState;
use http_body_util::BodyExt;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

/// Expenditure by function, thousand NT$. 113 drops 社會福利支出 and adds
/// several small functions so ranking has more than five bars.
pub const EXPENDITURE_JSON: &str = r#"[
  {"year": 111, "amount": 1000000,
   "Kuan": [
     {"id": "E1", "name": "教育科學文化支出", "amount": 400000, "parent_id": null},
     {"id": "E2", "name": "國防支出", "amount": 300000, "parent_id": null},
     {"id": "E3", "name": "社會福利支出", "amount": 300000, "parent_id": null}
   ],
   "Xiang": [
     {"id": "E1a", "name": "教育支出", "amount": 250000, "parent_id": "E1"},
     {"id": "E1b", "name": "科學支出", "amount": 150000, "parent_id": "E1"}
   ]},
  {"year": 112, "amount": 1100000,
   "Kuan": [
     {"id": "E1", "name": "教育科學文化支出", "amount": 450000, "parent_id": ""},
     {"id": "E2", "name": "國防支出", "amount": 350000, "parent_id": ""},
     {"id": "E3", "name": "社會福利支出", "amount": 300000, "parent_id": ""}
   ],
   "Xiang": [
     {"id": "E1a", "name": "教育支出", "amount": 300000, "parent_id": "E1"},
     {"id": "E1b", "name": "科學支出", "amount": 150000, "parent_id": "E1"}
   ]},
  {"year": 113, "amount": 1440000,
   "Kuan": [
     {"id": "E1", "name": "教育科學文化支出", "amount": 500000},
     {"id": "E2", "name": "國防支出", "amount": 400000},
     {"id": "E4", "name": "經濟發展支出", "amount": 300000},
     {"id": "E5", "name": "一般政務支出", "amount": 100000},
     {"id": "E6", "name": "退休撫卹支出", "amount": 80000},
     {"id": "E7", "name": "債務支出", "amount": 60000},
     {"id": "E8", "name": "其他支出", "amount": 0}
   ],
   "Xiang": [
     {"id": "E1a", "name": "教育支出", "amount": 320000, "parent_id": "E1"},
     {"id": "E1b", "name": "科學支出", "amount": 180000, "parent_id": "E1"}
   ],
   "Mu": [
     {"id": "E1a1", "name": "國民教育", "amount": 200000, "parent_id": "E1a"},
     {"id": "E1a2", "name": "高等教育", "amount": 120000, "parent_id": "E1a"}
   ]}
]"#;

pub const REVENUE_JSON: &str = r#"[
  {"year": 112, "amount": 1000000,
   "Kuan": [
     {"id": "R1", "name": "稅課收入", "amount": 800000},
     {"id": "R2", "name": "營業盈餘及事業收入", "amount": 200000}
   ],
   "Xiang": [
     {"id": "R1a", "name": "所得稅", "amount": 400000, "parent_id": "R1"}
   ]},
  {"year": 113, "amount": 1150000,
   "Kuan": [
     {"id": "R1", "name": "稅課收入", "amount": 900000},
     {"id": "R2", "name": "營業盈餘及事業收入", "amount": 250000}
   ],
   "Xiang": [
     {"id": "R1a", "name": "所得稅", "amount": 450000, "parent_id": "R1"}
   ]}
]"#;

/// Nested detail export, hundred-million NT$.
pub const DETAIL_JSON: &str = r#"[
  {"year": 113,
   "revenue": [{"name": "稅課收入", "value": 9000}],
   "expenditure": [
     {"name": "教育科學文化支出", "value": 5000,
      "children": [{"name": "教育支出", "value": 3200}]},
     {"name": "國防支出", "value": 4000}
   ]}
]"#;

/// 113 expenditure splits into eight categories of 50, 40, 30, 20, 10, 8, 5
/// and 2 thousand NT$.
pub const BUDGET_CSV: &str = "\
year,type,category_1,category_2,item_name,account_name,amount
113,歲出,教育,學前,幼兒園,補助,50
113,歲出,國防,軍備,採購,裝備,40
113,歲出,社福,年金,老農,津貼,30
113,歲出,經濟,交通,道路,工程,20
113,歲出,一般政務,行政,人事,薪資,10
113,歲出,退撫,退休,月退,給付,8
113,歲出,債務,利息,公債,付息,5
113,歲出,,雜項,其他,其他,2
113,歲入,稅課,所得稅,綜所稅,稅收,120
113,歲入,營業盈餘,國營,中油,繳庫,45
112,歲入,稅課,所得稅,綜所稅,稅收,100
112,歲出,教育,學前,幼兒園,補助,70
";

pub const FUNDS_CSV: &str = "\
year,fund_name,income,expense,surplus
112,國民年金保險基金,500,400,
113,國民年金保險基金,600,450,
113,勞工保險基金,900,1000,
113,就業安定基金,300,200,100
";

pub fn write_fixture(dir: &Path) {
    fs::write(dir.join(loader::EXPENDITURE_FILE), EXPENDITURE_JSON).unwrap();
    fs::write(dir.join(loader::REVENUE_FILE), REVENUE_JSON).unwrap();
    fs::write(dir.join(loader::DETAIL_FILE), DETAIL_JSON).unwrap();
    fs::write(dir.join(loader::BUDGET_CSV_FILE), BUDGET_CSV).unwrap();
    fs::write(dir.join(loader::FUNDS_CSV_FILE), FUNDS_CSV).unwrap();
}

pub fn config_for(dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".into(),
        data_path: dir.to_path_buf(),
        ..Config::default()
    }
}

/// A test client holding the loaded state and the data directory behind it.
pub struct TestClient {
    state: AppState,
    _data_dir: TempDir,
}

impl TestClient {
    /// Create a client over the full fixture.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_fixture(dir.path());
        Self::from_dir(dir)
    }

    /// Create a client over an empty data directory.
    pub fn empty() -> Self {
        Self::from_dir(TempDir::new().expect("Failed to create temp dir"))
    }

    fn from_dir(dir: TempDir) -> Self {
        let config = config_for(dir.path());
        let dataset = loader::load_dataset(&config).expect("Failed to load fixture");
        Self {
            state: AppState::new(config, dataset),
            _data_dir: dir,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    /// Get JSON from an endpoint and parse it.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        (status, parsed)
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a URI with query pairs, percent-encoding the values.
pub fn uri(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}
