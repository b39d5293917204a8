use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::filters::{Currency, DisplayUnit, Magnitude, DEFAULT_EXCHANGE_RATE};
use crate::models::Unit;

/// Number of named categories kept before the rest collapse into Others.
pub const DEFAULT_TOP_N: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub static_path: PathBuf,
    /// Unit of the relational JSON and CSV amounts.
    pub source_unit: Unit,
    /// Unit of the nested JSON amounts.
    pub nested_unit: Unit,
    pub exchange_rate: f64,
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 7070,
            data_path: PathBuf::from("data"),
            static_path: PathBuf::from("static"),
            source_unit: Unit::ThousandNtd,
            nested_unit: Unit::HundredMillionNtd,
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            host: env::var("FISCAL_HOST").unwrap_or(defaults.host),
            port: parsed_var("FISCAL_PORT").unwrap_or(defaults.port),
            data_path: env::var("FISCAL_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            static_path: env::var("FISCAL_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_path),
            source_unit: parsed_var("FISCAL_SOURCE_UNIT").unwrap_or(defaults.source_unit),
            nested_unit: parsed_var("FISCAL_NESTED_UNIT").unwrap_or(defaults.nested_unit),
            exchange_rate: parsed_var::<f64>("FISCAL_EXCHANGE_RATE")
                .filter(|rate| *rate > 0.0)
                .unwrap_or(defaults.exchange_rate),
            top_n: parsed_var("FISCAL_TOP_N").unwrap_or(defaults.top_n),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn display_unit(&self, currency: Currency, magnitude: Magnitude) -> DisplayUnit {
        DisplayUnit::new(currency, magnitude, self.exchange_rate)
    }
}

/// Read and parse an env var; unparseable values are logged and ignored.
fn parsed_var<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}
