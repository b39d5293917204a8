//! Money formatting for the presentation boundary.
//!
//! Amounts travel through aggregation in their source unit. Only here are
//! they converted to the currency and magnitude the reader picked.
//!
//! Format: sign + currency symbol + number with thousands separator + magnitude suffix

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Amount;

/// NT$ per US$ used when no rate is configured.
pub const DEFAULT_EXCHANGE_RATE: f64 = 32.5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Twd,
    Usd,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Twd => "NT$",
            Self::Usd => "US$",
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TWD" | "NTD" => Ok(Self::Twd),
            "USD" => Ok(Self::Usd),
            other => Err(format!("Unknown currency: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    Raw,
    Thousand,
    Million,
    /// 億, 10^8: the customary scale for national budgets.
    #[default]
    Yi,
    Billion,
}

impl Magnitude {
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Raw => 1.0,
            Self::Thousand => 1e3,
            Self::Million => 1e6,
            Self::Yi => 1e8,
            Self::Billion => 1e9,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Raw => "",
            Self::Thousand => "K",
            Self::Million => "M",
            Self::Yi => "億",
            Self::Billion => "B",
        }
    }
}

impl FromStr for Magnitude {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "thousand" => Ok(Self::Thousand),
            "million" => Ok(Self::Million),
            "yi" | "億" => Ok(Self::Yi),
            "billion" => Ok(Self::Billion),
            other => Err(format!("Unknown magnitude: {}", other)),
        }
    }
}

/// The reader's choice of currency and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayUnit {
    pub currency: Currency,
    pub magnitude: Magnitude,
    pub exchange_rate: f64,
}

impl Default for DisplayUnit {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            magnitude: Magnitude::default(),
            exchange_rate: DEFAULT_EXCHANGE_RATE,
        }
    }
}

impl DisplayUnit {
    pub fn new(currency: Currency, magnitude: Magnitude, exchange_rate: f64) -> Self {
        Self {
            currency,
            magnitude,
            exchange_rate,
        }
    }

    /// Numeric value in the display currency and magnitude.
    pub fn convert(&self, amount: Amount) -> f64 {
        let mut value = amount.to_ntd();
        if self.currency == Currency::Usd && self.exchange_rate > 0.0 {
            value /= self.exchange_rate;
        }
        value / self.magnitude.divisor()
    }

    /// Axis label, e.g. "NT$ (億)".
    pub fn label(&self) -> String {
        match self.magnitude {
            Magnitude::Raw => self.currency.symbol().to_string(),
            m => format!("{} ({})", self.currency.symbol(), m.suffix()),
        }
    }

    pub fn format(&self, amount: Amount) -> String {
        self.format_with(amount, 1)
    }

    pub fn format_with(&self, amount: Amount, fraction_digits: usize) -> String {
        let value = self.convert(amount);
        let number = format_number(value.abs(), fraction_digits);
        let sign = if value < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };
        let suffix = self.magnitude.suffix();
        if suffix.is_empty() {
            format!("{}{}{}", sign, self.currency.symbol(), number)
        } else {
            format!("{}{}{} {}", sign, self.currency.symbol(), number, suffix)
        }
    }
}

/// Share of `part` in `whole` as "12.3%"; empty wholes give "0.0%".
pub fn format_percent(part: Amount, whole: Amount) -> String {
    let whole = whole.to_ntd();
    if whole == 0.0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part.to_ntd() / whole * 100.0)
}

/// Non-negative number with `,` thousands separators.
fn format_number(value: f64, fraction_digits: usize) -> String {
    let fixed = format!("{:.*}", fraction_digits, value);
    let (whole, fraction) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };

    let grouped = format_with_thousands(whole, ',');
    match fraction {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

fn format_with_thousands(digits: &str, sep: char) -> String {
    let chars: Vec<char> = digits.chars().rev().collect();
    let mut result = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(sep);
        }
        result.push(*c);
    }

    result.iter().rev().collect()
}
