use serde::Serialize;

use super::amount::Amount;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    pub label: String,
    pub value: Amount,
}

impl CategoryBucket {
    pub fn new(label: impl Into<String>, value: Amount) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One year of a trend series.
///
/// `found` is false when the drill path does not exist in that year and the
/// value was zero-filled, which is different from a category whose recorded
/// amount is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub value: Amount,
    pub found: bool,
}
