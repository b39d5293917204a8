use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Magnitude in which a source file states its figures.
///
/// Budget books publish in thousands of NT$, the summarized detail exports
/// in 億 (hundred millions). Amounts always carry their unit so that sums
/// never mix scales silently.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Ntd,
    #[default]
    ThousandNtd,
    HundredMillionNtd,
}

impl Unit {
    /// Number of NT$ in one unit.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Ntd => 1.0,
            Self::ThousandNtd => 1_000.0,
            Self::HundredMillionNtd => 100_000_000.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ntd => "ntd",
            Self::ThousandNtd => "thousand_ntd",
            Self::HundredMillionNtd => "hundred_million_ntd",
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ntd" | "raw" | "1" => Ok(Self::Ntd),
            "thousand" | "thousand_ntd" | "1000" => Ok(Self::ThousandNtd),
            "yi" | "億" | "hundred_million" | "hundred_million_ntd" => Ok(Self::HundredMillionNtd),
            other => Err(format!("Unknown amount unit: {}", other)),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monetary figure tagged with the unit it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: f64,
    pub unit: Unit,
}

impl Amount {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn zero(unit: Unit) -> Self {
        Self { value: 0.0, unit }
    }

    /// Re-express this amount in another unit. Same-unit conversion is exact.
    pub fn in_unit(self, unit: Unit) -> Self {
        if self.unit == unit {
            return self;
        }
        Self {
            value: self.value * self.unit.factor() / unit.factor(),
            unit,
        }
    }

    pub fn to_ntd(self) -> f64 {
        self.value * self.unit.factor()
    }

    pub fn is_positive(&self) -> bool {
        self.value > 0.0
    }

    /// Sum of `amounts` expressed in `unit`. An empty input is zero in `unit`.
    pub fn total<I>(amounts: I, unit: Unit) -> Self
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .fold(Self::zero(unit), |acc, amount| acc + amount)
    }

    /// Mean over `count` items; zero when `count` is zero.
    pub fn average(self, count: usize) -> Self {
        if count == 0 {
            return Self::zero(self.unit);
        }
        Self {
            value: self.value / count as f64,
            unit: self.unit,
        }
    }

    /// Descending order by NT$ value, suitable for `sort_by`.
    pub fn cmp_desc(a: &Self, b: &Self) -> std::cmp::Ordering {
        b.to_ntd().total_cmp(&a.to_ntd())
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount {
            value: self.value + rhs.in_unit(self.unit).value,
            unit: self.unit,
        }
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

/// Sums into the unit of the first item; an empty iterator yields zero NT$.
/// Use [`Amount::total`] when an empty sum must carry a specific unit.
impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(mut iter: I) -> Self {
        match iter.next() {
            Some(first) => iter.fold(first, |acc, a| acc + a),
            None => Amount::zero(Unit::Ntd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_unit_addition_is_exact() {
        let a = Amount::new(50.0, Unit::ThousandNtd);
        let b = Amount::new(25.0, Unit::ThousandNtd);
        assert_eq!(a + b, Amount::new(75.0, Unit::ThousandNtd));
    }

    #[test]
    fn test_addition_converts_rhs_into_lhs_unit() {
        let a = Amount::new(1.0, Unit::HundredMillionNtd);
        let b = Amount::new(50_000.0, Unit::ThousandNtd);
        let sum = a + b;
        assert_eq!(sum.unit, Unit::HundredMillionNtd);
        assert!((sum.value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_to_ntd() {
        assert_eq!(Amount::new(3.0, Unit::ThousandNtd).to_ntd(), 3_000.0);
        assert_eq!(Amount::new(2.0, Unit::Ntd).to_ntd(), 2.0);
    }

    #[test]
    fn test_sum_uses_first_unit() {
        let total: Amount = vec![
            Amount::new(1.0, Unit::ThousandNtd),
            Amount::new(2_000.0, Unit::Ntd),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Amount::new(3.0, Unit::ThousandNtd));
    }

    #[test]
    fn test_total_keeps_unit_when_empty() {
        let empty = Amount::total(Vec::new(), Unit::ThousandNtd);
        assert_eq!(empty, Amount::zero(Unit::ThousandNtd));

        let mixed = Amount::total(
            vec![
                Amount::new(1.0, Unit::HundredMillionNtd),
                Amount::new(50_000.0, Unit::ThousandNtd),
            ],
            Unit::ThousandNtd,
        );
        assert_eq!(mixed, Amount::new(150_000.0, Unit::ThousandNtd));
    }

    #[test]
    fn test_average() {
        let sum = Amount::new(9.0, Unit::ThousandNtd);
        assert_eq!(sum.average(2), Amount::new(4.5, Unit::ThousandNtd));
        assert_eq!(sum.average(0), Amount::zero(Unit::ThousandNtd));
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("thousand".parse::<Unit>(), Ok(Unit::ThousandNtd));
        assert_eq!("億".parse::<Unit>(), Ok(Unit::HundredMillionNtd));
        assert!("furlongs".parse::<Unit>().is_err());
    }
}
