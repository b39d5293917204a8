//! Chart-ready arrays for the echarts front end.
//!
//! This is the only place where non-positive values are dropped and where
//! amounts leave their source unit.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::filters::{format_percent, DisplayUnit};
use crate::models::{
    Amount, BudgetKind, BudgetNode, BudgetRow, CategoryBucket, FundMetric, FundRow, Period,
    TrendPoint, Unit,
};

use super::aggregator;

/// Bars shown in a ranking before "show all".
pub const RANKING_LIMIT: usize = 5;

/// Funds shown in the fund ranking.
pub const FUND_RANKING_LIMIT: usize = 10;

/// Categories compared between periods when none are requested.
pub const COMPARE_CATEGORY_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: f64,
    pub formatted: String,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub name: String,
    pub value: f64,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub unit_label: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    /// False where the value was zero-filled because the category is absent.
    pub found: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualSeries {
    pub unit_label: String,
    pub years: Vec<i32>,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

/// Per-year averages of the budget table over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAverage {
    pub period: Period,
    /// Years of the period that have any rows; the divisor of every average.
    pub year_count: usize,
    pub revenue: Amount,
    pub expenditure: Amount,
    /// Averages of the requested `category_1` labels, in request order.
    pub categories: Vec<CategoryBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSeries {
    pub name: String,
    pub year_count: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Radar {
    pub unit_label: String,
    pub indicators: Vec<String>,
    /// Shared axis maximum, 10% above the largest value.
    pub max: f64,
    pub series: Vec<RadarSeries>,
}

fn slices<'a, I>(items: I, unit: &DisplayUnit) -> Vec<Slice>
where
    I: IntoIterator<Item = (&'a str, Amount)>,
{
    let positive: Vec<(&str, Amount)> = items
        .into_iter()
        .filter(|(_, value)| value.is_positive())
        .collect();
    let Some(&(_, first)) = positive.first() else {
        return Vec::new();
    };
    let whole = positive
        .iter()
        .skip(1)
        .fold(first, |acc, (_, value)| acc + *value);

    positive
        .into_iter()
        .map(|(name, value)| Slice {
            name: name.to_string(),
            value: unit.convert(value),
            formatted: unit.format(value),
            percent: format_percent(value, whole),
        })
        .collect()
}

/// Donut of a node's children. Children must already be in display order.
pub fn donut_from_nodes(children: &[&BudgetNode], unit: &DisplayUnit) -> Vec<Slice> {
    slices(children.iter().map(|c| (c.name.as_str(), c.value)), unit)
}

pub fn donut_from_buckets(buckets: &[CategoryBucket], unit: &DisplayUnit) -> Vec<Slice> {
    slices(buckets.iter().map(|b| (b.label.as_str(), b.value)), unit)
}

/// Ranking bars, largest first, limited to [`RANKING_LIMIT`] unless `show_all`.
pub fn ranking(sorted_children: &[&BudgetNode], show_all: bool, unit: &DisplayUnit) -> Vec<Bar> {
    let limit = if show_all { usize::MAX } else { RANKING_LIMIT };
    sorted_children
        .iter()
        .filter(|c| c.value.is_positive())
        .take(limit)
        .map(|c| Bar {
            name: c.name.clone(),
            value: unit.convert(c.value),
            formatted: unit.format(c.value),
        })
        .collect()
}

/// Number of positive children, i.e. bars available to "show all".
pub fn rankable_count(children: &[&BudgetNode]) -> usize {
    children.iter().filter(|c| c.value.is_positive()).count()
}

pub fn line(points: &[TrendPoint], unit: &DisplayUnit) -> LineSeries {
    LineSeries {
        unit_label: unit.label(),
        categories: points.iter().map(|p| format!("Y{}", p.year)).collect(),
        values: points.iter().map(|p| unit.convert(p.value)).collect(),
        found: points.iter().map(|p| p.found).collect(),
    }
}

/// Top funds of one year by income or expense.
pub fn fund_ranking(
    funds: &[FundRow],
    year: i32,
    metric: FundMetric,
    unit: &DisplayUnit,
) -> Vec<Bar> {
    let buckets = aggregator::group_by(
        funds.iter().filter(|f| f.year == year),
        |f: &FundRow| f.fund_name.as_str(),
        |f: &FundRow| metric.of(f),
    );
    buckets
        .into_iter()
        .take(FUND_RANKING_LIMIT)
        .map(|b| Bar {
            value: unit.convert(b.value),
            formatted: unit.format(b.value),
            name: b.label,
        })
        .collect()
}

/// Total fund income (`first`) and expense (`second`) per year.
pub fn fund_totals(funds: &[FundRow], unit: &DisplayUnit) -> DualSeries {
    let mut by_year: BTreeMap<i32, (Amount, Amount)> = BTreeMap::new();
    for fund in funds {
        by_year
            .entry(fund.year)
            .and_modify(|(income, expense)| {
                *income += fund.income;
                *expense += fund.expense;
            })
            .or_insert((fund.income, fund.expense));
    }

    DualSeries {
        unit_label: unit.label(),
        years: by_year.keys().copied().collect(),
        first: by_year.values().map(|(i, _)| unit.convert(*i)).collect(),
        second: by_year.values().map(|(_, e)| unit.convert(*e)).collect(),
    }
}

/// Revenue (`first`) and expenditure (`second`) per year from the budget
/// table. Years missing on one side are zero.
pub fn overview(rows: &[BudgetRow], unit: &DisplayUnit) -> DualSeries {
    let revenue: BTreeMap<i32, Amount> = aggregator::yearly_totals(rows, BudgetKind::Revenue)
        .into_iter()
        .collect();
    let expenditure: BTreeMap<i32, Amount> =
        aggregator::yearly_totals(rows, BudgetKind::Expenditure)
            .into_iter()
            .collect();

    let mut years: Vec<i32> = revenue.keys().chain(expenditure.keys()).copied().collect();
    years.sort_unstable();
    years.dedup();

    let series = |totals: &BTreeMap<i32, Amount>| -> Vec<f64> {
        years
            .iter()
            .map(|y| totals.get(y).map(|a| unit.convert(*a)).unwrap_or(0.0))
            .collect()
    };

    DualSeries {
        unit_label: unit.label(),
        first: series(&revenue),
        second: series(&expenditure),
        years,
    }
}

/// Average yearly revenue, expenditure and `categories` over `period`.
///
/// A period without rows averages to zero everywhere. Category labels match
/// `category_1` on either budget side.
pub fn period_average(
    rows: &[BudgetRow],
    period: Period,
    categories: &[String],
    unit: Unit,
) -> PeriodAverage {
    let in_period: Vec<&BudgetRow> = rows.iter().filter(|r| period.contains(r.year)).collect();
    let mut years: Vec<i32> = in_period.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();
    let year_count = years.len();

    let side = |kind: BudgetKind| {
        let totals = aggregator::yearly_totals(rows, kind)
            .into_iter()
            .filter(|(year, _)| period.contains(*year))
            .map(|(_, total)| total);
        Amount::total(totals, unit).average(year_count)
    };

    let categories = categories
        .iter()
        .map(|label| {
            let matching = in_period
                .iter()
                .filter(|r| aggregator::label_of(&r.category_1) == label.as_str())
                .map(|r| r.amount);
            CategoryBucket::new(
                label.as_str(),
                Amount::total(matching, unit).average(year_count),
            )
        })
        .collect();

    PeriodAverage {
        period,
        year_count,
        revenue: side(BudgetKind::Revenue),
        expenditure: side(BudgetKind::Expenditure),
        categories,
    }
}

/// Largest positive expenditure categories across all `periods`.
pub fn top_categories(rows: &[BudgetRow], periods: &[Period], limit: usize) -> Vec<String> {
    let in_scope = rows.iter().filter(|r| {
        r.kind == BudgetKind::Expenditure && periods.iter().any(|p| p.contains(r.year))
    });
    aggregator::group_by(
        in_scope,
        |r: &BudgetRow| r.category_1.as_str(),
        |r: &BudgetRow| r.amount,
    )
    .into_iter()
    .filter(|b| b.value.is_positive())
    .take(limit)
    .map(|b| b.label)
    .collect()
}

/// Radar chart with one series per period over shared indicators.
pub fn radar(averages: &[PeriodAverage], unit: &DisplayUnit) -> Radar {
    let mut indicators: Vec<String> = BudgetKind::all()
        .iter()
        .map(|k| k.display_name().to_string())
        .collect();
    if let Some(first) = averages.first() {
        indicators.extend(first.categories.iter().map(|c| c.label.clone()));
    }

    let series: Vec<RadarSeries> = averages
        .iter()
        .map(|avg| {
            let values = [avg.revenue, avg.expenditure]
                .into_iter()
                .chain(avg.categories.iter().map(|c| c.value))
                .map(|amount| unit.convert(amount))
                .collect();
            RadarSeries {
                name: avg.period.to_string(),
                year_count: avg.year_count,
                values,
            }
        })
        .collect();

    let largest = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max);

    Radar {
        unit_label: unit.label(),
        indicators,
        max: largest * 1.1,
        series,
    }
}
