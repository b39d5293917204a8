//! End-to-end checks of the budget engine through its public API.

use fiscal_insight::filters::DisplayUnit;
use fiscal_insight::models::{
    Amount, BudgetKind, BudgetLevel, BudgetRecord, BudgetRow, CategoryKey, DrillPath, Unit,
    YearlyBudget,
};
use fiscal_insight::services::aggregator::{self, OTHERS_LABEL};
use fiscal_insight::services::{charts, hierarchy, navigator, trend};

fn thousand(value: f64) -> Amount {
    Amount::new(value, Unit::ThousandNtd)
}

fn row(category: &str, value: f64) -> BudgetRow {
    BudgetRow {
        year: 113,
        kind: BudgetKind::Expenditure,
        category_1: category.to_string(),
        category_2: String::new(),
        item_name: String::new(),
        account_name: String::new(),
        amount: thousand(value),
    }
}

fn record(
    id: &str,
    name: &str,
    value: f64,
    parent: Option<&str>,
    level: BudgetLevel,
) -> BudgetRecord {
    BudgetRecord {
        id: id.to_string(),
        name: name.to_string(),
        amount: thousand(value),
        parent_id: parent.map(str::to_string),
        level,
    }
}

fn year(year: i32, total: f64, records: &[BudgetRecord]) -> YearlyBudget {
    YearlyBudget::new(year, thousand(total), hierarchy::build(records))
}

#[test]
fn test_aggregation_preserves_sum_and_collapses_tail() {
    let values = [50.0, 40.0, 30.0, 20.0, 10.0, 8.0, 5.0, 2.0];
    let rows: Vec<BudgetRow> = values
        .iter()
        .enumerate()
        .map(|(i, v)| row(&format!("C{}", i), *v))
        .collect();

    let buckets = aggregator::aggregate(&rows, CategoryKey::Category1, 5);
    assert_eq!(buckets.len(), 6);
    assert_eq!(buckets[5].label, OTHERS_LABEL);
    assert_eq!(buckets[5].value, thousand(15.0));

    let total: f64 = buckets.iter().map(|b| b.value.value).sum();
    assert_eq!(total, values.iter().sum::<f64>());
}

#[test]
fn test_small_breakdown_is_untouched() {
    let rows = vec![row("A", 4.0), row("B", 3.0), row("C", 2.0), row("D", 1.0)];
    let buckets = aggregator::aggregate(&rows, CategoryKey::Category1, 5);
    assert_eq!(buckets.len(), 4);
    assert!(buckets.iter().all(|b| b.label != OTHERS_LABEL));
}

#[test]
fn test_hierarchy_keeps_every_record() {
    let records = vec![
        record("1", "稅課收入", 900.0, None, BudgetLevel::Kuan),
        record("1.1", "所得稅", 450.0, Some("1"), BudgetLevel::Xiang),
        record("1.1.1", "綜合所得稅", 300.0, Some("1.1"), BudgetLevel::Mu),
        record("1.1.1.1", "薪資所得", 200.0, Some("1.1.1"), BudgetLevel::Jie),
        record("2", "規費收入", 50.0, Some("missing"), BudgetLevel::Kuan),
    ];
    let tree = hierarchy::build(&records);
    assert_eq!(tree.node_count(), records.len());
    assert_eq!(tree.roots.len(), 2);

    let jie = tree
        .root("稅課收入")
        .and_then(|n| n.child("所得稅"))
        .and_then(|n| n.child("綜合所得稅"))
        .and_then(|n| n.child("薪資所得"));
    assert_eq!(jie.map(|n| n.value), Some(thousand(200.0)));
}

#[test]
fn test_drill_trend_and_charts_agree() {
    let education = |amount: f64| record("1", "教育", amount, None, BudgetLevel::Kuan);
    let defense = record("2", "國防", 30.0, None, BudgetLevel::Kuan);
    let yearly = vec![
        year(111, 100.0, &[education(60.0), defense.clone()]),
        year(112, 80.0, &[defense.clone()]),
        year(
            113,
            120.0,
            &[
                education(70.0),
                defense,
                record("3", "債務", -5.0, None, BudgetLevel::Kuan),
            ],
        ),
    ];

    let root = navigator::resolve_year(&yearly[2], &DrillPath::root()).unwrap();
    assert_eq!(root.value, thousand(120.0));
    assert_eq!(root.children.len(), 3);

    let path = DrillPath::new(["教育"]);
    assert!(navigator::resolve_year(&yearly[1], &path).is_none());

    let points = trend::trend(&yearly, &path);
    let values: Vec<f64> = points.iter().map(|p| p.value.value).collect();
    assert_eq!(values, vec![60.0, 0.0, 70.0]);
    assert_eq!(points, trend::trend(&yearly, &path));

    let unit = DisplayUnit::default();
    let donut = charts::donut_from_nodes(&root.sorted_children(), &unit);
    assert_eq!(donut.len(), 2);
    assert_eq!(donut[0].name, "教育");
}
