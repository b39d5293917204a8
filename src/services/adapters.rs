//! Normalizes each export format into the canonical budget types.
//!
//! Nothing downstream of these functions knows which shape a year came from.

use serde::Deserialize;

use crate::models::{
    Amount, BudgetKind, BudgetLevel, BudgetNode, BudgetRecord, BudgetTree, Unit, YearlyBudget,
};

use super::hierarchy;

#[derive(Debug, Clone, Deserialize)]
pub struct RelationalItem {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// One year of `revenue_by_source.json` / `expenditure_by_function.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationalYear {
    pub year: i32,
    pub amount: f64,
    #[serde(rename = "Kuan", default)]
    pub kuan: Vec<RelationalItem>,
    #[serde(rename = "Xiang", default)]
    pub xiang: Vec<RelationalItem>,
    #[serde(rename = "Mu", default)]
    pub mu: Vec<RelationalItem>,
    #[serde(rename = "Jie", default)]
    pub jie: Vec<RelationalItem>,
}

impl RelationalYear {
    pub fn items(&self, level: BudgetLevel) -> &[RelationalItem] {
        match level {
            BudgetLevel::Kuan => &self.kuan,
            BudgetLevel::Xiang => &self.xiang,
            BudgetLevel::Mu => &self.mu,
            BudgetLevel::Jie => &self.jie,
        }
    }

    pub fn records(&self, unit: Unit) -> Vec<BudgetRecord> {
        BudgetLevel::ALL
            .iter()
            .flat_map(|&level| {
                self.items(level).iter().map(move |item| BudgetRecord {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    amount: Amount::new(item.amount, unit),
                    // Exports write top-level parents as "" as often as null.
                    parent_id: item.parent_id.clone().filter(|p| !p.is_empty()),
                    level,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedNode {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub children: Vec<NestedNode>,
}

impl NestedNode {
    fn into_node(self, unit: Unit) -> BudgetNode {
        BudgetNode::with_children(
            self.name,
            Amount::new(self.value, unit),
            self.children
                .into_iter()
                .map(|c| c.into_node(unit))
                .collect(),
        )
    }
}

/// One year of `budget_detail.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct NestedYear {
    pub year: i32,
    #[serde(default)]
    pub revenue: Vec<NestedNode>,
    #[serde(default)]
    pub expenditure: Vec<NestedNode>,
}

impl NestedYear {
    pub fn side(&self, kind: BudgetKind) -> &[NestedNode] {
        match kind {
            BudgetKind::Revenue => &self.revenue,
            BudgetKind::Expenditure => &self.expenditure,
        }
    }
}

pub fn from_relational(years: &[RelationalYear], unit: Unit) -> Vec<YearlyBudget> {
    years
        .iter()
        .map(|y| {
            let tree = hierarchy::build(&y.records(unit));
            YearlyBudget::new(y.year, Amount::new(y.amount, unit), tree)
        })
        .collect()
}

/// Trees that are already nested pass through unchanged apart from unit
/// tagging. The nested export carries no grand total, so the year total is
/// the sum of its top-level nodes.
pub fn from_nested(years: &[NestedYear], kind: BudgetKind, unit: Unit) -> Vec<YearlyBudget> {
    years
        .iter()
        .map(|y| {
            let roots: Vec<BudgetNode> = y
                .side(kind)
                .iter()
                .cloned()
                .map(|n| n.into_node(unit))
                .collect();
            let total = roots
                .iter()
                .fold(Amount::zero(unit), |acc, n| acc + n.value);
            YearlyBudget::new(y.year, total, BudgetTree::from_roots(roots))
        })
        .collect()
}
