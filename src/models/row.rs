use serde::Serialize;
use std::str::FromStr;

use super::amount::Amount;
use super::budget::BudgetKind;

/// One line of the unified budget table (`budget_all.csv`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRow {
    pub year: i32,
    pub kind: BudgetKind,
    pub category_1: String,
    pub category_2: String,
    pub item_name: String,
    pub account_name: String,
    pub amount: Amount,
}

/// Column of [`BudgetRow`] that the category aggregator may group by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKey {
    #[default]
    Category1,
    Category2,
    ItemName,
    AccountName,
}

impl CategoryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category1 => "category_1",
            Self::Category2 => "category_2",
            Self::ItemName => "item_name",
            Self::AccountName => "account_name",
        }
    }

    pub fn of<'a>(&self, row: &'a BudgetRow) -> &'a str {
        match self {
            Self::Category1 => &row.category_1,
            Self::Category2 => &row.category_2,
            Self::ItemName => &row.item_name,
            Self::AccountName => &row.account_name,
        }
    }
}

impl FromStr for CategoryKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category_1" => Ok(Self::Category1),
            "category_2" => Ok(Self::Category2),
            "item_name" => Ok(Self::ItemName),
            "account_name" => Ok(Self::AccountName),
            other => Err(format!("Unknown category key: {}", other)),
        }
    }
}

/// Yearly income and expense of one government fund (`funds_all.csv`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundRow {
    pub year: i32,
    pub fund_name: String,
    pub income: Amount,
    pub expense: Amount,
    pub surplus: Amount,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FundMetric {
    #[default]
    Income,
    Expense,
}

impl FundMetric {
    pub fn of(&self, row: &FundRow) -> Amount {
        match self {
            Self::Income => row.income,
            Self::Expense => row.expense,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for FundMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("Unknown fund metric: {}", other)),
        }
    }
}
