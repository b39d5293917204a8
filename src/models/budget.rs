use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::amount::{Amount, Unit};

/// Which side of the general budget a dataset describes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetKind {
    Revenue,
    #[default]
    Expenditure,
}

impl BudgetKind {
    pub fn all() -> &'static [BudgetKind] {
        &[Self::Revenue, Self::Expenditure]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expenditure => "expenditure",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Revenue => "收入",
            Self::Expenditure => "支出",
        }
    }
}

impl FromStr for BudgetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" | "歲入" | "收入" => Ok(Self::Revenue),
            "expenditure" | "歲出" | "支出" => Ok(Self::Expenditure),
            other => Err(format!("Unknown budget type: {}", other)),
        }
    }
}

impl fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The export format a yearly tree was built from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceShape {
    #[default]
    Relational,
    Nested,
}

impl SourceShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::Nested => "nested",
        }
    }
}

impl FromStr for SourceShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relational" => Ok(Self::Relational),
            "nested" => Ok(Self::Nested),
            other => Err(format!("Unknown source shape: {}", other)),
        }
    }
}

/// Budget classification levels, coarsest first: 款 (Kuan), 項 (Xiang),
/// 目 (Mu), 節 (Jie).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetLevel {
    Kuan,
    Xiang,
    Mu,
    Jie,
}

impl BudgetLevel {
    /// Parent-before-child processing order.
    pub const ALL: [BudgetLevel; 4] = [Self::Kuan, Self::Xiang, Self::Mu, Self::Jie];

    pub fn rank(&self) -> usize {
        match self {
            Self::Kuan => 0,
            Self::Xiang => 1,
            Self::Mu => 2,
            Self::Jie => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kuan => "Kuan",
            Self::Xiang => "Xiang",
            Self::Mu => "Mu",
            Self::Jie => "Jie",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kuan => "款",
            Self::Xiang => "項",
            Self::Mu => "目",
            Self::Jie => "節",
        }
    }
}

/// One line item of one fiscal year in relational form.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecord {
    pub id: String,
    pub name: String,
    pub amount: Amount,
    pub parent_id: Option<String>,
    pub level: BudgetLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetNode {
    pub name: String,
    pub value: Amount,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BudgetNode>,
}

impl BudgetNode {
    pub fn leaf(name: impl Into<String>, value: Amount) -> Self {
        Self {
            name: name.into(),
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children(
        name: impl Into<String>,
        value: Amount,
        children: Vec<BudgetNode>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            children,
        }
    }

    /// First child with exactly this name.
    pub fn child(&self, name: &str) -> Option<&BudgetNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A forest of top-level budget categories for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetTree {
    pub roots: Vec<BudgetNode>,
}

impl BudgetTree {
    pub fn from_roots(roots: Vec<BudgetNode>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root(&self, name: &str) -> Option<&BudgetNode> {
        self.roots.iter().find(|n| n.name == name)
    }

    /// Total number of nodes at every depth.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&BudgetNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Depth-first, pre-order iteration over every node.
    pub fn iter(&self) -> impl Iterator<Item = &BudgetNode> {
        let mut stack: Vec<&BudgetNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyBudget {
    pub year: i32,
    pub total_amount: Amount,
    pub tree: BudgetTree,
}

impl YearlyBudget {
    pub fn new(year: i32, total_amount: Amount, tree: BudgetTree) -> Self {
        Self {
            year,
            total_amount,
            tree,
        }
    }

    pub fn unit(&self) -> Unit {
        self.total_amount.unit
    }
}

/// Category names from the virtual root down to the selected node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrillPath(Vec<String>);

impl DrillPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The selected node's name, `None` at the virtual root.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Path truncated to `depth` segments; 0 is the virtual root.
    pub fn ancestor(&self, depth: usize) -> Self {
        Self(self.0.iter().take(depth).cloned().collect())
    }
}

impl From<Vec<String>> for DrillPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}
