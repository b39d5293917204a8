pub mod amount;
pub mod bucket;
pub mod budget;
pub mod period;
pub mod row;

pub use amount::{Amount, Unit};
pub use bucket::{CategoryBucket, TrendPoint};
pub use budget::{
    BudgetKind, BudgetLevel, BudgetNode, BudgetRecord, BudgetTree, DrillPath, SourceShape,
    YearlyBudget,
};
pub use period::Period;
pub use row::{BudgetRow, CategoryKey, FundMetric, FundRow};
