use crate::models::{Amount, DrillPath, TrendPoint, YearlyBudget};

use super::navigator;

/// Value of the node at `path` in every year, ascending by year.
///
/// Categories are matched by name, not by id, because ids are renumbered
/// every year. Years where the path does not resolve are zero-filled with
/// `found: false` so that charts keep a contiguous time axis.
pub fn trend(yearly: &[YearlyBudget], path: &DrillPath) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = yearly
        .iter()
        .map(|budget| {
            if path.is_root() {
                return TrendPoint {
                    year: budget.year,
                    value: budget.total_amount,
                    found: true,
                };
            }
            match navigator::resolve_year(budget, path) {
                Some(view) => TrendPoint {
                    year: budget.year,
                    value: view.value,
                    found: true,
                },
                None => TrendPoint {
                    year: budget.year,
                    value: Amount::zero(budget.unit()),
                    found: false,
                },
            }
        })
        .collect();

    points.sort_by_key(|p| p.year);

    let missing = points.iter().filter(|p| !p.found).count();
    if missing > 0 {
        tracing::debug!(
            path = ?path.segments(),
            missing,
            years = points.len(),
            "Drill path absent in some years, zero-filled"
        );
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetNode, BudgetTree, Unit};

    fn amt(v: f64) -> Amount {
        Amount::new(v, Unit::ThousandNtd)
    }

    fn year(year: i32, total: f64, roots: Vec<BudgetNode>) -> YearlyBudget {
        YearlyBudget::new(year, amt(total), BudgetTree::from_roots(roots))
    }

    fn sample() -> Vec<YearlyBudget> {
        vec![
            year(
                3,
                300.0,
                vec![BudgetNode::with_children(
                    "社會福利支出",
                    amt(30.0),
                    vec![BudgetNode::leaf("社會保險支出", amt(12.0))],
                )],
            ),
            year(1, 100.0, vec![BudgetNode::leaf("社會福利支出", amt(10.0))]),
            year(2, 200.0, vec![BudgetNode::leaf("經濟發展支出", amt(20.0))]),
        ]
    }

    #[test]
    fn test_zero_fills_missing_years() {
        let points = trend(&sample(), &DrillPath::new(["社會福利支出"]));
        assert_eq!(points.len(), 3);
        let expected = vec![
            TrendPoint {
                year: 1,
                value: amt(10.0),
                found: true,
            },
            TrendPoint {
                year: 2,
                value: amt(0.0),
                found: false,
            },
            TrendPoint {
                year: 3,
                value: amt(30.0),
                found: true,
            },
        ];
        assert_eq!(points, expected);
    }

    #[test]
    fn test_root_path_uses_year_totals() {
        let values: Vec<f64> = trend(&sample(), &DrillPath::root())
            .iter()
            .map(|p| p.value.value)
            .collect();
        assert_eq!(values, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_deep_path_present_in_one_year() {
        let path = DrillPath::new(["社會福利支出", "社會保險支出"]);
        let points = trend(&sample(), &path);
        let found: Vec<bool> = points.iter().map(|p| p.found).collect();
        assert_eq!(found, vec![false, false, true]);
        assert_eq!(points[2].value, amt(12.0));
    }

    #[test]
    fn test_genuine_zero_is_distinguished_from_missing() {
        let years = vec![year(1, 0.0, vec![BudgetNode::leaf("預備金", amt(0.0))])];
        let points = trend(&years, &DrillPath::new(["預備金"]));
        assert_eq!(points[0].value, amt(0.0));
        assert!(points[0].found);
    }

    #[test]
    fn test_trend_is_idempotent() {
        let years = sample();
        let path = DrillPath::new(["社會福利支出"]);
        assert_eq!(trend(&years, &path), trend(&years, &path));
    }

    #[test]
    fn test_empty_input() {
        assert!(trend(&[], &DrillPath::root()).is_empty());
    }
}
