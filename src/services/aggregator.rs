use std::collections::HashMap;

use crate::models::{Amount, BudgetKind, BudgetRow, CategoryBucket, CategoryKey};

/// Label of the synthetic bucket that absorbs everything past the top N.
pub const OTHERS_LABEL: &str = "其他";

/// Label for rows whose grouping column is empty.
pub const UNCATEGORIZED_LABEL: &str = "未分類";

/// Bucket label for a raw grouping value; blanks become [`UNCATEGORIZED_LABEL`].
pub fn label_of(raw: &str) -> &str {
    match raw.trim() {
        "" => UNCATEGORIZED_LABEL,
        label => label,
    }
}

/// Rows of one fiscal year and one budget side.
pub fn slice(rows: &[BudgetRow], year: i32, kind: BudgetKind) -> Vec<&BudgetRow> {
    rows.iter()
        .filter(|r| r.year == year && r.kind == kind)
        .collect()
}

/// Group `rows` by `key`, sum their amounts and sort descending.
///
/// Groups keep first-seen order among equal sums. Every row contributes,
/// including zero and negative amounts.
pub fn group_by<'a, T, I, K, A>(rows: I, key: K, amount: A) -> Vec<CategoryBucket>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> &str,
    A: Fn(&T) -> Amount,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<CategoryBucket> = Vec::new();

    for row in rows {
        let label = label_of(key(row));
        match index.get(label) {
            Some(&i) => buckets[i].value += amount(row),
            None => {
                index.insert(label.to_string(), buckets.len());
                buckets.push(CategoryBucket::new(label, amount(row)));
            }
        }
    }

    buckets.sort_by(|a, b| Amount::cmp_desc(&a.value, &b.value));
    buckets
}

/// Keep the first `top_n` buckets and fold the rest into [`OTHERS_LABEL`].
///
/// Lists with at most `top_n + 1` entries are returned untouched, since an
/// "Others" slice holding a single bucket would hide it for nothing.
pub fn collapse_tail(mut buckets: Vec<CategoryBucket>, top_n: usize) -> Vec<CategoryBucket> {
    if buckets.len().saturating_sub(1) <= top_n {
        return buckets;
    }
    let tail = buckets.split_off(top_n);
    let unit = tail[0].value.unit;
    let others = Amount::total(tail.into_iter().map(|b| b.value), unit);
    buckets.push(CategoryBucket::new(OTHERS_LABEL, others));
    buckets
}

/// Category breakdown of budget rows, already sliced to one year and type.
pub fn aggregate<'a, I>(rows: I, key: CategoryKey, top_n: usize) -> Vec<CategoryBucket>
where
    I: IntoIterator<Item = &'a BudgetRow>,
{
    let buckets = group_by(rows, |r: &BudgetRow| key.of(r), |r: &BudgetRow| r.amount);
    tracing::trace!(
        key = key.as_str(),
        bucket_count = buckets.len(),
        top_n,
        "Aggregated budget rows"
    );
    collapse_tail(buckets, top_n)
}

/// Sum of rows per year for one budget side, ascending by year.
pub fn yearly_totals(rows: &[BudgetRow], kind: BudgetKind) -> Vec<(i32, Amount)> {
    let mut totals: HashMap<i32, Amount> = HashMap::new();
    for row in rows.iter().filter(|r| r.kind == kind) {
        totals
            .entry(row.year)
            .and_modify(|t| *t += row.amount)
            .or_insert(row.amount);
    }
    let mut result: Vec<(i32, Amount)> = totals.into_iter().collect();
    result.sort_by_key(|(year, _)| *year);
    result
}
