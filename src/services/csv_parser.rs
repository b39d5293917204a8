use crate::error::AppError;
use crate::models::{Amount, BudgetKind, BudgetRow, FundRow, Unit};
use tracing::{debug, trace, warn};

#[derive(Debug)]
pub struct ParseResult<T> {
    pub rows: Vec<T>,
    pub errors: Vec<String>,
}

impl<T> ParseResult<T> {
    fn log_summary(&self, file_kind: &str) {
        if !self.errors.is_empty() {
            warn!(
                file_kind,
                error_count = self.errors.len(),
                "CSV parsing completed with errors"
            );
        }
        debug!(
            file_kind,
            row_count = self.rows.len(),
            error_count = self.errors.len(),
            "CSV parsing completed"
        );
    }
}

/// Parse the unified budget table (`budget_all.csv`).
///
/// Rows with an unreadable year, type or amount are reported in `errors`
/// and skipped; everything else is kept as-is.
pub fn parse_budget_csv(content: &[u8], unit: Unit) -> Result<ParseResult<BudgetRow>, AppError> {
    trace!(content_size = content.len(), "Starting budget CSV parsing");

    let mut reader = reader_for(content)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?
        .clone();

    debug!(column_count = headers.len(), "CSV headers parsed");

    // Required columns
    let year_col = require_column(&headers, "year")?;
    let type_col = require_column(&headers, "type")?;
    let amount_col = require_column(&headers, "amount")?;

    // Optional columns
    let category_1_col = find_column(&headers, "category_1");
    let category_2_col = find_column(&headers, "category_2");
    let item_col = find_column(&headers, "item_name");
    let account_col = find_column(&headers, "account_name");

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let year = match parse_year(record.get(year_col).unwrap_or("")) {
            Some(y) => y,
            None => {
                errors.push(format!("Row {}: Invalid year", row_number));
                continue;
            }
        };

        let kind = match record.get(type_col).unwrap_or("").parse::<BudgetKind>() {
            Ok(k) => k,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let raw_amount = record.get(amount_col).unwrap_or("").trim();
        let amount = match parse_amount(raw_amount) {
            Some(a) => a,
            None => {
                errors.push(format!("Row {}: Invalid amount '{}'", row_number, raw_amount));
                continue;
            }
        };

        rows.push(BudgetRow {
            year,
            kind,
            category_1: get_field(&record, category_1_col),
            category_2: get_field(&record, category_2_col),
            item_name: get_field(&record, item_col),
            account_name: get_field(&record, account_col),
            amount: Amount::new(amount, unit),
        });
    }

    let result = ParseResult { rows, errors };
    result.log_summary("budget");
    Ok(result)
}

/// Parse the funds table: `year,fund_name,income,expense,surplus`.
///
/// A blank `surplus` is derived as income minus expense.
pub fn parse_fund_csv(content: &[u8], unit: Unit) -> Result<ParseResult<FundRow>, AppError> {
    trace!(content_size = content.len(), "Starting fund CSV parsing");

    let mut reader = reader_for(content)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?
        .clone();

    let year_col = require_column(&headers, "year")?;
    let name_col = require_column(&headers, "fund_name")?;
    let income_col = require_column(&headers, "income")?;
    let expense_col = require_column(&headers, "expense")?;
    let surplus_col = find_column(&headers, "surplus");

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let Some(year) = parse_year(record.get(year_col).unwrap_or("")) else {
            errors.push(format!("Row {}: Invalid year", row_number));
            continue;
        };

        let fund_name = get_field(&record, Some(name_col));
        if fund_name.is_empty() {
            errors.push(format!("Row {}: Missing fund name", row_number));
            continue;
        }

        let income = parse_amount(record.get(income_col).unwrap_or(""));
        let expense = parse_amount(record.get(expense_col).unwrap_or(""));
        let (Some(income), Some(expense)) = (income, expense) else {
            errors.push(format!("Row {}: Invalid income or expense", row_number));
            continue;
        };

        let surplus = surplus_col
            .and_then(|c| record.get(c))
            .and_then(parse_amount)
            .unwrap_or(income - expense);

        rows.push(FundRow {
            year,
            fund_name,
            income: Amount::new(income, unit),
            expense: Amount::new(expense, unit),
            surplus: Amount::new(surplus, unit),
        });
    }

    let result = ParseResult { rows, errors };
    result.log_summary("fund");
    Ok(result)
}

fn reader_for(content: &[u8]) -> Result<csv::Reader<&[u8]>, AppError> {
    if content.is_empty() {
        return Err(AppError::CsvParse("CSV file is empty".into()));
    }
    // Excel exports prepend a BOM
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    std::str::from_utf8(content).map_err(|e| AppError::CsvParse(e.to_string()))?;

    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content))
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn require_column(headers: &csv::StringRecord, name: &str) -> Result<usize, AppError> {
    find_column(headers, name)
        .ok_or_else(|| AppError::CsvParse(format!("No {} column found in CSV", name)))
}

fn get_field(record: &csv::StringRecord, col: Option<usize>) -> String {
    col.and_then(|c| record.get(c))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn parse_year(raw: &str) -> Option<i32> {
    // Spreadsheet round-trips turn 113 into "113.0"
    let raw = raw.trim();
    let raw = raw.strip_suffix(".0").unwrap_or(raw);
    raw.parse().ok()
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = clean_amount(raw);
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

/// Strip currency symbols and thousands separators. Budget books always
/// use `.` as the decimal point.
fn clean_amount(amount: &str) -> String {
    let mut result = String::new();
    let mut has_decimal = false;

    for c in amount.trim().chars() {
        if c.is_ascii_digit() {
            result.push(c);
        } else if c == '.' && !has_decimal {
            result.push('.');
            has_decimal = true;
        } else if c == '-' && result.is_empty() {
            result.push(c);
        }
        // Skip thousand separators and currency symbols
    }

    result
}
