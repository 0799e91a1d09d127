use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::error::{BookkeeperError, Result};
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return Decimal::from_str(inner.trim()).ok().map(|d| -d);
    }
    Decimal::from_str(s).ok()
}

/// Largest amount magnitude accepted from a file (10^15). Totals over any
/// realistic number of rows stay inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Month, day, year separated by `sep`. Single-digit month and day are accepted.
pub fn parse_date_mdy(raw: &str, sep: char) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3
        || !is_digits(parts[0], 1, 2)
        || !is_digits(parts[1], 1, 2)
        || !is_digits(parts[2], 4, 4)
    {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn parse_error(line: u64, field: &'static str, reason: impl Into<String>) -> BookkeeperError {
    BookkeeperError::Parse {
        line,
        field,
        reason: reason.into(),
    }
}

fn required_text(line: u64, field: &'static str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(parse_error(line, field, "missing value"));
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// Export layouts, detected from the header row
// ---------------------------------------------------------------------------

const MINT_COLUMNS: [&str; 9] = [
    "Date",
    "Description",
    "Original Description",
    "Amount",
    "Transaction Type",
    "Category",
    "Account Name",
    "Labels",
    "Notes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportLayout {
    /// `Date,Amount,Category,Account,Description` with MM-DD-YYYY dates and signed amounts.
    Simple,
    /// Mint `transactions.csv`: M/D/YYYY dates, unsigned amounts, sign from `Transaction Type`.
    Mint,
}

impl ExportLayout {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Mint => "mint",
        }
    }

    pub fn field_count(&self) -> usize {
        match self {
            Self::Simple => 5,
            Self::Mint => 9,
        }
    }

    /// Mint headers are read by position, so their columns must be in the exported order.
    pub fn detect(header: &StringRecord) -> Result<Self> {
        let has = |name: &str| header.iter().any(|f| f.trim().eq_ignore_ascii_case(name));
        if !(has("Transaction Type") && has("Account Name")) {
            return Ok(Self::Simple);
        }
        let in_order = header.len() == MINT_COLUMNS.len()
            && header
                .iter()
                .zip(MINT_COLUMNS)
                .all(|(found, expected)| found.trim().eq_ignore_ascii_case(expected));
        if !in_order {
            return Err(parse_error(
                header.position().map_or(1, |p| p.line()),
                "record",
                format!("Mint header must be {}", MINT_COLUMNS.join(",")),
            ));
        }
        Ok(Self::Mint)
    }

    fn date_separator(&self) -> char {
        match self {
            Self::Simple => '-',
            Self::Mint => '/',
        }
    }
}

/// Convert one data row into a [`Transaction`]. `line` is the 1-based line in the source file.
pub fn parse_record(line: u64, record: &StringRecord, layout: ExportLayout) -> Result<Transaction> {
    if record.len() != layout.field_count() {
        return Err(parse_error(
            line,
            "record",
            format!(
                "expected {} fields for {} layout, found {}",
                layout.field_count(),
                layout.name(),
                record.len()
            ),
        ));
    }

    let (date_idx, amount_idx, category_idx, account_idx, desc_idx) = match layout {
        ExportLayout::Simple => (0, 1, 2, 3, 4),
        ExportLayout::Mint => (0, 3, 5, 6, 1),
    };

    let date = parse_date_mdy(&record[date_idx], layout.date_separator()).ok_or_else(|| {
        parse_error(
            line,
            "date",
            format!("'{}' is not a valid date", record[date_idx].trim()),
        )
    })?;

    let mut amount = parse_amount(&record[amount_idx]).ok_or_else(|| {
        parse_error(
            line,
            "amount",
            format!("'{}' is not numeric", record[amount_idx].trim()),
        )
    })?;
    if amount.abs() > MAX_AMOUNT {
        return Err(parse_error(
            line,
            "amount",
            format!("'{}' exceeds the supported range", record[amount_idx].trim()),
        ));
    }

    if layout == ExportLayout::Mint {
        amount = match record[4].trim().to_ascii_lowercase().as_str() {
            "debit" => -amount.abs(),
            "credit" => amount.abs(),
            other => {
                return Err(parse_error(
                    line,
                    "amount",
                    format!("unknown transaction type '{other}'"),
                ))
            }
        };
    }

    Ok(Transaction {
        date,
        amount,
        category: required_text(line, "category", &record[category_idx])?,
        account: required_text(line, "account", &record[account_idx])?,
        description: record[desc_idx].trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// load_transactions
// ---------------------------------------------------------------------------

/// What to do with a data row that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Stop at the first bad row.
    #[default]
    Abort,
    /// Log a warning and continue.
    Skip,
}

#[derive(Debug)]
pub struct LoadResult {
    pub transactions: Vec<Transaction>,
    pub layout: ExportLayout,
    pub skipped: usize,
}

pub fn load_transactions(file_path: &Path, policy: RowPolicy) -> Result<LoadResult> {
    let file = std::fs::File::open(file_path).map_err(|source| BookkeeperError::Read {
        path: file_path.to_path_buf(),
        source,
    })?;
    read_transactions(std::io::BufReader::new(file), policy)
}

/// Undecodable rows become parse errors so the row policy applies to them too.
fn row_error(e: csv::Error) -> BookkeeperError {
    if let csv::ErrorKind::Utf8 { pos, err } = e.kind() {
        return parse_error(
            pos.as_ref().map_or(0, |p| p.line()),
            "record",
            format!("invalid UTF-8 in field {}", err.field() + 1),
        );
    }
    e.into()
}

pub fn read_transactions<R: std::io::Read>(reader: R, policy: RowPolicy) -> Result<LoadResult> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.records();

    // Exactly one leading header row.
    let layout = match records.next() {
        Some(header) => ExportLayout::detect(&header.map_err(row_error)?)?,
        None => ExportLayout::Simple,
    };
    tracing::debug!(layout = layout.name(), "detected export layout");

    let mut transactions = Vec::new();
    let mut skipped = 0usize;
    for result in records {
        let parsed = match result {
            // A lone empty field is a line holding nothing but `""`.
            Ok(record) if record.len() == 1 && record[0].is_empty() => continue,
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                parse_record(line, &record, layout)
            }
            Err(e) => Err(row_error(e)),
        };
        match parsed {
            Ok(txn) => transactions.push(txn),
            Err(e @ BookkeeperError::Parse { .. }) if policy == RowPolicy::Skip => {
                tracing::warn!("skipping row: {e}");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(LoadResult {
        transactions,
        layout,
        skipped,
    })
}
