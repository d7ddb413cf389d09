//! CSV ingest and cleaning.
//!
//! This module turns delimited tabular input into clean records:
//! - **Cell cleaning**: trim whitespace, drop empty / `null` / `undefined`
//!   cells, coerce parseable numbers
//! - **Row-level validation**: skip bad rows, but report what happened
//! - **Separation of concerns**: no feature engineering here (see `data::pipeline`)

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{CellValue, RawRecord, Transaction, TransactionType};
use crate::error::AppError;

/// Where tabular records come from.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// A CSV file on disk.
    Path(PathBuf),
    /// CSV text already in memory.
    Text(String),
    /// Uncleaned string records (e.g. from another loader).
    Records(Vec<BTreeMap<String, String>>),
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: cleaned records + row accounting.
#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<RawRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows discarded because every cell was empty after cleaning.
    pub rows_empty: usize,
}

/// Load and clean records from `source`.
pub fn load(source: &DatasetSource) -> Result<IngestedRecords, AppError> {
    match source {
        DatasetSource::Path(path) => {
            let file = File::open(path).map_err(|e| {
                AppError::dataset_load(format!("Failed to open CSV '{}': {e}", path.display()))
            })?;
            load_from_reader(file)
        }
        DatasetSource::Text(text) => load_from_reader(text.as_bytes()),
        DatasetSource::Records(rows) => {
            let mut records = Vec::with_capacity(rows.len());
            let mut rows_empty = 0usize;
            for row in rows {
                let record = clean_record(row.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                if record.is_empty() {
                    rows_empty += 1;
                } else {
                    records.push(record);
                }
            }
            Ok(IngestedRecords {
                records,
                row_errors: Vec::new(),
                rows_read: rows.len(),
                rows_empty,
            })
        }
    }
}

/// Load and clean records from any CSV reader.
pub fn load_from_reader<R: Read>(reader: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::dataset_load(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_empty = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let record = clean_record(names.iter().map(String::as_str).zip(row.iter()));
        if record.is_empty() {
            rows_empty += 1;
        } else {
            records.push(record);
        }
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), "skipped malformed CSV rows");
    }
    info!(rows_read, rows_used = records.len(), rows_empty, "loaded dataset records");

    Ok(IngestedRecords {
        records,
        row_errors,
        rows_read,
        rows_empty,
    })
}

/// Clean one row of `(column, raw value)` pairs.
pub fn clean_record<'a>(cells: impl Iterator<Item = (&'a str, &'a str)>) -> RawRecord {
    let mut record = RawRecord::new();
    for (name, raw) in cells {
        if let Some(value) = clean_cell(raw) {
            record.insert(name.to_string(), value);
        }
    }
    record
}

/// Trim, drop null-ish values, and coerce numbers.
pub fn clean_cell(raw: &str) -> Option<CellValue> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("undefined") {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(CellValue::Number(v)),
        _ => Some(CellValue::Text(s.to_string())),
    }
}

/// Transactions loaded from CSV plus skipped-row details.
#[derive(Debug, Clone)]
pub struct IngestedTransactions {
    pub transactions: Vec<Transaction>,
    pub row_errors: Vec<RowError>,
}

const TRANSACTION_COLUMNS: [&str; 5] = [
    "amount",
    "transaction_type",
    "category",
    "description",
    "transaction_date",
];

/// Load transactions from a CSV with the standard transaction columns.
pub fn load_transactions(path: &Path) -> Result<IngestedTransactions, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::dataset_load(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let mut reader = csv_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::dataset_load(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in TRANSACTION_COLUMNS {
        if column != "description" && !header_map.contains_key(column) {
            return Err(AppError::dataset_load(format!("Missing required column: `{column}`")));
        }
    }

    let mut transactions = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_transaction(&record, &header_map));
        match parsed {
            Ok(tx) => transactions.push(tx),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), path = %path.display(), "skipped invalid transaction rows");
    }

    Ok(IngestedTransactions {
        transactions,
        row_errors,
    })
}

fn parse_transaction(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<Transaction, String> {
    let amount = get_required(record, header_map, "amount")?;
    let amount = amount
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid amount '{amount}'."))?;

    let kind = get_required(record, header_map, "transaction_type")?;
    let transaction_type = TransactionType::from_label(kind)
        .ok_or_else(|| format!("Invalid transaction_type '{kind}' (expected income or expense)."))?;

    let category = get_optional(record, header_map, "category")
        .unwrap_or("other")
        .to_string();
    let description = get_optional(record, header_map, "description")
        .unwrap_or_default()
        .to_string();
    let transaction_date = parse_date(get_required(record, header_map, "transaction_date")?)?;

    Ok(Transaction {
        amount,
        transaction_type,
        category,
        description,
        transaction_date,
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a transaction date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
