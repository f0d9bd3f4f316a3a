//! CSV import of expense records
//!
//! Columns are located by header name, so exports from most banks and
//! spreadsheets work as long as they carry a date, a description and an
//! amount. A category column is optional.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::NewExpenseRecord;

const DATE_HEADERS: &[&str] = &["date", "transaction date", "posted date", "post date"];
const DESCRIPTION_HEADERS: &[&str] = &["description", "merchant", "payee", "name", "memo"];
const AMOUNT_HEADERS: &[&str] = &["amount", "debit", "value"];
const CATEGORY_HEADERS: &[&str] = &["category"];

/// Generate a unique hash for deduplication
pub fn record_hash(date: NaiveDate, description: &str, amount: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Where each field lives in a CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
    pub category: Option<usize>,
}

impl ColumnMap {
    /// Locate the columns from a header row
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        Ok(Self {
            date: find(DATE_HEADERS)
                .ok_or_else(|| Error::Import("No date column in CSV header".into()))?,
            description: find(DESCRIPTION_HEADERS)
                .ok_or_else(|| Error::Import("No description column in CSV header".into()))?,
            amount: find(AMOUNT_HEADERS)
                .ok_or_else(|| Error::Import("No amount column in CSV header".into()))?,
            category: find(CATEGORY_HEADERS),
        })
    }
}

/// Parse expense records from CSV with a header row
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    let mut records = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let row = result?;
        // Line 1 is the header
        let line = i + 2;

        if row.iter().all(|field| field.is_empty()) {
            continue;
        }

        let date = parse_date(field(&row, columns.date, "date", line)?)
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;
        let description = field(&row, columns.description, "description", line)?;
        if description.is_empty() {
            return Err(Error::Import(format!("line {}: empty description", line)));
        }
        let amount = parse_amount(field(&row, columns.amount, "amount", line)?)
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;
        let category = columns
            .category
            .and_then(|c| row.get(c))
            .map(str::to_string)
            .filter(|c| !c.is_empty());

        records.push(NewExpenseRecord::new(date, description, amount, category));
    }

    debug!("Parsed {} expense records", records.len());
    Ok(records)
}

fn field<'a>(row: &'a StringRecord, index: usize, name: &str, line: usize) -> Result<&'a str> {
    row.get(index)
        .ok_or_else(|| Error::Import(format!("line {}: missing {}", line, name)))
}

/// Parse a date string in various common formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(Error::Import(format!("Unable to parse amount: {}", s))),
    }
}
