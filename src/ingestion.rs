use crate::error::Result;
use crate::schema::{CellValue, NormalizedRecord, RawRecord};
use crate::utils::parse_date_cell;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// What happened to a batch of rows on the way through the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dateless_rows: usize,
    pub text_cells: usize,
    /// Cleaned header of the date column found in the first row, if any.
    pub date_column: Option<String>,
}

impl NormalizationReport {
    /// No row carried anything that looked like a date header.
    pub fn is_malformed_schema(&self) -> bool {
        self.rows_read > 0 && self.date_column.is_none()
    }
}

/// Reads a CSV document whose first row is the header row.
///
/// Short rows are padded with absent cells so every record carries every
/// header, and blank lines are skipped. Bytes that are not valid UTF-8 are
/// replaced with U+FFFD instead of failing the whole sheet.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut lossy_cells = 0usize;
    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|field| decode_field(field, &mut lossy_cells))
        .collect();
    let mut rows = Vec::new();

    for result in csv_reader.byte_records() {
        let record = result?;
        let cells = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = record
                    .get(idx)
                    .map(|field| decode_field(field, &mut lossy_cells));
                (header.clone(), value)
            })
            .collect();
        rows.push(RawRecord { cells });
    }

    if lossy_cells > 0 {
        warn!(
            "{} cells were not valid UTF-8 and were decoded lossily",
            lossy_cells
        );
    }

    debug!(
        "Read {} raw rows across {} columns",
        rows.len(),
        headers.len()
    );

    Ok(rows)
}

fn decode_field(field: &[u8], lossy_cells: &mut usize) -> String {
    match String::from_utf8_lossy(field) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            *lossy_cells += 1;
            text
        }
    }
}

pub fn read_raw_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)?;
    read_raw_records(file)
}

/// Strips byte-order marks and surrounding whitespace from a header.
pub fn clean_header(raw: &str) -> String {
    raw.replace(BYTE_ORDER_MARK, "").trim().to_string()
}

/// Picks the date column: an exact case-insensitive `date` first, otherwise
/// the first header that merely contains `date`.
pub fn locate_date_column<'a, I>(headers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    headers
        .clone()
        .into_iter()
        .find(|h| h.trim().eq_ignore_ascii_case("date"))
        .or_else(|| {
            headers
                .into_iter()
                .find(|h| h.trim().to_lowercase().contains("date"))
        })
}

/// Coerces a sheet cell. Quotes and thousands separators are removed first;
/// blanks become `0` and anything non-numeric is passed through as text.
pub fn coerce_cell(raw: Option<&str>) -> CellValue {
    let trimmed = raw.unwrap_or("").trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != '"' && *c != ',').collect();
    let candidate = cleaned.trim();

    if candidate.is_empty() {
        return CellValue::Number(0.0);
    }

    match candidate.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => CellValue::Text(cleaned),
    }
}

fn clean_row(row: &RawRecord) -> Vec<(String, Option<&str>)> {
    let mut cleaned: Vec<(String, Option<&str>)> = Vec::with_capacity(row.cells.len());

    for (raw_key, raw_value) in &row.cells {
        let key = clean_header(raw_key);
        if key.is_empty() {
            continue;
        }

        // A repeated header keeps its first position but takes the later value.
        match cleaned.iter().position(|(existing, _)| *existing == key) {
            Some(idx) => cleaned[idx].1 = raw_value.as_deref(),
            None => cleaned.push((key, raw_value.as_deref())),
        }
    }

    cleaned
}

fn normalize_row(row: &RawRecord, report: &mut NormalizationReport) -> Option<NormalizedRecord> {
    let cells = clean_row(row);
    let date_key = locate_date_column(cells.iter().map(|(k, _)| k.as_str()))?.to_string();

    if report.date_column.is_none() {
        report.date_column = Some(date_key.clone());
    }

    let raw_date = cells
        .iter()
        .find(|(k, _)| *k == date_key)
        .and_then(|(_, v)| *v)
        .unwrap_or("");
    let date = parse_date_cell(raw_date)?;

    let fields: Vec<(String, CellValue)> = cells
        .into_iter()
        .filter(|(k, _)| *k != date_key)
        .map(|(k, v)| {
            let value = coerce_cell(v);
            if value.is_text() {
                report.text_cells += 1;
            }
            (k, value)
        })
        .collect();

    Some(NormalizedRecord { date, fields })
}

/// Cleans raw rows into typed records, keeping their original order.
/// Rows without a parseable date are dropped.
pub fn normalize_records(rows: &[RawRecord]) -> Vec<NormalizedRecord> {
    normalize_with_report(rows).0
}

pub fn normalize_with_report(rows: &[RawRecord]) -> (Vec<NormalizedRecord>, NormalizationReport) {
    let mut report = NormalizationReport {
        rows_read: rows.len(),
        ..Default::default()
    };

    let records: Vec<NormalizedRecord> = rows
        .iter()
        .filter_map(|row| normalize_row(row, &mut report))
        .collect();

    report.rows_kept = records.len();
    report.dateless_rows = report.rows_read - report.rows_kept;

    if report.is_malformed_schema() {
        warn!(
            "No date-like column found in {} rows; continuing with an empty dataset",
            report.rows_read
        );
    } else if report.dateless_rows > 0 {
        debug!(
            "Dropped {} rows without a parseable date",
            report.dateless_rows
        );
    }

    debug!(
        "Normalized {} of {} rows ({} text cells passed through)",
        report.rows_kept, report.rows_read, report.text_cells
    );

    (records, report)
}
