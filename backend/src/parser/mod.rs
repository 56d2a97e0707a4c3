//! Record loader: CSV, JSON array and NDJSON sources to raw JSON objects.
//!
//! CSV is decoded with encoding and delimiter auto-detection. Every row
//! becomes an object keyed by header; values stay strings. No provider logic
//! here.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{RecordsError, RecordsResult};

/// Parsed CSV with the settings that were used.
#[derive(Debug, Clone)]
pub struct CsvRecords {
    pub records: Vec<Value>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
    /// Headers after BOM stripping and deduplication
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        // WHATWG maps the latin1 labels onto windows-1252, a superset of ISO-8859-1.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;
    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }
    best_sep
}

/// Strip a leading BOM and suffix repeated names: `sku, sku` → `sku, sku__2`.
pub fn dedupe_headers<I, S>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|header| {
            let header = header.as_ref().trim_start_matches('\u{feff}').to_string();
            let count = counts.entry(header.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                header
            } else {
                format!("{}__{}", header, count)
            }
        })
        .collect()
}

/// Parse CSV text with an explicit delimiter.
///
/// Short rows are padded with empty strings, cells past the last header are
/// dropped and blank rows are skipped.
pub fn parse_csv_str(content: &str, delimiter: char) -> RecordsResult<(Vec<String>, Vec<Value>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = reader.records();
    let headers = match rows.next() {
        Some(first) => dedupe_headers(first.map_err(csv_error)?.iter()),
        None => return Ok((Vec::new(), Vec::new())),
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(csv_error)?;
        if row.iter().all(str::is_empty) && row.len() <= 1 {
            continue;
        }
        let obj: Map<String, Value> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = row.get(i).unwrap_or("");
                (header.clone(), Value::String(cell.to_string()))
            })
            .collect();
        records.push(Value::Object(obj));
    }

    Ok((headers, records))
}

fn csv_error(err: csv::Error) -> RecordsError {
    let line = err.position().map_or(0, |p| p.line());
    RecordsError::Csv {
        line,
        message: err.to_string(),
    }
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_csv_bytes(bytes: &[u8]) -> RecordsResult<CsvRecords> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let (headers, records) = parse_csv_str(&content, delimiter)?;

    Ok(CsvRecords {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse a JSON array, or newline-delimited objects when the content does not
/// start with `[`. Blank NDJSON lines are skipped.
pub fn parse_json_str(content: &str) -> RecordsResult<Vec<Value>> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let records = if content.starts_with('[') {
        let data: Value = serde_json::from_str(content).map_err(|e| RecordsError::Json {
            line: e.line(),
            source: e,
        })?;
        match data {
            Value::Array(items) => items,
            _ => return Err(RecordsError::NotAnArray),
        }
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line.trim()).map_err(|e| RecordsError::Json {
                    line: idx + 1,
                    source: e,
                })
            })
            .collect::<RecordsResult<Vec<Value>>>()?
    };

    if let Some(idx) = records.iter().position(|r| !r.is_object()) {
        return Err(RecordsError::NotAnObject(idx));
    }
    Ok(records)
}

/// Load records from a file: `.csv` as CSV, anything else as JSON / NDJSON.
pub fn load_records<P: AsRef<Path>>(path: P) -> RecordsResult<Vec<Value>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(parse_csv_bytes(&bytes)?.records)
    } else {
        parse_json_str(&String::from_utf8_lossy(&bytes))
    }
}
