//! Spreadsheet export tokenizer with encoding auto-detection.
//!
//! Turns the published sheet's CSV export into [`RawRecord`]s. Parsing is
//! best-effort and never fails: malformed quoting is consumed to the end of
//! the input, blank lines are dropped and an export with fewer than two
//! records (header + one row) yields an empty [`ParsedSheet`].

pub mod header;

use std::path::Path;

pub use header::{HeaderIndex, SheetRow};

/// One tokenized line of the export, before any column meaning is applied.
pub type RawRecord = Vec<String>;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Tokenize delimited text into records.
///
/// - `""` inside quotes is a literal quote; any other character inside quotes
///   (delimiter and line breaks included) is content.
/// - A quote outside quotes opens quoted mode, even mid-field.
/// - `,` ends a field, `\n` or `\r\n` ends a record.
/// - Fields are trimmed; records whose fields are all empty are dropped.
///
/// # Example
/// ```ignore
/// use coursepilot::parser::tokenize;
///
/// let records = tokenize("Course,Comment\nCS101,\"fun, hard\"\n");
/// assert_eq!(records[1], vec!["CS101", "fun, hard"]);
/// ```
pub fn tokenize(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut record: RawRecord = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    cell.push(QUOTE);
                    chars.next();
                }
                QUOTE => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            QUOTE => in_quotes = true,
            DELIMITER => record.push(take_cell(&mut cell)),
            '\n' => finish_record(&mut records, &mut record, &mut cell),
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                finish_record(&mut records, &mut record, &mut cell);
            }
            _ => cell.push(c),
        }
    }

    // Last line without a trailing newline
    if !record.is_empty() || !cell.is_empty() {
        finish_record(&mut records, &mut record, &mut cell);
    }

    records
}

fn take_cell(cell: &mut String) -> String {
    let value = trim_cell(cell).to_string();
    cell.clear();
    value
}

fn finish_record(records: &mut Vec<RawRecord>, record: &mut RawRecord, cell: &mut String) {
    record.push(take_cell(cell));
    if record.iter().any(|field| !field.is_empty()) {
        records.push(std::mem::take(record));
    } else {
        record.clear();
    }
}

/// Trim whitespace and a stray byte-order mark.
fn trim_cell(cell: &str) -> &str {
    cell.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

// =============================================================================
// Parsed sheet
// =============================================================================

/// Header plus data records of one export.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub header: HeaderIndex,
    pub records: Vec<RawRecord>,
}

impl ParsedSheet {
    /// Tokenize `text` and split off the header record.
    ///
    /// Fewer than two records means "not enough data": the result has no
    /// headers and no rows.
    pub fn parse(text: &str) -> Self {
        let mut records = tokenize(text);
        if records.len() < 2 {
            return Self::default();
        }

        let header = HeaderIndex::from_record(records.remove(0));
        Self { header, records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Column titles in sheet order.
    pub fn headers(&self) -> &[String] {
        self.header.names()
    }

    /// Data rows bound to the header index.
    pub fn rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.records
            .iter()
            .map(move |record| SheetRow::new(&self.header, record))
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Text decoded from raw export bytes.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    /// Detected encoding label.
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding label, lossy for anything unknown.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode bytes after detecting their encoding.
///
/// Valid UTF-8 is always taken as UTF-8; detection only runs for byte
/// sequences that are not.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
        };
    }

    let encoding = detect_encoding(bytes);
    DecodedText {
        text: decode_content(bytes, &encoding),
        encoding,
    }
}

/// Read and decode a local export file.
pub fn read_export_file<P: AsRef<Path>>(path: P) -> std::io::Result<DecodedText> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(decode_bytes(&bytes))
}
