//! Header index and header-bound row view.

use super::RawRecord;

/// Column titles of one export, built once from the header record.
///
/// Titles are kept positionally (for `column(i)` lookups) and as a
/// de-duplicated name list in first-seen order. A repeated title resolves
/// to its right-most column.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    names: Vec<String>,
    positions: Vec<(String, usize)>,
}

impl HeaderIndex {
    pub fn from_record(record: RawRecord) -> Self {
        let mut positions: Vec<(String, usize)> = Vec::with_capacity(record.len());
        for (i, name) in record.iter().enumerate() {
            match positions.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = i,
                None => positions.push((name.clone(), i)),
            }
        }

        Self {
            names: record,
            positions,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of the column titled exactly `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, i)| *i)
    }

    /// Distinct titles with their positions, first-seen order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, usize)> {
        self.positions.iter().map(|(n, i)| (n.as_str(), *i))
    }
}

/// A data record viewed through its sheet's header.
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    header: &'a HeaderIndex,
    cells: &'a [String],
}

impl<'a> SheetRow<'a> {
    pub fn new(header: &'a HeaderIndex, cells: &'a RawRecord) -> Self {
        Self { header, cells }
    }

    /// Value at column `index`; empty past the header width or a short row.
    pub fn column(&self, index: usize) -> &'a str {
        if index >= self.header.width() {
            return "";
        }
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    /// Value of the column titled exactly `name`.
    pub fn get(&self, name: &str) -> &'a str {
        self.header
            .position(name)
            .map(|i| self.column(i))
            .unwrap_or("")
    }

    /// `(title, value)` pairs for every distinct title.
    pub fn named_columns(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let cells = self.cells;
        let width = self.header.width();
        self.header.columns().map(move |(name, i)| {
            let value = if i < width {
                cells.get(i).map(String::as_str).unwrap_or("")
            } else {
                ""
            };
            (name, value)
        })
    }
}
