//! Uploaded product catalog
//!
//! A catalog is the first sheet of a spreadsheet: one header row followed by
//! product rows. Headers are trimmed on load; rows keep their original order
//! and are never filtered.

pub mod columns;
pub mod context;
pub mod price;

use anyhow::anyhow;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::info;

/// Number of rows shown by [`Catalog::preview`] by default.
pub const PREVIEW_ROWS: usize = 20;

const PREVIEW_MAX_CELL_CHARS: usize = 24;

/// A single spreadsheet value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            // f64 Display already drops the trailing ".0" of whole numbers
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    sheet_name: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Catalog {
    /// Build a catalog from in-memory headers and rows.
    ///
    /// Headers are trimmed. Short rows are padded with [`Cell::Empty`] and
    /// cells beyond the header width are dropped.
    pub fn new<H, R>(headers: impl IntoIterator<Item = H>, rows: impl IntoIterator<Item = R>) -> Self
    where
        H: AsRef<str>,
        R: IntoIterator<Item = Cell>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_string())
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Cell> = row.into_iter().take(width).collect();
                cells.resize(width, Cell::Empty);
                cells
            })
            .collect();
        Catalog {
            sheet_name: None,
            headers,
            rows,
        }
    }

    /// Load the first sheet of a spreadsheet file (.xlsx, .xls, .ods).
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|err| anyhow!("Unable to read {}: {}", path.display(), err))?;
        Self::from_bytes(bytes)
    }

    /// Load the first sheet of a spreadsheet held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<RS>(reader: RS) -> anyhow::Result<Self>
    where
        RS: Read + Seek + Clone,
    {
        let mut workbook = open_workbook_auto_from_rs(reader)
            .map_err(|err| anyhow!("Unable to open the spreadsheet: {err}"))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("The spreadsheet does not contain any sheets."))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| anyhow!("Unable to read the worksheet named '{sheet_name}': {err}"))?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| anyhow!("The worksheet named '{sheet_name}' is empty."))?;
        let headers = header_row
            .iter()
            .map(|cell| Cell::from(cell).to_string())
            .collect::<Vec<_>>();
        let body = rows.map(|row| row.iter().map(Cell::from).collect::<Vec<_>>());

        let mut catalog = Catalog::new(headers, body);
        info!(
            sheet = %sheet_name,
            rows = catalog.len(),
            columns = catalog.headers.len(),
            "Catalog loaded"
        );
        catalog.sheet_name = Some(sheet_name);
        Ok(catalog)
    }

    /// Name of the sheet the catalog was loaded from, if it came from a file.
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the first `limit` rows as a plain-text table.
    pub fn preview(&self, limit: usize) -> String {
        let clip = |s: String| -> String {
            if s.chars().count() > PREVIEW_MAX_CELL_CHARS {
                let mut clipped: String = s.chars().take(PREVIEW_MAX_CELL_CHARS - 1).collect();
                clipped.push('…');
                clipped
            } else {
                s
            }
        };

        let mut table: Vec<Vec<String>> = Vec::with_capacity(limit.min(self.len()) + 1);
        table.push(self.headers.iter().cloned().map(clip).collect());
        for row in self.rows.iter().take(limit) {
            table.push(row.iter().map(|c| clip(c.to_string())).collect());
        }

        let mut widths = vec![0usize; self.headers.len()];
        for row in &table {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let render = |row: &[String]| -> String {
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    let pad = widths[i] - cell.chars().count();
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(table.len() + 1);
        lines.push(render(&table[0]));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &table[1..] {
            lines.push(render(row));
        }
        if self.len() > limit {
            lines.push(format!("({} more rows)", self.len() - limit));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_headers_and_pads_rows() {
        let catalog = Catalog::new(
            ["  Nama ", "Harga\t", "Stok"],
            vec![vec![Cell::from("Nugget"), Cell::from(25000.0)]],
        );
        assert_eq!(catalog.headers(), ["Nama", "Harga", "Stok"]);
        let row = catalog.rows().next().unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row[2], Cell::Empty);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(10.0).to_string(), "10");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::from("  500 gr ").to_string(), "500 gr");
        assert_eq!(Cell::Empty.to_string(), "");
        assert!(Cell::from("   ").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn test_from_calamine_data() {
        assert_eq!(Cell::from(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(Cell::from(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(Cell::from(&Data::Empty), Cell::Empty);
        assert_eq!(Cell::from(&Data::Bool(true)), Cell::Text("true".to_string()));
    }

    #[test]
    fn test_preview_limits_rows() {
        let rows = (0..30).map(|i| vec![Cell::from(format!("Produk {}", i)), Cell::from(i as i64)]);
        let catalog = Catalog::new(["Nama", "Harga"], rows);
        let preview = catalog.preview(PREVIEW_ROWS);
        let lines: Vec<&str> = preview.lines().collect();
        // header + separator + 20 rows + remainder note
        assert_eq!(lines.len(), 23);
        assert!(lines[0].starts_with("Nama"));
        assert_eq!(lines[22], "(10 more rows)");
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(Catalog::from_bytes(b"not a spreadsheet".to_vec()).is_err());
    }
}
