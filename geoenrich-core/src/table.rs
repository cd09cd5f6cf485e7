use crate::geocoding::Coordinate;
use std::fmt::Write as _;

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const STATE: &str = "state";
pub const LGA: &str = "lga";

/// Rendered for absent cells in previews
const ABSENT: &str = "None";

/// An in-memory table of rows, loaded from the user's file.
///
/// Column names are normalized (trimmed, lowercased) on construction. A cell
/// is absent when it is `None` or holds only whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Normalize a column name for matching: strip a BOM, trim, lowercase
pub fn normalize_column_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

impl LocationTable {
    /// Build a table, normalizing headers and squaring ragged rows to the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| normalize_column_name(h)).collect();
        let width = headers.len();

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column with this (normalized) name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = normalize_column_name(name);
        self.headers.iter().position(|h| *h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Return the column's index, appending it (all absent) if missing
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }

        self.headers.push(normalize_column_name(name));
        for row in &mut self.rows {
            row.push(None);
        }
        self.headers.len() - 1
    }

    /// Cell value, or `None` if absent
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)?
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn set(&mut self, row: usize, column: usize, value: Option<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }

    /// True when both `state` and `lga` are present for this row
    pub fn is_resolved(&self, row: usize) -> bool {
        match (self.column_index(STATE), self.column_index(LGA)) {
            (Some(state), Some(lga)) => {
                self.get(row, state).is_some() && self.get(row, lga).is_some()
            }
            _ => false,
        }
    }

    /// Parse the row's latitude/longitude cells
    pub fn coordinate(&self, row: usize) -> Result<Coordinate, String> {
        let latitude = self.parse_degrees(row, LATITUDE)?;
        let longitude = self.parse_degrees(row, LONGITUDE)?;
        Ok(Coordinate::new(latitude, longitude))
    }

    fn parse_degrees(&self, row: usize, name: &str) -> Result<f64, String> {
        let column = self
            .column_index(name)
            .ok_or_else(|| format!("no {} column", name))?;
        let raw = self
            .get(row, column)
            .ok_or_else(|| format!("{} is empty", name))?;

        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(format!("{} '{}' is not a number", name, raw.trim())),
        }
    }

    /// Render the first `limit` rows as an aligned text grid with a row index
    pub fn preview(&self, limit: usize) -> String {
        let shown = self.rows.len().min(limit);
        let index_width = shown.saturating_sub(1).to_string().len();

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows[..shown] {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_cell(cell).chars().count());
            }
        }

        let mut out = String::new();
        let _ = write!(out, "{:index_width$}", "");
        for (header, width) in self.headers.iter().zip(&widths) {
            let _ = write!(out, "  {:<width$}", header, width = *width);
        }
        out.push('\n');

        for (i, row) in self.rows[..shown].iter().enumerate() {
            let _ = write!(out, "{:<index_width$}", i);
            for (cell, width) in row.iter().zip(&widths) {
                let _ = write!(out, "  {:<width$}", display_cell(cell), width = *width);
            }
            out.push('\n');
        }

        if self.rows.len() > shown {
            let _ = writeln!(out, "... {} more rows", self.rows.len() - shown);
        }

        out
    }
}

fn display_cell(cell: &Option<String>) -> &str {
    match cell.as_deref() {
        Some(value) if !value.trim().is_empty() => value,
        _ => ABSENT,
    }
}
