// export/mod.rs - Excel workbook rendering
//
// A sheet is a header row plus data rows; callers decide what goes into the cells.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] XlsxError),

    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth { row: usize, found: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Width the cell occupies when rendered, in characters
    fn width(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => n.to_string().chars().count(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        Cell::Text(value.unwrap_or_default())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// `max(header, longest cell) + 2` per column
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(Cell::width)
                    .max()
                    .unwrap_or(0);
                header.chars().count().max(longest) + 2
            })
            .collect()
    }

    fn check_rows(&self) -> Result<(), ExportError> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.headers.len() {
                return Err(ExportError::RowWidth {
                    row: i,
                    found: row.len(),
                    expected: self.headers.len(),
                });
            }
        }
        Ok(())
    }
}

/// Render the sheet into an in-memory xlsx file
pub fn render(sheet: &Sheet) -> Result<Vec<u8>, ExportError> {
    sheet.check_rows()?;

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (i, row) in sheet.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => worksheet.write_string(r, col as u16, s)?,
                Cell::Number(n) => worksheet.write_number(r, col as u16, *n)?,
            };
        }
    }

    for (col, width) in sheet.column_widths().into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// `<base>_<YYYY-MM-DD>.xlsx`
pub fn filename(base: &str, date: NaiveDate) -> String {
    format!("{}_{}.xlsx", base, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sheet {
        let mut sheet = Sheet::new("Tenants", &["Name", "Rent"]);
        sheet.push_row(vec!["Bekzod Karimov".into(), 1_500_000i64.into()]);
        sheet.push_row(vec!["Ali".into(), 900i64.into()]);
        sheet
    }

    #[test]
    fn widths_follow_the_longest_value() {
        // "Bekzod Karimov" is 14 chars, "1500000" is 7
        assert_eq!(sample().column_widths(), vec![16, 9]);
        assert_eq!(Sheet::new("Empty", &["Warehouse"]).column_widths(), vec![11]);
    }

    #[test]
    fn renders_a_zip_container() {
        let bytes = render(&sample()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut sheet = Sheet::new("Bad", &["A", "B"]);
        sheet.push_row(vec!["only one".into()]);
        assert!(matches!(render(&sheet), Err(ExportError::RowWidth { row: 0, found: 1, expected: 2 })));
    }

    #[test]
    fn filename_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(filename("payments", date), "payments_2025-03-07.xlsx");
    }
}
