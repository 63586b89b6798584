use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use serde_json::Value;

use crate::error::{Context, Result};
use crate::fetch::RawTable;
use crate::transform::{QuoteRecord, CANONICAL_COLUMNS};

pub const RAW_CSV_FILE: &str = "market_data.csv";
pub const CANONICAL_CSV_FILE: &str = "market_data_transformed.csv";
pub const WORKBOOK_FILE: &str = "market_data_transformed.xlsx";
pub const SHEET_NAME: &str = "Market Data";

/// Fixed display widths for the date and exchange columns.
const DATE_COLUMN_WIDTH: f64 = 12.0;
const EXCHANGE_COLUMN_WIDTH: f64 = 15.0;

/// Facade that keeps artifact persistence isolated from the rest of the app.
/// Every write is a full-file overwrite; I/O failures propagate unrecovered.
pub struct Outputs {
    data_dir: PathBuf,
}

impl Outputs {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Ensure the target directory exists before any persistence happens.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {}",
                self.data_dir.display()
            )
        })?;
        Ok(())
    }

    /// Persist the response exactly as fetched, with the original field names
    /// as the header and null cells rendered empty.
    pub fn write_raw_csv(&self, table: &RawTable) -> Result<PathBuf> {
        let path = self.data_dir.join(RAW_CSV_FILE);
        let mut writer = csv::Writer::from_path(&path).context("Failed to create CSV writer")?;

        writer.write_record(table.columns())?;

        for row in table.rows() {
            let record: Vec<String> = table
                .columns()
                .iter()
                .map(|column| cell_to_field(row.get(column)))
                .collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(path)
    }

    /// Persist the canonical table; the header comes from the record's field
    /// names, which match `CANONICAL_COLUMNS` in order.
    pub fn write_canonical_csv(&self, records: &[QuoteRecord]) -> Result<PathBuf> {
        let path = self.data_dir.join(CANONICAL_CSV_FILE);
        let mut writer = csv::Writer::from_path(&path).context("Failed to create CSV writer")?;

        for record in records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(path)
    }

    /// Persist the canonical table as a single-sheet workbook.
    pub fn write_workbook(&self, records: &[QuoteRecord]) -> Result<PathBuf> {
        let path = self.data_dir.join(WORKBOOK_FILE);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, name) in CANONICAL_COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *name)?;
        }

        for (idx, record) in records.iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet.write_string(row, 0, record.date.as_str())?;
            worksheet.write_string(row, 1, record.exchange.as_str())?;
            worksheet.write_string(row, 2, record.symbol.as_str())?;
            worksheet.write_number(row, 3, record.dividend)?;
            worksheet.write_number(row, 4, record.open)?;
            worksheet.write_number(row, 5, record.high)?;
            worksheet.write_number(row, 6, record.low)?;
            worksheet.write_number(row, 7, record.close)?;
            worksheet.write_number(row, 8, record.volume)?;
            worksheet.write_number(row, 9, record.adj_high)?;
            worksheet.write_number(row, 10, record.adj_low)?;
            worksheet.write_number(row, 11, record.adj_close)?;
            worksheet.write_number(row, 12, record.adj_open)?;
            worksheet.write_number(row, 13, record.adj_volume)?;
            worksheet.write_number(row, 14, record.split_factor)?;
        }

        worksheet.set_column_width(0, DATE_COLUMN_WIDTH)?;
        worksheet.set_column_width(1, EXCHANGE_COLUMN_WIDTH)?;

        workbook.save(&path)?;
        Ok(path)
    }
}

fn cell_to_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use serde_json::json;

    fn sample_record() -> QuoteRecord {
        QuoteRecord {
            date: "05/03/2024".to_string(),
            exchange: "BVMF".to_string(),
            symbol: "JBSS3".to_string(),
            dividend: 0.0,
            open: 10.5,
            high: 0.0,
            low: 0.0,
            close: 10.8,
            volume: 0.0,
            adj_high: 0.0,
            adj_low: 0.0,
            adj_close: 0.0,
            adj_open: 0.0,
            adj_volume: 0.0,
            split_factor: 0.0,
        }
    }

    #[test]
    fn prepare_creates_nested_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = Outputs::new(dir.path().join("nested").join("data"));

        outputs.prepare().unwrap();

        assert!(outputs.data_dir().is_dir());
    }

    #[test]
    fn raw_csv_preserves_original_fields_and_renders_nulls_empty() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = Outputs::new(dir.path());

        let table = RawTable::from_json_rows(&[
            json!({"date": "2024-03-05T00:00:00+0000", "open": 10.5, "dividend": null}),
            json!({"date": "2024-03-06T00:00:00+0000", "close": 10.8}),
        ]);

        let path = outputs.write_raw_csv(&table).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines[0], "date,open,dividend,close");
        assert_eq!(lines[1], "2024-03-05T00:00:00+0000,10.5,,");
        assert_eq!(lines[2], "2024-03-06T00:00:00+0000,,,10.8");
    }

    #[test]
    fn canonical_csv_header_matches_column_contract() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = Outputs::new(dir.path());

        let path = outputs.write_canonical_csv(&[sample_record()]).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines[0], CANONICAL_COLUMNS.join(","));
        assert!(lines[1].starts_with("05/03/2024,BVMF,JBSS3,"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn workbook_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = Outputs::new(dir.path());

        let path = outputs.write_workbook(&[sample_record()]).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();

        assert_eq!(range.height(), 2);
        assert_eq!(range.width(), CANONICAL_COLUMNS.len());

        for (col, name) in CANONICAL_COLUMNS.iter().enumerate() {
            assert_eq!(
                range.get_value((0, col as u32)),
                Some(&Data::String((*name).to_string()))
            );
        }

        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("05/03/2024".to_string()))
        );
        assert_eq!(
            range.get_value((1, 1)),
            Some(&Data::String("BVMF".to_string()))
        );
        assert_eq!(range.get_value((1, 4)), Some(&Data::Float(10.5)));
        assert_eq!(range.get_value((1, 7)), Some(&Data::Float(10.8)));
    }

    #[test]
    fn writes_overwrite_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = Outputs::new(dir.path());

        let table = RawTable::from_json_rows(&[json!({"date": "2024-03-05"})]);
        outputs.write_raw_csv(&table).unwrap();

        let smaller = RawTable::from_json_rows(&[json!({"date": "2024-03-06"})]);
        let path = outputs.write_raw_csv(&smaller).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("2024-03-06"));
        assert!(!contents.contains("2024-03-05"));
    }
}
