use serde_json::{Map, Value};

/// Tabular form of the quote API response before any normalization.
///
/// Columns keep the order in which field names first appear across rows, so
/// the raw CSV header matches what the service actually returned.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl RawTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from the `data` array of a quote response, preserving
    /// whatever fields each record carries. Non-object entries are skipped.
    pub fn from_json_rows(rows: &[Value]) -> Self {
        let mut table = Self::default();

        for value in rows {
            let Some(object) = value.as_object() else {
                continue;
            };

            for key in object.keys() {
                if !table.columns.iter().any(|column| column == key) {
                    table.columns.push(key.clone());
                }
            }

            table.rows.push(object.clone());
        }

        table
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn columns_keep_first_seen_order() {
        let rows = vec![
            json!({"date": "2024-03-05", "open": 10.5}),
            json!({"close": 10.8, "date": "2024-03-06", "open": 10.6}),
        ];

        let table = RawTable::from_json_rows(&rows);

        assert_eq!(table.columns(), &["date", "open", "close"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn skips_non_object_entries() {
        let rows = vec![json!("not a record"), json!({"date": "2024-03-05"})];

        let table = RawTable::from_json_rows(&rows);

        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), &["date"]);
    }

    #[test]
    fn empty_table_signals_no_data() {
        assert!(RawTable::empty().is_empty());
        assert!(RawTable::from_json_rows(&[]).is_empty());
    }
}
