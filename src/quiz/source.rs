use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use crate::quiz::Result;

/// A parsed data row: column name to cell value.
pub type RawRow = HashMap<String, String>;

/// Anything that can hand the bank a list of parsed rows.
pub trait QuestionSource {
    fn rows(&self) -> Result<Vec<RawRow>>;
}

impl QuestionSource for Vec<RawRow> {
    fn rows(&self) -> Result<Vec<RawRow>> {
        Ok(self.clone())
    }
}

/// Reads rows from a CSV file with a header row.
///
/// The path must already be resolved; locating or copying the bundled file
/// is the embedder's job.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuestionSource for CsvSource {
    fn rows(&self) -> Result<Vec<RawRow>> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            // Short records simply leave the trailing columns out of the row
            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), value.to_string()))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}
