//! Dated CSV output for scraped records

use crate::error::Error as CrateError;
use crate::record::Record;
use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Column labels, in write order
pub const CSV_HEADER: [&str; 5] = ["Title", "Price", "ImageURL", "URL", "Time"];

/// File stem format: zero-padded month, unpadded day (`2026-10-7`)
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%-d";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory the CSV files are written to
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<StorageError> for CrateError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => CrateError::Io(e),
            StorageError::Csv(e) => CrateError::Storage(e.to_string()),
        }
    }
}

type Result<T> = std::result::Result<T, StorageError>;

/// Writes record collections to dated CSV files
#[derive(Debug, Clone, Default)]
pub struct CsvStorage {
    config: StorageConfig,
}

impl CsvStorage {
    /// Create a storage writing into `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            config: StorageConfig {
                base_path: base_path.into(),
            },
        }
    }

    /// Output directory
    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    /// Path of the CSV file for a given day
    pub fn dated_path(&self, date: NaiveDate) -> PathBuf {
        self.config
            .base_path
            .join(format!("{}.csv", date.format(FILE_DATE_FORMAT)))
    }

    /// Create the output directory if it does not exist yet
    pub async fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.config.base_path).await?;
        Ok(())
    }

    /// Serialize records to CSV bytes, header first
    pub fn render(records: &[Record]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }

        writer.into_inner().map_err(|e| StorageError::Io(e.into_error()))
    }

    /// Write records to the file for `date`, replacing any earlier run's file
    /// from the same day. Returns the path once the write has completed.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn write(&self, records: &[Record], date: NaiveDate) -> Result<PathBuf> {
        let path = self.dated_path(date);
        let bytes = Self::render(records)?;

        self.ensure_output_dir().await?;
        fs::write(&path, bytes).await?;

        info!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn record(title: &str, id: u32) -> Record {
        Record {
            title: title.to_string(),
            price: "$18".to_string(),
            image_url: format!("http://www.shirts4mike.com/img/shirts/shirt-{}.jpg", id),
            url: format!("http://www.shirts4mike.com/shirt.php?id={}", id),
            time: Local.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_default_writes_to_data_dir() {
        assert_eq!(CsvStorage::default().base_path(), Path::new("data"));
    }

    #[test]
    fn test_dated_path_does_not_pad_day() {
        let storage = CsvStorage::new("data");

        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(storage.dated_path(date), PathBuf::from("data/2026-03-7.csv"));

        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(storage.dated_path(date), PathBuf::from("data/2026-10-17.csv"));
    }

    #[test]
    fn test_render_quotes_embedded_commas() {
        let bytes = CsvStorage::render(&[record("Logo Shirt, Red", 101)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("Title,Price,ImageURL,URL,Time"));
        assert_eq!(
            lines.next(),
            Some(
                "\"Logo Shirt, Red\",$18,http://www.shirts4mike.com/img/shirts/shirt-101.jpg,\
                 http://www.shirts4mike.com/shirt.php?id=101,2026-10-17 09:30:00.000"
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let storage = CsvStorage::new(dir.path().join("data"));
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        let path = storage
            .write(&[record("Logo Shirt, Red", 101), record("Mike Shirt", 102)], date)
            .await
            .unwrap();

        assert!(path.ends_with("data/2026-10-17.csv"));
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 2);
    }

    #[tokio::test]
    async fn test_same_day_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = CsvStorage::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        storage
            .write(&[record("A", 1), record("B", 2), record("C", 3)], date)
            .await
            .unwrap();
        let path = storage.write(&[record("D", 4)], date).await.unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let titles: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(titles, vec!["D"]);
    }

    #[tokio::test]
    async fn test_ensure_output_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = CsvStorage::new(dir.path().join("data"));

        storage.ensure_output_dir().await.unwrap();
        storage.ensure_output_dir().await.unwrap();

        assert!(storage.base_path().is_dir());
    }
}
