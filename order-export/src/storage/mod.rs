//! Object store for export files
//!
//! Objects are written unconditionally; a second upload to the same key replaces
//! the first.

mod s3;

pub use s3::S3ObjectStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// MIME type of export files
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Where an export file goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
}

impl UploadTarget {
    /// Daily CSV target: `{prefix}/{YYYY-MM-DD}{suffix}`
    pub fn daily_csv(bucket: &str, prefix: &str, date: NaiveDate, suffix: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: object_key(prefix, &daily_file_name(date, suffix)),
            content_type: CSV_CONTENT_TYPE.to_string(),
        }
    }
}

/// `YYYY-MM-DD` followed by `suffix`
pub fn daily_file_name(date: NaiveDate, suffix: &str) -> String {
    format!("{}{suffix}", date.format("%Y-%m-%d"))
}

/// Join a prefix and file name, tolerating stray slashes on the prefix
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        file_name.to_string()
    } else {
        format!("{trimmed}/{file_name}")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("upload to s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Destination for export files
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, target: &UploadTarget, body: Vec<u8>) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_file_names() {
        assert_eq!(daily_file_name(date(2024, 5, 1), ".csv"), "2024-05-01.csv");
        assert_eq!(
            daily_file_name(date(2024, 12, 31), "-orders.csv"),
            "2024-12-31-orders.csv"
        );
    }

    #[test]
    fn test_object_key_prefix_handling() {
        assert_eq!(object_key("exports", "a.csv"), "exports/a.csv");
        assert_eq!(object_key("/exports/daily/", "a.csv"), "exports/daily/a.csv");
        assert_eq!(object_key("", "a.csv"), "a.csv");
    }

    #[test]
    fn test_daily_csv_target() {
        let target = UploadTarget::daily_csv("bucket", "team", date(2024, 5, 1), ".csv");
        assert_eq!(
            target,
            UploadTarget {
                bucket: "bucket".to_string(),
                key: "team/2024-05-01.csv".to_string(),
                content_type: "text/csv".to_string(),
            }
        );
    }
}
