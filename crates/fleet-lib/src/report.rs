//! Report persistence
//!
//! Reports are written wholesale as pretty-printed JSON, replacing any
//! previous file. No history is kept.

use crate::error::ReportError;
use serde::Serialize;
use std::path::Path;

/// Serialize `report` and overwrite `path` with it
pub async fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<(), ReportError> {
    let content = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_report_creates_parent_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("report.json");

        write_report(&path, &serde_json::json!({"run": 1, "extra": true}))
            .await
            .unwrap();
        write_report(&path, &serde_json::json!({"run": 2}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, serde_json::json!({"run": 2}));
    }

    #[tokio::test]
    async fn test_write_report_into_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_report(&blocker.join("report.json"), &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
