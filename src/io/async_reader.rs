//! Asynchronous snapshot reader
//!
//! Reads a snapshot file on the tokio runtime. Parsing is the same as the
//! synchronous reader's.

use crate::io::json_format::{parse_snapshot, Snapshot};
use crate::io::snapshot_reader::open_error;
use crate::types::RoutingError;
use std::path::Path;

/// Read and parse a snapshot file without blocking the runtime
///
/// # Errors
///
/// Same as [`read_snapshot`](crate::io::read_snapshot).
pub async fn read_snapshot_async(path: &Path) -> Result<Snapshot, RoutingError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| open_error(path, e))?;
    parse_snapshot(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_snapshot_async() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"bindings": [{"id": "b-1", "organizationId": "org-1", "routingRuleId": "r-1"}]}"#,
        )
        .unwrap();
        file.flush().unwrap();

        let snapshot = read_snapshot_async(file.path()).await.unwrap();

        assert!(snapshot.rules.is_empty());
        assert_eq!(snapshot.bindings.len(), 1);
        assert!(snapshot.bindings[0].enable);
    }

    #[tokio::test]
    async fn test_read_snapshot_async_missing_file() {
        let result = read_snapshot_async(Path::new("nonexistent.json")).await;

        assert!(matches!(result, Err(RoutingError::FileNotFound { .. })));
    }
}
