//! Synchronous snapshot reader
//!
//! Reads a whole snapshot file with `std::fs` and parses it. Snapshots are
//! operator-sized (tens to hundreds of rules), so there is no streaming.

use crate::io::json_format::{parse_snapshot, Snapshot};
use crate::types::RoutingError;
use std::io::ErrorKind;
use std::path::Path;

/// Read and parse a snapshot file
///
/// # Errors
///
/// - `FileNotFound` if nothing exists at `path`
/// - `IoError` if the file cannot be read
/// - `ParseError` if the content is not a valid snapshot
///
/// # Examples
///
/// ```no_run
/// use routing_rules_engine::io::read_snapshot;
/// use std::path::Path;
///
/// let snapshot = read_snapshot(Path::new("snapshot.json")).unwrap();
/// println!("{} rules", snapshot.rules.len());
/// ```
pub fn read_snapshot(path: &Path) -> Result<Snapshot, RoutingError> {
    let content = std::fs::read_to_string(path).map_err(|e| open_error(path, e))?;
    parse_snapshot(&content)
}

/// Map an open/read failure, keeping the path for a missing file
pub(crate) fn open_error(path: &Path, error: std::io::Error) -> RoutingError {
    match error.kind() {
        ErrorKind::NotFound => RoutingError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => RoutingError::IoError {
            message: format!("Failed to read '{}': {}", path.display(), error),
        },
    }
}
