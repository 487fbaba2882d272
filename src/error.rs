use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A line failed to decode as a log record.
///
/// Parse failures are recoverable at the line level: scanners skip the
/// offending line and record a warning rather than aborting the scan.
/// The caller never receives a partially populated entry alongside one
/// of these.
#[derive(Debug, Error)]
#[error("invalid log record: {0}")]
pub struct ParseError(#[from] pub serde_json::Error);

/// Errors surfaced by scanning operations.
///
/// Line-level problems never appear here — they are accumulated as
/// warning strings on the scan result. A multi-file scan only fails
/// outright when every candidate file was unreadable.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A log file could not be opened. Fatal for single-file scans,
    /// skip-with-warning for multi-file scans.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O failed partway through reading a file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log directory could not be enumerated.
    #[error("failed to list log directory {dir}: {source}")]
    ListDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Candidate files existed but every one of them failed to open.
    #[error("no readable log files in {dir}: all {failed} candidate file(s) failed to open")]
    NoReadableFiles { dir: PathBuf, failed: usize },

    /// A filesystem watch could not be established.
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The log directory environment variable is missing or empty.
    #[error("{0} environment variable is not set")]
    LogDirUnset(&'static str),
}
