use crate::entry::LogEntry;
use crate::error::ScanError;
use crate::filter::{scan_file, EntryFilter, FilterEngine, ScanOptions, ScanResult};
use crate::scanner::ChunkedScanner;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the log directory, read by
/// [`LogReader::from_env`].
pub const LOG_DIR_ENV: &str = "LOG_DIR";

const FILE_PREFIX: &str = "app-";
const FILE_SUFFIX: &str = ".log";
const ARCHIVE_SUFFIX: &str = ".log.zst";

/// Read-side handle over a directory of daily log files.
///
/// Log files follow the naming convention `app-<YYYY-MM-DD>.log`, with
/// rotated archives as `app-<YYYY-MM-DD>.log.zst`. Anything else in the
/// directory is ignored, never an error.
///
/// The directory is injected at construction — nothing in the scanning
/// path consults the process environment, so several readers with
/// different roots can coexist in one process. [`LogReader::from_env`]
/// is the one place the `LOG_DIR` variable is consulted.
///
/// Every file opened during a scan is closed before the call returns,
/// on success and failure alike.
#[derive(Debug, Clone)]
pub struct LogReader {
    dir: PathBuf,
}

impl LogReader {
    /// Create a reader over the given log directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LogReader { dir: dir.into() }
    }

    /// Create a reader over the directory named by the `LOG_DIR`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::LogDirUnset`] when the variable is missing
    /// or empty.
    pub fn from_env() -> Result<Self, ScanError> {
        match std::env::var(LOG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Ok(LogReader::new(dir)),
            _ => Err(ScanError::LogDirUnset(LOG_DIR_ENV)),
        }
    }

    /// The directory this reader scans.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for a given date (`app-<date>.log`).
    pub fn file_for_date(&self, date: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{date}{FILE_SUFFIX}"))
    }

    /// Scan the single log file for `date` with the given filter and
    /// options.
    ///
    /// # Errors
    ///
    /// An unopenable file is fatal here, unlike in multi-file scans:
    /// there is exactly one candidate.
    pub fn read_for_date(
        &self,
        date: &str,
        filter: Option<&EntryFilter>,
        opts: &ScanOptions,
    ) -> Result<ScanResult, ScanError> {
        scan_file(self.file_for_date(date), filter, opts)
    }

    /// Collect every entry with the given correlation identifier across
    /// all log files in the directory.
    ///
    /// # Errors
    ///
    /// See [`scan_all`](LogReader::scan_all).
    pub fn by_log_id(&self, log_id: &str) -> Result<ScanResult, ScanError> {
        self.by_log_id_with_options(log_id, &ScanOptions::default())
    }

    /// [`by_log_id`](LogReader::by_log_id) with explicit options, for
    /// bounded queries over large directories.
    pub fn by_log_id_with_options(
        &self,
        log_id: &str,
        opts: &ScanOptions,
    ) -> Result<ScanResult, ScanError> {
        let log_id = log_id.to_owned();
        let filter = move |entry: &LogEntry| entry.log_id == log_id;
        self.scan_all(Some(&filter), opts)
    }

    /// Scan every candidate file in the directory, in lexicographic
    /// (and therefore chronological) filename order.
    ///
    /// A candidate that fails to open is skipped with a warning and the
    /// scan continues; once early termination triggers, no further files
    /// are opened. Results preserve file-scan order, then within-file
    /// line order.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ListDir`] if the directory cannot be
    /// enumerated, and [`ScanError::NoReadableFiles`] when candidates
    /// existed but every one failed to open. Zero candidates is an empty
    /// result, not an error.
    pub fn scan_all(
        &self,
        filter: Option<&EntryFilter>,
        opts: &ScanOptions,
    ) -> Result<ScanResult, ScanError> {
        let candidates = self.log_files()?;
        let engine = FilterEngine::new(filter, opts);
        let mut result = ScanResult::default();
        let mut failed = 0usize;

        log::debug!(
            "scanning {} candidate file(s) in {}",
            candidates.len(),
            self.dir.display()
        );

        for path in &candidates {
            let mut scanner = match ChunkedScanner::open(path, opts.effective_chunk_size()) {
                Ok(scanner) => scanner,
                Err(err) => {
                    failed += 1;
                    log::warn!("skipping unreadable log file: {err}");
                    result.warnings.push(err.to_string());
                    continue;
                }
            };
            result.files_scanned += 1;

            let mut reached_limit = false;
            loop {
                match scanner.next_chunk() {
                    Ok(Some(chunk)) => {
                        if engine.push_chunk(chunk, &mut result.entries) {
                            reached_limit = true;
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        // Keep what this file yielded so far and move on.
                        log::warn!("abandoning {}: {err}", path.display());
                        result.warnings.push(err.to_string());
                        break;
                    }
                }
            }
            result.warnings.extend_from_slice(scanner.warnings());

            if reached_limit {
                result.terminated_early = true;
                break;
            }
        }

        if result.files_scanned == 0 && failed > 0 {
            return Err(ScanError::NoReadableFiles {
                dir: self.dir.clone(),
                failed,
            });
        }

        Ok(result)
    }

    /// Candidate log files in the directory, sorted by name. Files not
    /// matching the naming convention are ignored.
    fn log_files(&self) -> Result<Vec<PathBuf>, ScanError> {
        let list_err = |source| ScanError::ListDir {
            dir: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for dent in fs::read_dir(&self.dir).map_err(list_err)? {
            let dent = dent.map_err(list_err)?;
            let name = dent.file_name();
            let Some(name) = name.to_str() else { continue };
            if is_log_file_name(name) {
                files.push(dent.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Whether a filename matches `app-<YYYY-MM-DD>.log` or
/// `app-<YYYY-MM-DD>.log.zst`.
fn is_log_file_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix(FILE_PREFIX) else {
        return false;
    };
    let date = rest
        .strip_suffix(ARCHIVE_SUFFIX)
        .or_else(|| rest.strip_suffix(FILE_SUFFIX));
    date.is_some_and(is_date)
}

/// Shape check for `YYYY-MM-DD`. Calendar validity is the emitter's
/// problem, not the scanner's.
fn is_date(s: &str) -> bool {
    s.len() == 10
        && s.bytes().enumerate().all(|(i, c)| match i {
            4 | 7 => c == b'-',
            _ => c.is_ascii_digit(),
        })
}
