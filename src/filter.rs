use crate::entry::LogEntry;
use crate::error::ScanError;
use crate::scanner::ChunkedScanner;
use std::path::Path;

/// Chunk size used when [`ScanOptions::chunk_size`] is zero.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// A caller-supplied test deciding whether an entry belongs in the results.
///
/// `None` wherever an `Option<&EntryFilter>` is accepted means
/// "accept every entry".
pub type EntryFilter = dyn Fn(&LogEntry) -> bool;

/// Query configuration for a scan.
///
/// `chunk_size` bounds memory and sets the batch granularity; it never
/// changes which entries are returned. `max_results` caps the result
/// count, but only when `early_termination` is enabled — with it
/// disabled, every match is returned regardless of `max_results`.
///
/// # Examples
///
/// ```
/// use logsift::ScanOptions;
///
/// let opts = ScanOptions::default()
///     .with_chunk_size(500)
///     .with_max_results(10)
///     .with_early_termination(true);
/// assert_eq!(opts.max_results, 10);
/// ```
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lines decoded per chunk. Zero means [`DEFAULT_CHUNK_SIZE`].
    pub chunk_size: usize,

    /// Result-count threshold. Zero means unlimited.
    pub max_results: usize,

    /// When true and `max_results > 0`, stop scanning as soon as
    /// `max_results` matches are collected, even if unscanned data
    /// (or unopened files) remain.
    pub early_termination: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_results: 0,
            early_termination: false,
        }
    }
}

impl ScanOptions {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the result-count threshold.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Enable or disable early termination.
    pub fn with_early_termination(mut self, early_termination: bool) -> Self {
        self.early_termination = early_termination;
        self
    }

    pub(crate) fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}

/// Outcome of a scan: the matches, plus everything the caller can act on
/// besides them.
///
/// An empty `entries` with no error is the correct zero-match outcome,
/// not a failure.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Matching entries, in file-scan order then within-file line order.
    pub entries: Vec<LogEntry>,

    /// Non-fatal problems encountered along the way: skipped malformed
    /// lines, skipped unreadable files, abandoned reads.
    pub warnings: Vec<String>,

    /// Whether the scan stopped at the `max_results` threshold rather
    /// than at end of input.
    pub terminated_early: bool,

    /// Number of files actually opened and scanned.
    pub files_scanned: usize,
}

/// Applies a predicate over scanner output with exact early-termination
/// accounting.
///
/// The engine is stateless across chunks: the accumulated result vector
/// itself carries the running count, so one engine can span several
/// files of a multi-file scan.
pub struct FilterEngine<'f> {
    filter: Option<&'f EntryFilter>,
    limit: Option<usize>,
}

impl<'f> FilterEngine<'f> {
    /// Build an engine from a predicate and options. The termination
    /// limit is armed only when `early_termination` is set and
    /// `max_results` is nonzero.
    pub fn new(filter: Option<&'f EntryFilter>, opts: &ScanOptions) -> Self {
        let limit = (opts.early_termination && opts.max_results > 0).then_some(opts.max_results);
        FilterEngine { filter, limit }
    }

    /// Whether an entry passes the predicate. A missing predicate
    /// accepts everything.
    pub fn accept(&self, entry: &LogEntry) -> bool {
        self.filter.is_none_or(|f| f(entry))
    }

    /// Move the matching entries of `chunk` into `out`.
    ///
    /// Returns `true` once `out` has reached the armed limit; the chunk's
    /// remaining entries are dropped, so `out.len()` is then exactly the
    /// limit. Checked per entry, not per chunk, so the cap is never
    /// overshot even with large chunks.
    pub fn push_chunk(&self, chunk: Vec<LogEntry>, out: &mut Vec<LogEntry>) -> bool {
        for entry in chunk {
            if !self.accept(&entry) {
                continue;
            }
            out.push(entry);
            if self.limit.is_some_and(|limit| out.len() >= limit) {
                return true;
            }
        }
        false
    }
}

/// Scan a single log file, returning every entry the filter accepts.
///
/// This is the single-file query surface: the file is opened, scanned in
/// chunks, filtered, and closed before returning. An unopenable file is
/// fatal here — there is nothing else to read.
///
/// # Errors
///
/// Returns [`ScanError::Open`] if the file cannot be opened and
/// [`ScanError::Read`] if I/O fails mid-scan. Malformed lines are not
/// errors; they surface in [`ScanResult::warnings`].
pub fn scan_file(
    path: impl AsRef<Path>,
    filter: Option<&EntryFilter>,
    opts: &ScanOptions,
) -> Result<ScanResult, ScanError> {
    let path = path.as_ref();
    let mut scanner = ChunkedScanner::open(path, opts.effective_chunk_size())?;
    let engine = FilterEngine::new(filter, opts);
    let mut result = ScanResult {
        files_scanned: 1,
        ..ScanResult::default()
    };

    log::debug!("scanning {}", path.display());
    while let Some(chunk) = scanner.next_chunk()? {
        if engine.push_chunk(chunk, &mut result.entries) {
            result.terminated_early = true;
            break;
        }
    }
    result.warnings.extend_from_slice(scanner.warnings());
    log::debug!(
        "scanned {}: {} matching entries, {} warnings",
        path.display(),
        result.entries.len(),
        result.warnings.len()
    );

    Ok(result)
}
