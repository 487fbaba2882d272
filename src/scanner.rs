use crate::entry::LogEntry;
use crate::error::ScanError;
use fs2::FileExt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Chunked, forward-only reader over a single log file.
///
/// Opens the file once, takes a shared advisory lock for the duration of
/// the scan, and decodes lines in batches of `chunk_size` so peak memory
/// stays bounded regardless of file size. Files ending in `.zst` are
/// decompressed transparently (rotated archives).
///
/// Malformed lines are skipped and recorded — one warning per line,
/// retrievable via [`warnings`](ChunkedScanner::warnings) after the scan.
/// The file handle (and with it the lock) is released when the scanner
/// is dropped, on every exit path.
pub struct ChunkedScanner {
    path: PathBuf,
    reader: Box<dyn BufRead>,
    chunk_size: usize,
    line_no: u64,
    warnings: Vec<String>,
    done: bool,
}

impl ChunkedScanner {
    /// Open a log file for chunked scanning.
    ///
    /// `chunk_size` is the number of lines decoded per
    /// [`next_chunk`](ChunkedScanner::next_chunk) call; it affects
    /// throughput and interruption granularity, never which entries are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Open`] if the file cannot be opened, locked,
    /// or (for `.zst` files) the decompressor cannot be initialized.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| ScanError::Open {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(open_err)?;
        file.lock_shared().map_err(open_err)?;

        // The lock rides on the descriptor: handing the file to the zstd
        // decoder keeps it held until the scanner is dropped.
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "zst") {
            let decoder = zstd::Decoder::new(file).map_err(open_err)?;
            Box::new(BufReader::new(decoder))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(ChunkedScanner {
            path,
            reader,
            chunk_size: chunk_size.max(1),
            line_no: 0,
            warnings: Vec::new(),
            done: false,
        })
    }

    /// Read and decode the next chunk of up to `chunk_size` lines.
    ///
    /// Returns `Ok(None)` at end of file. A returned chunk may hold fewer
    /// entries than lines read — empty lines are skipped silently, and
    /// malformed lines are skipped with a recorded warning — so an empty
    /// `Vec` does not mean end of file.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] if the underlying I/O fails. Decode
    /// failures of individual lines are never errors here.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<LogEntry>>, ScanError> {
        if self.done {
            return Ok(None);
        }

        let mut entries = Vec::new();
        let mut lines_read = 0usize;
        let mut buf = String::new();

        while lines_read < self.chunk_size {
            buf.clear();
            let n = self
                .reader
                .read_line(&mut buf)
                .map_err(|source| ScanError::Read {
                    path: self.path.clone(),
                    source,
                })?;
            if n == 0 {
                self.done = true;
                break;
            }
            self.line_no += 1;
            lines_read += 1;

            let line = buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            match LogEntry::parse(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    let warning = format!("{}:{}: {err}", self.path.display(), self.line_no);
                    log::warn!("skipping malformed log line: {warning}");
                    self.warnings.push(warning);
                }
            }
        }

        if lines_read == 0 {
            Ok(None)
        } else {
            Ok(Some(entries))
        }
    }

    /// Warnings accumulated so far, one per skipped line.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The path this scanner reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}
