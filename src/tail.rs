use crate::entry::LogEntry;
use crate::error::ScanError;
use notify::{RecursiveMode, Watcher};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Outcome of [`wait_for_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// The file grew past the watched offset; carries the new length.
    NewData(u64),
    /// The timeout elapsed with no growth.
    Timeout,
}

/// Read entries from a log file starting at the given byte offset.
///
/// Yields `(entry, next_offset)` for each complete line, where
/// `next_offset` is the byte after the line's newline — feed it back in
/// on the next call to resume where this one left off. Empty lines are
/// skipped. A partial trailing line (crash mid-write, or a writer caught
/// between write and flush) is skipped silently and not advanced past,
/// so it is re-read once complete. Malformed complete lines are skipped
/// with a `log::warn!`.
///
/// # Errors
///
/// Returns [`ScanError::Open`] / [`ScanError::Read`] for I/O failures;
/// the iterator items carry [`ScanError::Read`] for failures mid-stream.
pub fn read_from(
    path: impl AsRef<Path>,
    offset: u64,
) -> Result<impl Iterator<Item = Result<(LogEntry, u64), ScanError>>, ScanError> {
    let path = path.as_ref().to_path_buf();
    let mut file = File::open(&path).map_err(|source| ScanError::Open {
        path: path.clone(),
        source,
    })?;
    file.seek(SeekFrom::Start(offset))
        .map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
    let file_len = file
        .metadata()
        .map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?
        .len();
    let reader = BufReader::new(file);

    Ok(TailIterator {
        lines: reader.lines(),
        pos: offset,
        file_len,
        path,
    })
}

struct TailIterator<I> {
    lines: I,
    pos: u64,
    file_len: u64,
    path: PathBuf,
}

impl<I: Iterator<Item = io::Result<String>>> Iterator for TailIterator<I> {
    type Item = Result<(LogEntry, u64), ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(ScanError::Read {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };

            let line_bytes = line.len() as u64;

            // Line content reaching exactly EOF means no trailing newline
            // was written yet — leave it for a later read.
            if self.pos + line_bytes >= self.file_len {
                return None;
            }

            let next_pos = self.pos + line_bytes + 1; // +1 for the newline

            if line.is_empty() {
                self.pos = next_pos;
                continue;
            }

            match LogEntry::parse(&line) {
                Ok(entry) => {
                    self.pos = next_pos;
                    return Some(Ok((entry, next_pos)));
                }
                Err(err) => {
                    log::warn!(
                        "{}: skipping malformed line at offset {}: {err}",
                        self.path.display(),
                        self.pos
                    );
                    self.pos = next_pos;
                }
            }
        }
    }
}

/// Block until `path` grows past `offset` or `timeout` elapses.
///
/// Checks the current length up front — data appended before the call is
/// reported immediately, with no window for a missed notification. A
/// file that does not exist yet counts as length zero, so a tail can be
/// started before the day's log file is first written.
///
/// Built on OS file notifications rather than polling; spurious wakeups
/// re-check the length and go back to waiting.
///
/// # Errors
///
/// Returns [`ScanError::Watch`] if the watch cannot be established and
/// [`ScanError::Read`] if the file length cannot be queried.
pub fn wait_for_entries(
    path: impl AsRef<Path>,
    offset: u64,
    timeout: Duration,
) -> Result<WaitResult, ScanError> {
    let path = path.as_ref();
    // Watch the parent so creation and rotation of the file itself are seen.
    let watch_root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(tx).map_err(|source| ScanError::Watch {
        path: path.to_path_buf(),
        source,
    })?;
    watcher
        .watch(watch_root, RecursiveMode::NonRecursive)
        .map_err(|source| ScanError::Watch {
            path: path.to_path_buf(),
            source,
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        let len = file_len(path)?;
        if len > offset {
            return Ok(WaitResult::NewData(len));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitResult::Timeout);
        }

        match rx.recv_timeout(deadline - now) {
            Ok(Ok(_event)) => {} // re-check the length
            Ok(Err(err)) => {
                log::warn!("watch error on {}: {err}", path.display());
            }
            Err(mpsc::RecvTimeoutError::Timeout) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                // One final check covers growth racing the timeout.
                let len = file_len(path)?;
                if len > offset {
                    return Ok(WaitResult::NewData(len));
                }
                return Ok(WaitResult::Timeout);
            }
        }
    }
}

fn file_len(path: &Path) -> Result<u64, ScanError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(source) => Err(ScanError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
