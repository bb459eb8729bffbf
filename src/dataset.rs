//! Line source over the raw dataset.
//!
//! The indexer, the range reader and the search scanner all walk the file
//! through [`DatasetReader`], so they agree on which lines count: blank and
//! comment lines are skipped and never receive an ordinal.

use crate::error::QueryError;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Read buffer size; names are short so a large buffer amortizes syscalls
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// How many lines pass between deadline checks
const DEADLINE_CHECK_INTERVAL: u64 = 4096;

/// A position in the dataset: data line `ordinal` starts at byte `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checkpoint {
    pub offset: u64,
    pub ordinal: u64,
}

impl Checkpoint {
    pub const START: Checkpoint = Checkpoint {
        offset: 0,
        ordinal: 0,
    };
}

/// Cooperative cancellation shared between a caller and a running query.
///
/// Cloning shares the flag. A query polls the token before every line read
/// and stops with [`QueryError::Cancelled`] once it fires, closing its file.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also fires once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline_passed()
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// One data line as handed out by [`DatasetReader::next_line`]
#[derive(Debug, Clone, Copy)]
pub struct DataLine<'a> {
    /// 0-based position among data lines
    pub ordinal: u64,
    /// Byte offset of the start of the physical line
    pub offset: u64,
    /// Trimmed line text
    pub text: &'a str,
}

/// Forward-only reader yielding data lines with their ordinals.
///
/// Dropping the reader closes the file; that is how every consumer stops a
/// scan early.
pub struct DatasetReader {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    line: String,
    next_ordinal: u64,
    offset: u64,
    lines_read: u64,
    cancel: Option<CancelToken>,
}

impl DatasetReader {
    /// Open the dataset at its first line
    pub fn open(path: &Path) -> Result<Self, QueryError> {
        Self::open_at(path, Checkpoint::START)
    }

    /// Open the dataset positioned at a checkpoint
    pub fn open_at(path: &Path, checkpoint: Checkpoint) -> Result<Self, QueryError> {
        let mut file = File::open(path).map_err(|e| QueryError::data_source(path, e))?;
        if checkpoint.offset > 0 {
            file.seek(SeekFrom::Start(checkpoint.offset))
                .map_err(|e| QueryError::data_source(path, e))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, file),
            buf: Vec::with_capacity(128),
            line: String::with_capacity(128),
            next_ordinal: checkpoint.ordinal,
            offset: checkpoint.offset,
            lines_read: 0,
            cancel: None,
        })
    }

    /// Poll `token` before each line read
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Ordinal the next data line will receive
    pub fn next_ordinal(&self) -> u64 {
        self.next_ordinal
    }

    /// Advance to the next data line. Returns `Ok(None)` at end of file.
    pub fn next_line(&mut self) -> Result<Option<DataLine<'_>>, QueryError> {
        loop {
            self.check_cancelled()?;

            self.buf.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .map_err(|e| QueryError::data_source(&self.path, e))?;
            if n == 0 {
                return Ok(None);
            }

            let line_offset = self.offset;
            self.offset += n as u64;
            self.lines_read += 1;

            // Invalid UTF-8 is kept (lossily) so line counting never depends on encoding
            self.line.clear();
            self.line.push_str(&String::from_utf8_lossy(&self.buf));

            let start = self.line.len() - self.line.trim_start().len();
            let end = self.line.trim_end().len();
            if start >= end || self.line[start..end].starts_with(crate::record::COMMENT_MARKER) {
                continue;
            }

            let ordinal = self.next_ordinal;
            self.next_ordinal += 1;

            return Ok(Some(DataLine {
                ordinal,
                offset: line_offset,
                text: &self.line[start..end],
            }));
        }
    }

    /// Skip data lines until the next one would have ordinal `target`.
    pub fn skip_to(&mut self, target: u64) -> Result<(), QueryError> {
        while self.next_ordinal < target {
            if self.next_line()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), QueryError> {
        if let Some(token) = &self.cancel {
            if token.flag.load(Ordering::Relaxed) {
                return Err(QueryError::Cancelled);
            }
            if self.lines_read % DEADLINE_CHECK_INTERVAL == 0 && token.deadline_passed() {
                return Err(QueryError::Cancelled);
            }
        }
        Ok(())
    }
}
