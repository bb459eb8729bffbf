use crate::dataset::{CancelToken, Checkpoint, DatasetReader};
use crate::error::QueryError;
use crate::index::types::Ordinal;
use crate::record::{Entry, parse_line};
use std::path::Path;

/// Lazy reader over the entries whose ordinals fall in `[start, end)`.
///
/// The file is closed as soon as the last entry of the range has been
/// produced, at end of file, or on the first error. The reader is not
/// restartable.
pub struct RangeReader {
    reader: Option<DatasetReader>,
    start: Ordinal,
    end: Ordinal,
}

impl RangeReader {
    /// Read `[start, end)` streaming from the beginning of the file
    pub fn open(path: &Path, start: Ordinal, end: Ordinal) -> Result<Self, QueryError> {
        Self::open_at(path, Checkpoint::START, start, end)
    }

    /// Read `[start, end)` after seeking to `checkpoint`, which must not lie
    /// past `start`. An empty range never touches the file.
    pub fn open_at(
        path: &Path,
        checkpoint: Checkpoint,
        start: Ordinal,
        end: Ordinal,
    ) -> Result<Self, QueryError> {
        if start >= end {
            return Ok(Self {
                reader: None,
                start,
                end,
            });
        }

        let checkpoint = if checkpoint.ordinal <= start {
            checkpoint
        } else {
            Checkpoint::START
        };

        Ok(Self {
            reader: Some(DatasetReader::open_at(path, checkpoint)?),
            start,
            end,
        })
    }

    /// Stop with [`QueryError::Cancelled`] once `token` fires
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.reader = self.reader.map(|r| r.with_cancel(token));
        self
    }

    /// True once the underlying file has been released
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl Iterator for RangeReader {
    type Item = Result<Entry, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        match next_in_range(reader, self.start, self.end) {
            Ok(Some(entry)) => {
                if reader.next_ordinal() >= self.end {
                    self.reader = None;
                }
                Some(Ok(entry))
            }
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}

fn next_in_range(
    reader: &mut DatasetReader,
    start: Ordinal,
    end: Ordinal,
) -> Result<Option<Entry>, QueryError> {
    reader.skip_to(start)?;
    loop {
        if reader.next_ordinal() >= end {
            return Ok(None);
        }
        let Some(line) = reader.next_line()? else {
            return Ok(None);
        };
        if let Some(entry) = parse_line(line.text, line.ordinal + 1) {
            return Ok(Some(entry));
        }
    }
}

/// Collect `[start, end)` into memory
pub fn read_range(path: &Path, start: Ordinal, end: Ordinal) -> Result<Vec<Entry>, QueryError> {
    RangeReader::open(path, start, end)?.collect()
}
