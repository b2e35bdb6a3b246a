//! Drives a [`FileBasedReader`] over one file range.

use crate::channel::open_file_channel;
use crate::error::{Result, SourceError};
use crate::source::file_based::{FileBasedReader, FileRange};
use std::path::{Path, PathBuf};

/// Opens the file behind a single-file range, starts the reader on it and stops at the
/// first split point at or past the end of the range.
///
/// Records that are not at a split point are always returned, which is how an
/// unsplittable reader keeps the whole file in one range.
pub struct BoundedFileReader<R> {
    reader: R,
    path: PathBuf,
    start_offset: u64,
    end_offset: u64,
    started: bool,
    done: bool,
    last_split_offset: Option<u64>,
    records_returned: u64,
}

impl<R: FileBasedReader> BoundedFileReader<R> {
    pub fn new(reader: R, range: &FileRange) -> Self {
        Self {
            reader,
            path: PathBuf::from(range.file_or_pattern_spec()),
            start_offset: range.start_offset(),
            end_offset: range.end_offset(),
            started: false,
            done: false,
            last_split_offset: None,
            records_returned: 0,
        }
    }

    /// Open the file and read the first record. Returns false if the range is empty.
    pub async fn start(&mut self) -> Result<bool> {
        if self.started {
            return Err(SourceError::illegal_state(format!(
                "Reader for {} was already started",
                self.path.display()
            )));
        }
        self.started = true;

        // One byte early so the reader can tell whether the range starts on a record boundary
        let channel = open_file_channel(&self.path, self.start_offset.saturating_sub(1)).await?;
        self.reader.start_reading(channel).await?;
        self.advance_within_range().await
    }

    /// Read the next record. Returns false once the range is finished.
    pub async fn advance(&mut self) -> Result<bool> {
        if !self.started {
            return Err(SourceError::illegal_state(
                "advance called before start",
            ));
        }
        self.advance_within_range().await
    }

    /// `start` on the first call, `advance` afterwards
    pub async fn next_record(&mut self) -> Result<bool> {
        if self.started {
            self.advance().await
        } else {
            self.start().await
        }
    }

    async fn advance_within_range(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if !self.reader.read_next_record().await? {
            self.done = true;
            return Ok(false);
        }

        if self.reader.is_at_split_point() {
            let offset = self.reader.current_offset();
            if let Some(last) = self.last_split_offset {
                if offset < last {
                    return Err(SourceError::illegal_state(format!(
                        "Split point offset {} in {} is before previous split point {}",
                        offset,
                        self.path.display(),
                        last
                    )));
                }
            }
            if offset >= self.end_offset {
                log::trace!("{} reached end of range at {}", self.path.display(), offset);
                self.done = true;
                return Ok(false);
            }
            self.last_split_offset = Some(offset);
        } else if self.last_split_offset.is_none() {
            return Err(SourceError::illegal_state(format!(
                "First record of {} is not at a split point",
                self.path.display()
            )));
        }

        self.records_returned += 1;
        Ok(true)
    }

    pub fn current(&self) -> Result<&R::Item> {
        if !self.started || self.done {
            return Err(SourceError::no_such_element(format!(
                "No current record in {}",
                self.path.display()
            )));
        }
        self.reader.current()
    }

    pub fn current_offset(&self) -> u64 {
        self.reader.current_offset()
    }

    pub fn records_returned(&self) -> u64 {
        self.records_returned
    }

    /// The wrapped reader
    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
