//! Line-based text source.
//!
//! Each record is one line of UTF-8 text without its `\n` or `\r\n` terminator. The final
//! line may lack a terminator. Empty lines are records too.

use crate::channel::ByteChannel;
use crate::config::ReadOptions;
use crate::error::{Result, SourceError};
use crate::source::coder::{Coder, StringUtf8Coder};
use crate::source::file_based::{FileBasedReader, FileBasedSource, FileRange};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Newline-delimited text files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    range: FileRange,
}

impl TextSource {
    /// Smallest byte range worth handing to a separate reader
    pub const DEFAULT_MIN_BUNDLE_SIZE: u64 = 64 * 1024;

    /// Source over every file matched by `file_or_pattern_spec`
    pub fn from(file_or_pattern_spec: impl Into<String>) -> Self {
        Self {
            range: FileRange::for_pattern(file_or_pattern_spec, Self::DEFAULT_MIN_BUNDLE_SIZE),
        }
    }
}

impl FileBasedSource for TextSource {
    type Item = String;
    type Reader = TextReader;

    fn range(&self) -> &FileRange {
        &self.range
    }

    fn validate(&self) -> Result<()> {
        self.range.validate()
    }

    fn create_for_subrange_of_file(&self, file_name: &str, start: u64, end: u64) -> Result<Self> {
        Ok(Self {
            range: FileRange::for_subrange(file_name, self.range.min_bundle_size(), start, end),
        })
    }

    fn create_single_file_reader(&self, options: &ReadOptions) -> Result<TextReader> {
        Ok(TextReader::new(
            self.range.start_offset(),
            options.buffer_capacity,
        ))
    }

    fn produces_sorted_keys(&self, _options: &ReadOptions) -> Result<bool> {
        Ok(false)
    }

    fn default_output_coder(&self) -> Arc<dyn Coder<String>> {
        Arc::new(StringUtf8Coder)
    }
}

/// Reads lines from a channel, tracking the byte offset of each line
pub struct TextReader {
    start_offset: u64,
    buffer_capacity: usize,
    channel: Option<BufReader<ByteChannel>>,
    line: Vec<u8>,
    current: Option<String>,
    current_offset: u64,
    next_offset: u64,
    exhausted: bool,
}

impl TextReader {
    /// Reader for a range starting at `start_offset`.
    ///
    /// For a nonzero start the channel handed to `start_reading` must be positioned one byte
    /// before the range; the reader skips through the first line terminator so that only
    /// lines starting inside the range are returned.
    pub fn new(start_offset: u64, buffer_capacity: usize) -> Self {
        Self {
            start_offset,
            buffer_capacity,
            channel: None,
            line: Vec::new(),
            current: None,
            current_offset: 0,
            next_offset: 0,
            exhausted: false,
        }
    }
}

#[async_trait]
impl FileBasedReader for TextReader {
    type Item = String;

    async fn start_reading(&mut self, channel: ByteChannel) -> Result<()> {
        if self.channel.is_some() {
            return Err(SourceError::illegal_state("TextReader was already started"));
        }

        let mut reader = BufReader::with_capacity(self.buffer_capacity.max(1), channel);
        self.next_offset = self.start_offset;

        if self.start_offset > 0 {
            let mut skipped = Vec::new();
            let n = reader
                .read_until(b'\n', &mut skipped)
                .await
                .map_err(|e| SourceError::file_error("Failed to skip partial line", e))?;
            self.next_offset = self.start_offset - 1 + n as u64;
        }

        self.channel = Some(reader);
        Ok(())
    }

    async fn read_next_record(&mut self) -> Result<bool> {
        let reader = self.channel.as_mut().ok_or_else(|| {
            SourceError::illegal_state("read_next_record called before start_reading")
        })?;
        if self.exhausted {
            return Ok(false);
        }

        self.line.clear();
        let n = reader
            .read_until(b'\n', &mut self.line)
            .await
            .map_err(|e| SourceError::file_error("Failed to read line", e))?;
        if n == 0 {
            self.exhausted = true;
            self.current = None;
            return Ok(false);
        }

        self.current_offset = self.next_offset;
        self.next_offset += n as u64;

        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        }

        let text = String::from_utf8(std::mem::take(&mut self.line)).map_err(|e| {
            SourceError::file_error(
                format!("Line at offset {} is not valid UTF-8", self.current_offset),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        self.current = Some(text);
        Ok(true)
    }

    fn current(&self) -> Result<&String> {
        self.current
            .as_ref()
            .ok_or_else(|| SourceError::no_such_element("TextReader has no current line"))
    }

    fn current_offset(&self) -> u64 {
        self.current_offset
    }
}
