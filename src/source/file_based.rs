//! Core file-based source and reader abstraction.
//!
//! [`FileBasedSource`] describes a file (or file pattern) and how to read it;
//! [`FileBasedReader`] turns one opened byte channel into a sequence of records. The
//! [`BoundedFileReader`](crate::source::BoundedFileReader) drives a reader over its range.

use crate::channel::ByteChannel;
use crate::config::ReadOptions;
use crate::error::{Result, SourceError};
use crate::source::coder::Coder;
use crate::source::pattern::is_wildcard;
use async_trait::async_trait;
use std::sync::Arc;

/// How a [`FileRange`] addresses its files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// The spec may be a pattern; the range always covers whole files
    FilePattern,
    /// The spec names exactly one file, possibly restricted to a byte range
    SingleFileOrSubrange,
}

/// File spec plus the byte range `[start_offset, end_offset)` a source covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRange {
    file_or_pattern_spec: String,
    mode: RangeMode,
    min_bundle_size: u64,
    start_offset: u64,
    end_offset: u64,
}

impl FileRange {
    /// End offset meaning "until the end of the file"
    pub const WHOLE_FILE_END: u64 = u64::MAX;

    /// Range over every file matched by `spec`
    pub fn for_pattern(spec: impl Into<String>, min_bundle_size: u64) -> Self {
        Self {
            file_or_pattern_spec: spec.into(),
            mode: RangeMode::FilePattern,
            min_bundle_size,
            start_offset: 0,
            end_offset: Self::WHOLE_FILE_END,
        }
    }

    /// Range over `[start_offset, end_offset)` of a single file
    pub fn for_subrange(
        file_name: impl Into<String>,
        min_bundle_size: u64,
        start_offset: u64,
        end_offset: u64,
    ) -> Self {
        Self {
            file_or_pattern_spec: file_name.into(),
            mode: RangeMode::SingleFileOrSubrange,
            min_bundle_size,
            start_offset,
            end_offset,
        }
    }

    pub fn file_or_pattern_spec(&self) -> &str {
        &self.file_or_pattern_spec
    }

    pub fn mode(&self) -> RangeMode {
        self.mode
    }

    pub fn min_bundle_size(&self) -> u64 {
        self.min_bundle_size
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    pub fn end_offset(&self) -> u64 {
        self.end_offset
    }

    /// Structural checks shared by every file-based source
    pub fn validate(&self) -> Result<()> {
        if self.file_or_pattern_spec.is_empty() {
            return Err(SourceError::invalid_configuration(
                "File or pattern spec must not be empty",
            ));
        }
        if self.start_offset > self.end_offset {
            return Err(SourceError::invalid_configuration(format!(
                "Start offset {} is after end offset {}",
                self.start_offset, self.end_offset
            )));
        }

        match self.mode {
            RangeMode::FilePattern => {
                if self.start_offset != 0 || self.end_offset != Self::WHOLE_FILE_END {
                    return Err(SourceError::invalid_configuration(format!(
                        "A file pattern source must cover whole files, got [{}, {})",
                        self.start_offset, self.end_offset
                    )));
                }
            }
            RangeMode::SingleFileOrSubrange => {
                if is_wildcard(&self.file_or_pattern_spec) {
                    return Err(SourceError::invalid_configuration(format!(
                        "A single-file source must not use a pattern: {}",
                        self.file_or_pattern_spec
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A source of records read from one file or a set of files.
///
/// Implementations own their [`FileRange`] and know how to build a reader for a single
/// concrete file. File-pattern expansion and reader driving live outside the source.
pub trait FileBasedSource: Send + Sync + Sized {
    /// Record type produced by this source
    type Item: Send + 'static;
    /// Reader type for a single file
    type Reader: FileBasedReader<Item = Self::Item>;

    /// The files and byte range this source covers
    fn range(&self) -> &FileRange;

    fn file_or_pattern_spec(&self) -> &str {
        self.range().file_or_pattern_spec()
    }

    /// Check the source is usable before any file is opened
    fn validate(&self) -> Result<()>;

    /// Whether a single file may be divided into independently readable byte ranges
    fn is_splittable(&self) -> bool {
        true
    }

    /// Source for `[start, end)` of one concrete file
    fn create_for_subrange_of_file(&self, file_name: &str, start: u64, end: u64)
        -> Result<Self>;

    /// Reader for the single file this source addresses
    fn create_single_file_reader(&self, options: &ReadOptions) -> Result<Self::Reader>;

    fn produces_sorted_keys(&self, options: &ReadOptions) -> Result<bool>;

    /// Coder for the records this source produces
    fn default_output_coder(&self) -> Arc<dyn Coder<Self::Item>>;
}

/// Reads records from one byte channel.
///
/// A reader is owned and driven by a single task: `start_reading` once, then
/// `read_next_record` until it returns `false`.
#[async_trait]
pub trait FileBasedReader: Send {
    type Item: Send;

    /// Take ownership of the channel and prepare to read the first record
    async fn start_reading(&mut self, channel: ByteChannel) -> Result<()>;

    /// Advance to the next record. `Ok(false)` means there are no more records.
    async fn read_next_record(&mut self) -> Result<bool>;

    /// The record produced by the last successful `read_next_record`
    fn current(&self) -> Result<&Self::Item>;

    /// Offset of the current record in the stream the reader consumes
    fn current_offset(&self) -> u64;

    /// Whether the current record may start a new range
    fn is_at_split_point(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_range_covers_whole_files() {
        let range = FileRange::for_pattern("logs/*.gz", 1024);
        assert_eq!(range.mode(), RangeMode::FilePattern);
        assert_eq!(range.start_offset(), 0);
        assert_eq!(range.end_offset(), FileRange::WHOLE_FILE_END);
        assert!(range.validate().is_ok());
    }

    #[test]
    fn test_empty_spec_is_invalid() {
        let range = FileRange::for_pattern("", 1);
        assert!(matches!(
            range.validate(),
            Err(SourceError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        let range = FileRange::for_subrange("a.txt", 1, 10, 5);
        assert!(matches!(
            range.validate(),
            Err(SourceError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_subrange_rejects_wildcards() {
        let range = FileRange::for_subrange("logs/*.txt", 1, 0, 100);
        assert!(range.validate().is_err());

        let range = FileRange::for_subrange("logs/a.txt", 1, 0, 100);
        assert!(range.validate().is_ok());
    }
}
