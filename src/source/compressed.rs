//! Sources that read compressed files through a delegate source.
//!
//! A [`CompressedSource`] wraps a delegate [`FileBasedSource`] that can read the
//! decompressed file format. For example, to read gzip-compressed text:
//!
//! ```ignore
//! let source = CompressedSource::from(TextSource::from("logs/*.txt.gz"))
//!     .with_decompression(Arc::new(CompressionMode::Gzip));
//! let lines = Read::from(source).execute().await?;
//! ```
//!
//! By default the codec is chosen from the file name: `.gz` means gzip, `.bz2` means
//! bzip2, and anything else is read uncompressed.
//!
//! Compressed files cannot be split. Each file is read from offset 0 by exactly one
//! [`CompressedReader`], which decompresses once when it is started.

use crate::channel::ByteChannel;
use crate::config::ReadOptions;
use crate::decompression::{DecompressByFilename, DecompressingChannelFactory};
use crate::error::{Result, SourceError};
use crate::read::{BoundedRead, Read};
use crate::source::coder::Coder;
use crate::source::file_based::{FileBasedReader, FileBasedSource, FileRange};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A source that decompresses its files before handing them to a delegate source's reader
#[derive(Clone)]
pub struct CompressedSource<S> {
    delegate: S,
    channel_factory: Arc<dyn DecompressingChannelFactory>,
    range: FileRange,
}

impl<S: FileBasedSource> CompressedSource<S> {
    /// Compressed source over `delegate`, choosing the codec from each file name
    pub fn from(delegate: S) -> Self {
        Self::new(delegate, Arc::new(DecompressByFilename))
    }

    /// Bounded read of `delegate` decompressed with `channel_factory`
    pub fn read_from_source(
        delegate: S,
        channel_factory: Arc<dyn DecompressingChannelFactory>,
    ) -> BoundedRead<Self> {
        Read::from(Self::new(delegate, channel_factory))
    }

    /// A source like this one that decompresses with `channel_factory` instead.
    /// `self` is left unchanged.
    pub fn with_decompression(&self, channel_factory: Arc<dyn DecompressingChannelFactory>) -> Self
    where
        S: Clone,
    {
        Self::new(self.delegate.clone(), channel_factory)
    }

    fn new(delegate: S, channel_factory: Arc<dyn DecompressingChannelFactory>) -> Self {
        // Never split automatically
        let range = FileRange::for_pattern(delegate.file_or_pattern_spec(), u64::MAX);
        Self {
            delegate,
            channel_factory,
            range,
        }
    }

    pub fn channel_factory(&self) -> &Arc<dyn DecompressingChannelFactory> {
        &self.channel_factory
    }

    pub fn delegate(&self) -> &S {
        &self.delegate
    }
}

impl<S: FileBasedSource> FileBasedSource for CompressedSource<S> {
    type Item = S::Item;
    type Reader = CompressedReader<S::Reader>;

    fn range(&self) -> &FileRange {
        &self.range
    }

    /// Validates the range, then the delegate source
    fn validate(&self) -> Result<()> {
        self.range.validate()?;
        self.delegate.validate().map_err(|e| {
            SourceError::invalid_configuration(format!("Delegate source is invalid: {e}"))
        })
    }

    /// Compressed files are never splittable
    fn is_splittable(&self) -> bool {
        false
    }

    fn create_for_subrange_of_file(&self, file_name: &str, start: u64, end: u64) -> Result<Self> {
        if start != 0 {
            return Err(SourceError::invalid_argument(format!(
                "Compressed sources must start reading at offset 0. Requested offset: {start}"
            )));
        }
        if end != FileRange::WHOLE_FILE_END {
            log::debug!(
                "end offset {} on compressed file {} only bounds the first record",
                end,
                file_name
            );
        }

        Ok(Self {
            delegate: self.delegate.create_for_subrange_of_file(file_name, start, end)?,
            channel_factory: Arc::clone(&self.channel_factory),
            range: FileRange::for_subrange(file_name, u64::MAX, start, end),
        })
    }

    fn create_single_file_reader(&self, options: &ReadOptions) -> Result<Self::Reader> {
        Ok(CompressedReader::new(
            Arc::clone(&self.channel_factory),
            self.range.file_or_pattern_spec(),
            self.delegate.create_single_file_reader(options)?,
        ))
    }

    fn produces_sorted_keys(&self, options: &ReadOptions) -> Result<bool> {
        self.delegate.produces_sorted_keys(options)
    }

    fn default_output_coder(&self) -> Arc<dyn Coder<S::Item>> {
        self.delegate.default_output_coder()
    }
}

impl<S: fmt::Debug> fmt::Debug for CompressedSource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedSource")
            .field("delegate", &self.delegate)
            .field("channel_factory", &self.channel_factory.name())
            .field("range", &self.range)
            .finish()
    }
}

/// Lifecycle of a [`CompressedReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Created, no channel yet
    Unopened,
    /// Decompressing channel handed to the delegate; records may be read
    Iterating,
    /// The delegate reported no more records
    Exhausted,
    /// A step failed; the reader cannot be used again
    Failed,
}

/// Reader for a [`CompressedSource`]. Decompresses its input and uses a delegate reader to
/// read records from the decompressed stream.
pub struct CompressedReader<R> {
    delegate: R,
    channel_factory: Arc<dyn DecompressingChannelFactory>,
    file_spec: String,
    records_read: u64,
    state: ReaderState,
}

impl<R: FileBasedReader> CompressedReader<R> {
    pub fn new(
        channel_factory: Arc<dyn DecompressingChannelFactory>,
        file_spec: impl Into<String>,
        delegate: R,
    ) -> Self {
        Self {
            delegate,
            channel_factory,
            file_spec: file_spec.into(),
            records_read: 0,
            state: ReaderState::Unopened,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Records successfully read so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    async fn open_delegate(&mut self, channel: ByteChannel) -> Result<()> {
        let decompressed = match self.channel_factory.as_file_name_based() {
            Some(factory) => {
                factory
                    .create_decompressing_channel_for_file(&self.file_spec, channel)
                    .await?
            }
            None => {
                self.channel_factory
                    .create_decompressing_channel(channel)
                    .await?
            }
        };
        self.delegate.start_reading(decompressed).await
    }
}

#[async_trait]
impl<R: FileBasedReader> FileBasedReader for CompressedReader<R> {
    type Item = R::Item;

    /// Decompresses `channel` with the source's strategy and starts the delegate on the
    /// result. Happens once per reader.
    async fn start_reading(&mut self, channel: ByteChannel) -> Result<()> {
        if self.state != ReaderState::Unopened {
            return Err(SourceError::illegal_state(format!(
                "Reader for {} was already started ({:?})",
                self.file_spec, self.state
            )));
        }

        log::debug!(
            "opening {} with {} decompression",
            self.file_spec,
            self.channel_factory.name()
        );
        match self.open_delegate(channel).await {
            Ok(()) => {
                self.state = ReaderState::Iterating;
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to open {}: {}", self.file_spec, e);
                self.state = ReaderState::Failed;
                Err(e)
            }
        }
    }

    async fn read_next_record(&mut self) -> Result<bool> {
        match self.state {
            ReaderState::Unopened => Err(SourceError::illegal_state(
                "read_next_record called before start_reading",
            )),
            ReaderState::Failed => Err(SourceError::illegal_state(format!(
                "Reader for {} has already failed",
                self.file_spec
            ))),
            ReaderState::Exhausted => Ok(false),
            ReaderState::Iterating => match self.delegate.read_next_record().await {
                Ok(true) => {
                    self.records_read += 1;
                    Ok(true)
                }
                Ok(false) => {
                    log::trace!("{} exhausted after {} records", self.file_spec, self.records_read);
                    self.state = ReaderState::Exhausted;
                    Ok(false)
                }
                Err(e) => {
                    self.state = ReaderState::Failed;
                    Err(e)
                }
            },
        }
    }

    fn current(&self) -> Result<&R::Item> {
        if self.records_read == 0 || self.state != ReaderState::Iterating {
            return Err(SourceError::no_such_element(format!(
                "No current record in {} ({:?}, {} records read)",
                self.file_spec, self.state, self.records_read
            )));
        }
        self.delegate.current()
    }

    /// Offset in the decompressed stream, as reported by the delegate
    fn current_offset(&self) -> u64 {
        self.delegate.current_offset()
    }

    /// True only for the first record.
    fn is_at_split_point(&self) -> bool {
        // Neither the state before record 1 nor any later record is a split point
        self.records_read == 1
    }
}
