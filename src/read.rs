//! Bounded read entry point.
//!
//! A [`BoundedRead`] binds a source to the options used to read it. Executing it validates
//! the source, expands its file pattern and reads every file in order, one whole-file
//! reader per file.

use crate::config::ReadOptions;
use crate::error::Result;
use crate::source::coder::Coder;
use crate::source::driver::BoundedFileReader;
use crate::source::file_based::{FileBasedSource, FileRange};
use crate::source::pattern::expand_file_pattern;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Entry point for building bounded reads
pub struct Read;

impl Read {
    pub fn from<S: FileBasedSource>(source: S) -> BoundedRead<S> {
        BoundedRead {
            source,
            options: ReadOptions::default(),
        }
    }
}

/// A configured, ready-to-execute read of a bounded source
#[derive(Debug, Clone)]
pub struct BoundedRead<S> {
    source: S,
    options: ReadOptions,
}

impl<S: FileBasedSource> BoundedRead<S> {
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn output_coder(&self) -> Arc<dyn Coder<S::Item>> {
        self.source.default_output_coder()
    }

    /// Read every record of every file matched by the source
    pub async fn execute(&self) -> Result<Vec<S::Item>>
    where
        S::Item: Clone,
    {
        let files = self.prepare().await?;
        let mut records = Vec::new();

        for file in files {
            let mut reader = self.open_file(&file)?;
            while reader.next_record().await? {
                records.push(reader.current()?.clone());
            }
            log::debug!(
                "read {} records from {}",
                reader.records_returned(),
                file.display()
            );
        }

        Ok(records)
    }

    /// The same records as [`execute`](Self::execute), produced lazily
    pub fn into_stream(self) -> impl Stream<Item = Result<S::Item>>
    where
        S::Item: Clone,
    {
        let state = StreamState {
            read: self,
            pending: None,
            current: None,
        };

        stream::try_unfold(state, next_streamed)
    }

    async fn prepare(&self) -> Result<Vec<PathBuf>> {
        self.options.validate()?;
        self.source.validate()?;
        expand_file_pattern(self.source.file_or_pattern_spec()).await
    }

    fn open_file(&self, file: &Path) -> Result<BoundedFileReader<S::Reader>> {
        let file_name = file.to_string_lossy();
        let single = self.source.create_for_subrange_of_file(
            &file_name,
            0,
            FileRange::WHOLE_FILE_END,
        )?;
        single.validate()?;
        let reader = single.create_single_file_reader(&self.options)?;
        Ok(BoundedFileReader::new(reader, single.range()))
    }
}

struct StreamState<S: FileBasedSource> {
    read: BoundedRead<S>,
    pending: Option<VecDeque<PathBuf>>,
    current: Option<BoundedFileReader<S::Reader>>,
}

async fn next_streamed<S>(mut state: StreamState<S>) -> Result<Option<(S::Item, StreamState<S>)>>
where
    S: FileBasedSource,
    S::Item: Clone,
{
    loop {
        if state.pending.is_none() {
            state.pending = Some(state.read.prepare().await?.into());
        }

        if let Some(reader) = state.current.as_mut() {
            let item = if reader.next_record().await? {
                Some(reader.current()?.clone())
            } else {
                None
            };
            match item {
                Some(item) => return Ok(Some((item, state))),
                None => state.current = None,
            }
        }

        match state.pending.as_mut().and_then(VecDeque::pop_front) {
            Some(file) => state.current = Some(state.read.open_file(&file)?),
            None => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompression::CompressionMode;
    use crate::error::SourceError;
    use crate::source::compressed::CompressedSource;
    use crate::source::text::TextSource;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_execute_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"x\n").unwrap();

        let read = Read::from(CompressedSource::from(TextSource::from(
            path.to_string_lossy(),
        )));
        assert_eq!(read.execute().await.unwrap(), vec!["x".to_string()]);
        assert_eq!(read.output_coder().name(), "string-utf8");
    }

    #[tokio::test]
    async fn test_stream_matches_execute() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"1\n2\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"3").unwrap();

        let spec = dir.path().join("*.txt");
        let read = Read::from(TextSource::from(spec.to_string_lossy()));
        let eager = read.execute().await.unwrap();
        let lazy: Vec<String> = read.clone().into_stream().try_collect().await.unwrap();

        assert_eq!(eager, vec!["1", "2", "3"]);
        assert_eq!(lazy, eager);
    }

    #[tokio::test]
    async fn test_invalid_options_fail_before_reading() {
        let read = Read::from(TextSource::from("/no/such/file.txt")).with_options(ReadOptions {
            buffer_capacity: 0,
            ..Default::default()
        });
        assert!(matches!(
            read.execute().await,
            Err(SourceError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_from_source_uses_given_strategy() {
        let read = CompressedSource::read_from_source(
            TextSource::from("unused.txt"),
            Arc::new(CompressionMode::Bzip2),
        );
        assert_eq!(read.source().channel_factory().name(), "bzip2");
        assert_eq!(read.options(), &ReadOptions::default());
    }
}
