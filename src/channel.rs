//! Byte channels handed between the file layer, decompression strategies and readers.

use crate::error::{Result, SourceError};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt};

/// Sequential byte stream. Owned by whichever reader consumes it; dropping it releases the
/// underlying file handle.
pub type ByteChannel = Box<dyn AsyncRead + Send + Unpin>;

/// Wrap any owned async reader as a channel
pub fn channel_from<R>(reader: R) -> ByteChannel
where
    R: AsyncRead + Send + Unpin + 'static,
{
    Box::new(reader)
}

/// Open `path` for reading and position it at `start_offset`
pub async fn open_file_channel(path: &Path, start_offset: u64) -> Result<ByteChannel> {
    let mut file = File::open(path).await.map_err(|e| {
        SourceError::file_error(format!("Failed to open file: {}", path.display()), e)
    })?;

    if start_offset > 0 {
        file.seek(SeekFrom::Start(start_offset)).await.map_err(|e| {
            SourceError::file_error(
                format!("Failed to seek to {} in {}", start_offset, path.display()),
                e,
            )
        })?;
    }

    log::trace!("opened channel for {} at offset {}", path.display(), start_offset);
    Ok(channel_from(file))
}
