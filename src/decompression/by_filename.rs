//! Strategy that selects a codec from the file name.

use crate::channel::ByteChannel;
use crate::decompression::{
    CompressionMode, DecompressingChannelFactory, FileNameBasedDecompressingChannelFactory,
};
use crate::error::{Result, SourceError};
use async_trait::async_trait;

/// Detects compression from the file name. A name that matches no [`CompressionMode`] is
/// presumed to be uncompressed and its channel is returned as-is.
///
/// This strategy cannot work without the file name: the name-unaware entry point always
/// fails with [`SourceError::UnsupportedOperation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompressByFilename;

#[async_trait]
impl DecompressingChannelFactory for DecompressByFilename {
    async fn create_decompressing_channel(&self, _channel: ByteChannel) -> Result<ByteChannel> {
        Err(SourceError::unsupported(
            "DecompressByFilename does not support create_decompressing_channel(channel) \
             but only create_decompressing_channel_for_file(file_name, channel)",
        ))
    }

    fn as_file_name_based(&self) -> Option<&dyn FileNameBasedDecompressingChannelFactory> {
        Some(self)
    }

    fn name(&self) -> &'static str {
        "by-filename"
    }
}

#[async_trait]
impl FileNameBasedDecompressingChannelFactory for DecompressByFilename {
    async fn create_decompressing_channel_for_file(
        &self,
        file_name: &str,
        channel: ByteChannel,
    ) -> Result<ByteChannel> {
        match CompressionMode::for_file_name(file_name) {
            Some(mode) => {
                log::debug!("{} selected for {}", mode, file_name);
                mode.create_decompressing_channel(channel).await
            }
            None => {
                log::debug!("no codec matches {}, reading uncompressed", file_name);
                Ok(channel)
            }
        }
    }
}
