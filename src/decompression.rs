//! Decompression strategies for compressed sources.
//!
//! A strategy turns a raw byte channel into a channel of decompressed bytes. The built-in
//! [`CompressionMode`] variants each handle one codec; [`DecompressByFilename`] picks one of
//! them from the file name and otherwise passes the channel through unchanged.
//!
//! User-defined codecs implement [`DecompressingChannelFactory`]. Strategies that need the
//! file name additionally implement [`FileNameBasedDecompressingChannelFactory`] and advertise
//! it through [`DecompressingChannelFactory::as_file_name_based`].

pub mod by_filename;
pub mod mode;

pub use by_filename::DecompressByFilename;
pub use mode::CompressionMode;

use crate::channel::ByteChannel;
use crate::error::Result;
use async_trait::async_trait;

/// Creates channels that decompress the content of an underlying channel.
///
/// Implementations are shared between readers and must not change once a source has been
/// built with them.
#[async_trait]
pub trait DecompressingChannelFactory: Send + Sync {
    /// Given a channel, create a channel that decompresses the content read from it.
    ///
    /// Codecs that can validate a header do so here, so malformed input fails at open time
    /// rather than at the first record.
    async fn create_decompressing_channel(&self, channel: ByteChannel) -> Result<ByteChannel>;

    /// Capability query for strategies that dispatch on the file name
    fn as_file_name_based(&self) -> Option<&dyn FileNameBasedDecompressingChannelFactory> {
        None
    }

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Extension of [`DecompressingChannelFactory`] for strategies that need the file name.
#[async_trait]
pub trait FileNameBasedDecompressingChannelFactory: DecompressingChannelFactory {
    /// Given the file name and its raw channel, create a channel of decompressed bytes.
    async fn create_decompressing_channel_for_file(
        &self,
        file_name: &str,
        channel: ByteChannel,
    ) -> Result<ByteChannel>;
}
