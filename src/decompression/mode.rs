//! Built-in codecs recognised by file extension.

use crate::channel::{channel_from, ByteChannel};
use crate::decompression::DecompressingChannelFactory;
use crate::error::{Result, SourceError};
use async_compression::tokio::bufread::{BzDecoder, GzipDecoder};
use async_trait::async_trait;
use std::io::Cursor;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

/// Default compression types supported by compressed sources.
///
/// Declaration order is the dispatch order used by [`DecompressByFilename`](super::DecompressByFilename).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMode {
    /// Gzip compression (.gz files)
    Gzip,
    /// Bzip2 compression (.bz2 files)
    Bzip2,
}

impl CompressionMode {
    /// All built-in modes, in dispatch order
    pub const ALL: [CompressionMode; 2] = [CompressionMode::Gzip, CompressionMode::Bzip2];

    /// Get human-readable name for the compression type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }

    /// Lowercase file suffix, including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
        }
    }

    /// Leading bytes every stream of this codec starts with
    ///
    /// - Gzip: `1f 8b` (RFC 1952)
    /// - Bzip2: `42 5a 68` ("BZh", followed by the block size digit)
    fn magic(&self) -> &'static [u8] {
        match self {
            Self::Gzip => &[0x1f, 0x8b],
            Self::Bzip2 => &[0x42, 0x5a, 0x68],
        }
    }

    /// Returns true if the file name implies this compression. Case-insensitive.
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.to_lowercase().ends_with(self.extension())
    }

    /// First mode, in declaration order, whose suffix matches `file_name`
    pub fn for_file_name(file_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.matches(file_name))
    }
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait]
impl DecompressingChannelFactory for CompressionMode {
    async fn create_decompressing_channel(&self, channel: ByteChannel) -> Result<ByteChannel> {
        let mut reader = BufReader::new(channel);
        let header = match self {
            Self::Gzip => read_gzip_header(&mut reader).await?,
            Self::Bzip2 => read_bzip2_header(&mut reader).await?,
        };

        // Put the consumed header back in front of the rest of the stream
        let restored = Cursor::new(header).chain(reader);
        let decoded = match self {
            Self::Gzip => {
                let mut decoder = GzipDecoder::new(restored);
                decoder.multiple_members(true);
                channel_from(decoder)
            }
            Self::Bzip2 => channel_from(BzDecoder::new(restored)),
        };

        log::debug!("wrapped channel in {} decoder", self.name());
        Ok(decoded)
    }

    fn name(&self) -> &'static str {
        CompressionMode::name(self)
    }
}

type HeaderReader = BufReader<ByteChannel>;

// RFC 1952 member header
const GZIP_FIXED_HEADER_LEN: usize = 10;
const GZIP_METHOD_DEFLATE: u8 = 8;
const GZIP_FHCRC: u8 = 0x02;
const GZIP_FEXTRA: u8 = 0x04;
const GZIP_FNAME: u8 = 0x08;
const GZIP_FCOMMENT: u8 = 0x10;
const GZIP_FRESERVED: u8 = 0xe0;

/// Consume and check a gzip member header, including the optional fields its flags announce
async fn read_gzip_header(reader: &mut HeaderReader) -> Result<Vec<u8>> {
    let mode = CompressionMode::Gzip;
    let mut header = Vec::with_capacity(GZIP_FIXED_HEADER_LEN);
    read_magic(reader, &mut header, mode).await?;
    let remaining = GZIP_FIXED_HEADER_LEN - header.len();
    read_field(reader, &mut header, remaining, mode).await?;

    let method = header[2];
    if method != GZIP_METHOD_DEFLATE {
        return Err(malformed(
            mode,
            format!("unsupported compression method {method}"),
        ));
    }
    let flags = header[3];
    if flags & GZIP_FRESERVED != 0 {
        return Err(malformed(mode, format!("reserved flag bits set in {flags:#04x}")));
    }

    if flags & GZIP_FEXTRA != 0 {
        read_field(reader, &mut header, 2, mode).await?;
        let n = header.len();
        let extra_len = u16::from_le_bytes([header[n - 2], header[n - 1]]);
        read_field(reader, &mut header, usize::from(extra_len), mode).await?;
    }
    if flags & GZIP_FNAME != 0 {
        read_zero_terminated(reader, &mut header, mode).await?;
    }
    if flags & GZIP_FCOMMENT != 0 {
        read_zero_terminated(reader, &mut header, mode).await?;
    }
    if flags & GZIP_FHCRC != 0 {
        read_field(reader, &mut header, 2, mode).await?;
    }

    Ok(header)
}

/// Consume and check `BZh` plus the block size digit
async fn read_bzip2_header(reader: &mut HeaderReader) -> Result<Vec<u8>> {
    let mode = CompressionMode::Bzip2;
    let mut header = Vec::with_capacity(4);
    read_magic(reader, &mut header, mode).await?;
    read_field(reader, &mut header, 1, mode).await?;

    let level = header[3];
    if !(b'1'..=b'9').contains(&level) {
        return Err(malformed(
            mode,
            format!("block size {:?} is not in 1-9", char::from(level)),
        ));
    }
    Ok(header)
}

async fn read_magic(
    reader: &mut HeaderReader,
    header: &mut Vec<u8>,
    mode: CompressionMode,
) -> Result<()> {
    let magic = mode.magic();
    (&mut *reader)
        .take(magic.len() as u64)
        .read_to_end(header)
        .await
        .map_err(|e| header_io_error(mode, e))?;

    if header.as_slice() == magic {
        Ok(())
    } else if magic.starts_with(header.as_slice()) {
        Err(truncated(mode))
    } else {
        Err(SourceError::file_error(
            format!("Input is not a {} stream", mode.name()),
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unexpected magic bytes {:02x?}", header),
            ),
        ))
    }
}

/// Append exactly `len` bytes to `header`
async fn read_field(
    reader: &mut HeaderReader,
    header: &mut Vec<u8>,
    len: usize,
    mode: CompressionMode,
) -> Result<()> {
    let n = (&mut *reader)
        .take(len as u64)
        .read_to_end(header)
        .await
        .map_err(|e| header_io_error(mode, e))?;
    if n < len {
        return Err(truncated(mode));
    }
    Ok(())
}

/// Append a NUL-terminated header string, terminator included
async fn read_zero_terminated(
    reader: &mut HeaderReader,
    header: &mut Vec<u8>,
    mode: CompressionMode,
) -> Result<()> {
    reader
        .read_until(0, header)
        .await
        .map_err(|e| header_io_error(mode, e))?;
    if header.last() != Some(&0) {
        return Err(truncated(mode));
    }
    Ok(())
}

fn header_io_error(mode: CompressionMode, source: std::io::Error) -> SourceError {
    SourceError::file_error(format!("Failed to read {} header", mode.name()), source)
}

fn truncated(mode: CompressionMode) -> SourceError {
    SourceError::file_error(
        format!("Truncated {} header", mode.name()),
        std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stream ended inside the header",
        ),
    )
}

fn malformed(mode: CompressionMode, detail: String) -> SourceError {
    SourceError::file_error(
        format!("Invalid {} header", mode.name()),
        std::io::Error::new(std::io::ErrorKind::InvalidData, detail),
    )
}
