//! # compressed-source - Transparent Decompression for File-Based Sources
//!
//! Reads compressed files through any file-based source that understands the
//! decompressed format. The codec is chosen from the file name (`.gz`, `.bz2`) or set
//! explicitly, and the decompressed bytes are handed to the inner reader.
//!
//! ## Features
//!
//! - **Codec dispatch**: gzip and bzip2 by file suffix, uncompressed otherwise
//! - **Custom codecs**: any [`DecompressingChannelFactory`] can be plugged in
//! - **Whole-file reading**: compressed files are never split and always start at offset 0
//! - **Line-based source**: [`TextSource`] for newline-delimited text
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`channel`] - Byte channels passed between layers
//! - [`decompression`] - Decompression strategies
//! - [`source`] - Source/reader abstraction, compressed source, text source
//! - [`read`] - Bounded read entry point
//! - [`config`] - Read options

// Core modules
pub mod channel;
pub mod config;
pub mod error;

// Components
pub mod decompression;
pub mod read;
pub mod source;

// Re-export commonly used types for convenience
pub use error::{Result, SourceError};

// Public API surface for external usage
pub use config::{CompressionSetting, ReadOptions};
pub use decompression::{
    CompressionMode, DecompressByFilename, DecompressingChannelFactory,
    FileNameBasedDecompressingChannelFactory,
};
pub use read::{BoundedRead, Read};
pub use source::{
    CompressedReader, CompressedSource, FileBasedReader, FileBasedSource, TextSource,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
