//! File-based sources and readers, including the compressed source.
//!
//! This module provides the source/reader abstraction the read entry point drives, the
//! [`CompressedSource`] that layers decompression over any other source, and a line-based
//! [`TextSource`] for newline-delimited files.

pub mod coder;
pub mod compressed;
pub mod driver;
pub mod file_based;
pub mod pattern;
pub mod text;
pub mod validation;

// Re-export public API
pub use coder::{Coder, StringUtf8Coder};
pub use compressed::{CompressedReader, CompressedSource, ReaderState};
pub use driver::BoundedFileReader;
pub use file_based::{FileBasedReader, FileBasedSource, FileRange, RangeMode};
pub use pattern::expand_file_pattern;
pub use text::{TextReader, TextSource};
pub use validation::validate_file_path;
