//! File validation utilities for ensuring files can be opened before reading.

use crate::error::{Result, SourceError};
use std::path::Path;
use tokio::fs::{self, File};

/// Validate that a concrete file path is accessible and suitable for reading
///
/// # Validations Performed
/// - Path exists
/// - Path is a regular file (not a directory)
/// - File is readable by the current process
///
/// Empty files are accepted: an empty plain file simply has no records, and an empty
/// compressed file fails with a codec error when its reader starts.
pub async fn validate_file_path(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(SourceError::file_error("Failed to read file metadata", e)),
    };

    if !metadata.is_file() {
        return Err(SourceError::file_error(
            format!("Path is not a file: {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Not a file"),
        ));
    }

    // Try to open the file to verify read permissions
    File::open(path)
        .await
        .map_err(|e| SourceError::file_error("Cannot open file for reading", e))?;

    Ok(())
}
