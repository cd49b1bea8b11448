//! Flash image persistence
//!
//! The CLI backs the simulated chip with an 8 MiB image file. A
//! missing file means a factory-fresh chip; a file of the wrong size
//! is rejected rather than silently reinterpreted.

use norlog_core::device;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image {path} is {found} bytes, expected {expected}")]
    BadSize {
        path: String,
        found: usize,
        expected: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Load the flash image, or a factory-fresh one when the file is absent
pub fn load(path: &Path) -> Result<Vec<u8>, ImageError> {
    if !path.exists() {
        log::info!("no image at {:?}, starting factory-fresh", path);
        return Ok(vec![device::ERASED_BYTE; device::TOTAL_SIZE as usize]);
    }

    let data = std::fs::read(path)?;
    if data.len() != device::TOTAL_SIZE as usize {
        return Err(ImageError::BadSize {
            path: path.display().to_string(),
            found: data.len(),
            expected: device::TOTAL_SIZE as usize,
        });
    }
    Ok(data)
}

/// Persist the flash image back to disk
pub fn save(path: &Path, data: &[u8]) -> Result<(), ImageError> {
    std::fs::write(path, data)?;
    log::debug!("image saved to {:?}", path);
    Ok(())
}
