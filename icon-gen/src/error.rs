use std::path::PathBuf;
use thiserror::Error;

/// Every compositor failure is fatal; `main` prints it and exits non-zero.
#[derive(Debug, Error)]
pub enum IconError {
    #[error("Failed to load source image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to write icon to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
