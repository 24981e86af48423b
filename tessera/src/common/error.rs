use std::io;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How an error is reported at the submission boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// The request itself was at fault (400).
    Client,
    /// The server could not complete valid work (500).
    Server,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Image is too small ({width}x{height}). Minimum size is {tile_width}x{tile_height}")]
    TooSmall {
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    },

    #[error("Invalid tile size {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("Grid of {rows}x{cols} tiles at {tile_width}x{tile_height} exceeds the addressable image size")]
    GridOverflow {
        rows: u32,
        cols: u32,
        tile_width: u32,
        tile_height: u32,
    },

    #[error("Failed to extract tile ({row},{col})")]
    TileExtraction { row: u32, col: u32 },

    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to compute grayscale for tile ({row},{col}): {reason}")]
    Reduction { row: u32, col: u32, reason: String },

    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Encoding error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Wraps a lower level failure with a message that is safe to show to clients.
    pub fn storage(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Storage {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusClass {
        match self {
            Error::Validation(_) | Error::Decode(_) | Error::TooSmall { .. } => StatusClass::Client,
            Error::InvalidTileSize { .. }
            | Error::GridOverflow { .. }
            | Error::TileExtraction { .. }
            | Error::Storage { .. }
            | Error::Reduction { .. }
            | Error::InvalidExtension(_)
            | Error::InvalidImageData(_)
            | Error::Io(_)
            | Error::Image(_) => StatusClass::Server,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
