// Error handling
pub use crate::common::{ColorFormat, Error, Result, StatusClass};

// Image types
pub use crate::image::{Image, ImageDesc};

// Tiling
pub use crate::tiling::{
    compute_grid, generate_tiles, Grid, ImageSize, TileCoord, TileRect, TileSet, TileSize,
    DEFAULT_TILE_SIZE,
};

// Grayscale reduction
pub use crate::gray::{average_gray, luminance, mean_luminance, GrayscaleMap, FALLBACK_GRAY};

// Request payloads
pub use crate::payload::{decode_data_url, decode_request_body, extract_drawing, split_data_url};

// Storage
pub use crate::storage::{FsTileStore, StorageLayout, SubmissionIds, TileStore};

// Pipeline
pub use crate::pipeline::{
    reduce_in_memory, reduce_stored_tile, reduce_stored_tiles, Pipeline, StoredTile,
    SubmissionReport,
};

// Configuration
pub use crate::config::ServerConfig;
