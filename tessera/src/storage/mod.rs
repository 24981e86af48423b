//! Persistence of submitted drawings and their tiles.

mod ids;


use std::fs;
use std::path::{Path, PathBuf};

use crate::common::Result;
use crate::image::Image;
use crate::tiling::TileCoord;

pub use ids::SubmissionIds;

pub(crate) const TILES_DIR: &str = "tiles";
pub(crate) const SUBMISSION_DIR_PREFIX: &str = "img";

/// Where tiles are written and read back from.
pub trait TileStore: Send + Sync {
    fn store(&self, image: &Image, path: &Path) -> Result<()>;

    fn load(&self, path: &Path) -> Result<Image>;

    fn create_dir(&self, path: &Path) -> Result<()>;
}

/// Stores images as files on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsTileStore;

impl TileStore for FsTileStore {
    fn store(&self, image: &Image, path: &Path) -> Result<()> {
        image.save_file(path)
    }

    fn load(&self, path: &Path) -> Result<Image> {
        Image::read_file(path)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

/// Directory layout under the storage root:
///
/// ```text
/// {root}/drawing_{id}.png
/// {root}/tiles/img{id}/tile_{row}_{col}.png
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tiles_root(&self) -> PathBuf {
        self.root.join(TILES_DIR)
    }

    pub fn tile_dir(&self, id: u64) -> PathBuf {
        self.tiles_root()
            .join(format!("{}{}", SUBMISSION_DIR_PREFIX, id))
    }

    pub fn tile_path(&self, id: u64, coord: TileCoord) -> PathBuf {
        self.tile_dir(id)
            .join(format!("tile_{}_{}.png", coord.row, coord.col))
    }

    pub fn full_image_path(&self, id: u64) -> PathBuf {
        self.root.join(format!("drawing_{}.png", id))
    }
}
