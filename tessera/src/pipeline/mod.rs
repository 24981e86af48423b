//! One submission end to end: tile, persist, reduce, report.

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::{Error, Result};
use crate::gray::{average_gray, GrayscaleMap, FALLBACK_GRAY};
use crate::image::Image;
use crate::payload;
use crate::storage::{FsTileStore, StorageLayout, SubmissionIds, TileStore};
use crate::tiling::{Grid, ImageSize, TileCoord, TileSet, TileSize};

/// Everything a client learns about a processed submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub message: String,
    pub image_id: u64,
    pub tile_dir: PathBuf,
    pub tile_size: TileSize,
    pub image_size: ImageSize,
    pub grid: Grid,
    pub tile_gray_averages: GrayscaleMap,
    pub full_image_path: PathBuf,
}

/// A tile that has been written to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredTile {
    pub coord: TileCoord,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct Pipeline<S: TileStore = FsTileStore> {
    layout: StorageLayout,
    tile_size: TileSize,
    ids: SubmissionIds,
    store: S,
}

impl Pipeline<FsTileStore> {
    /// Filesystem-backed pipeline whose ids continue after existing output.
    pub fn open(layout: StorageLayout, tile_size: TileSize) -> io::Result<Self> {
        let ids = SubmissionIds::resume(&layout)?;
        Ok(Self::with_store(layout, tile_size, ids, FsTileStore))
    }
}

impl<S: TileStore> Pipeline<S> {
    pub fn with_store(
        layout: StorageLayout,
        tile_size: TileSize,
        ids: SubmissionIds,
        store: S,
    ) -> Self {
        Self {
            layout,
            tile_size,
            ids,
            store,
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Validates and decodes a JSON request body, then processes the drawing.
    pub fn process_request(&self, body: &[u8]) -> Result<SubmissionReport> {
        let image = payload::decode_request_body(body)?;
        self.process_image(&image)
    }

    pub fn process_image(&self, image: &Image) -> Result<SubmissionReport> {
        // Size is checked before anything touches the disk.
        let tiles = TileSet::for_image(image, self.tile_size).inspect_err(|err| {
            if let Error::TooSmall { width, height, .. } = err {
                tracing::warn!("Image too small for tiling: {}x{}", width, height);
            }
        })?;
        let grid = tiles.grid();

        let tiles_root = self.layout.tiles_root();
        self.store.create_dir(&tiles_root).map_err(|e| {
            tracing::error!(
                "Failed to create tiles directory {}: {}",
                tiles_root.display(),
                e
            );
            Error::storage("Failed to create storage directory", e)
        })?;

        let image_id = self.ids.next();
        let tile_dir = self.layout.tile_dir(image_id);
        self.store.create_dir(&tile_dir).map_err(|e| {
            tracing::error!(
                "Failed to create tile directory {}: {}",
                tile_dir.display(),
                e
            );
            Error::storage("Failed to create tile directory", e)
        })?;

        let full_image_path = self.layout.full_image_path(image_id);
        self.store.store(image, &full_image_path).map_err(|e| {
            tracing::error!("Failed to save full image: {}", e);
            Error::storage("Failed to save image", e)
        })?;
        tracing::info!("Saved full image to: {}", full_image_path.display());

        tracing::info!(
            "Creating {}x{} grid ({} tiles)",
            grid.rows,
            grid.cols,
            grid.tile_count()
        );
        let stored = self.store_tiles(image, &tiles, image_id)?;
        let tile_gray_averages = reduce_stored_tiles(&self.store, &stored);

        tracing::info!(
            "Successfully processed image {} with {} tiles",
            image_id,
            stored.len()
        );

        Ok(SubmissionReport {
            message: format!(
                "Successfully processed image into {} tiles",
                grid.tile_count()
            ),
            image_id,
            tile_dir,
            tile_size: self.tile_size,
            image_size: ImageSize {
                width: image.width(),
                height: image.height(),
            },
            grid,
            tile_gray_averages,
            full_image_path,
        })
    }

    /// Crops and writes every tile. The first failure aborts the submission.
    fn store_tiles(
        &self,
        image: &Image,
        tiles: &TileSet,
        image_id: u64,
    ) -> Result<Vec<StoredTile>> {
        let mut stored = Vec::with_capacity(tiles.len());

        for rect in tiles {
            let coord = rect.coord();
            let path = self.layout.tile_path(image_id, coord);

            let written = tiles
                .crop(image, rect)
                .and_then(|tile| self.store.store(&tile, &path));
            if let Err(e) = written {
                tracing::error!("Failed to create tile ({}): {}", coord, e);
                return Err(match e {
                    err @ Error::TileExtraction { .. } => err,
                    other => Error::storage(
                        format!(
                            "Failed to create tile at position ({},{})",
                            coord.row, coord.col
                        ),
                        other,
                    ),
                });
            }

            stored.push(StoredTile { coord, path });
        }

        Ok(stored)
    }
}

/// Loads one stored tile and reduces it to its grayscale mean.
pub fn reduce_stored_tile<S: TileStore + ?Sized>(
    store: &S,
    coord: TileCoord,
    path: &Path,
) -> Result<u8> {
    let tile = store.load(path).map_err(|e| Error::Reduction {
        row: coord.row,
        col: coord.col,
        reason: e.to_string(),
    })?;

    Ok(average_gray(&tile))
}

/// Reduces every stored tile. A tile that cannot be read back is logged and
/// recorded as [`FALLBACK_GRAY`]; the others are unaffected.
pub fn reduce_stored_tiles<S: TileStore + ?Sized>(
    store: &S,
    tiles: &[StoredTile],
) -> GrayscaleMap {
    let mut map = GrayscaleMap::new();

    for tile in tiles {
        let value = match reduce_stored_tile(store, tile.coord, &tile.path) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("{}", e);
                FALLBACK_GRAY
            }
        };
        map.insert(tile.coord, value);
    }

    map
}

/// Reduces tiles straight from the source image without a storage round trip.
pub fn reduce_in_memory(image: &Image, tiles: &TileSet) -> Result<GrayscaleMap> {
    tiles
        .iter()
        .map(|rect| Ok((rect.coord(), average_gray(&tiles.crop(image, rect)?))))
        .collect()
}
