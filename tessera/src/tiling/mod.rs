//! Grid derivation and tile extraction.
//!
//! The grid covers the largest exact multiple of the tile size that fits
//! inside the image. Remainder pixels on the right and bottom are dropped.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::image::Image;

pub const DEFAULT_TILE_SIZE: TileSize = TileSize {
    width: 100,
    height: 100,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

/// Image dimensions as reported back to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    pub rows: u32,
    pub cols: u32,
}

/// Grid coordinate of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub row: u32,
    pub col: u32,
}

/// Pixel rectangle of one tile. `right` and `lower` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub row: u32,
    pub col: u32,
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

/// Row-major tile descriptors for one source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSet {
    grid: Grid,
    tile_size: TileSize,
    rects: Vec<TileRect>,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidTileSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for TileSize {
    fn default() -> Self {
        DEFAULT_TILE_SIZE
    }
}

impl Grid {
    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl TileCoord {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl TileRect {
    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.row, self.col)
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.lower - self.upper
    }
}

/// Number of whole tiles that fit along each axis.
///
/// Fails with [`Error::TooSmall`] when not even one tile fits in either
/// direction.
pub fn compute_grid(image_width: u32, image_height: u32, tile_size: TileSize) -> Result<Grid> {
    tile_size.validate()?;

    let cols = image_width / tile_size.width;
    let rows = image_height / tile_size.height;

    if rows == 0 || cols == 0 {
        return Err(Error::TooSmall {
            width: image_width,
            height: image_height,
            tile_width: tile_size.width,
            tile_height: tile_size.height,
        });
    }

    Ok(Grid { rows, cols })
}

/// Lays out `grid.rows * grid.cols` rectangles in row-major order.
///
/// Fails with [`Error::GridOverflow`] when the grid spans more pixels than a
/// `u32` coordinate can address.
pub fn generate_tiles(grid: Grid, tile_size: TileSize) -> Result<TileSet> {
    tile_size.validate()?;

    let span_width = grid.cols.checked_mul(tile_size.width);
    let span_height = grid.rows.checked_mul(tile_size.height);
    if span_width.is_none() || span_height.is_none() {
        return Err(Error::GridOverflow {
            rows: grid.rows,
            cols: grid.cols,
            tile_width: tile_size.width,
            tile_height: tile_size.height,
        });
    }

    // Every edge below is bounded by the spans checked above.
    let mut rects = Vec::with_capacity(grid.tile_count());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let left = col * tile_size.width;
            let upper = row * tile_size.height;
            rects.push(TileRect {
                row,
                col,
                left,
                upper,
                right: left + tile_size.width,
                lower: upper + tile_size.height,
            });
        }
    }

    Ok(TileSet {
        grid,
        tile_size,
        rects,
    })
}

impl TileSet {
    /// Computes the grid for `image` and lays out its tiles.
    pub fn for_image(image: &Image, tile_size: TileSize) -> Result<TileSet> {
        let grid = compute_grid(image.width(), image.height(), tile_size)?;
        generate_tiles(grid, tile_size)
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn rects(&self) -> &[TileRect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TileRect> {
        self.rects.iter()
    }

    /// Extracts the pixels covered by `rect`. The result is exactly one tile
    /// in size or an error.
    pub fn crop(&self, image: &Image, rect: &TileRect) -> Result<Image> {
        let tile = image
            .crop(rect.left, rect.upper, rect.width(), rect.height())
            .ok_or(Error::TileExtraction {
                row: rect.row,
                col: rect.col,
            })?;

        debug_assert_eq!(tile.width(), self.tile_size.width);
        debug_assert_eq!(tile.height(), self.tile_size.height);

        Ok(tile)
    }
}

impl<'a> IntoIterator for &'a TileSet {
    type Item = &'a TileRect;
    type IntoIter = std::slice::Iter<'a, TileRect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}
