//! Per-tile grayscale reduction.
//!
//! Luminance uses the ITU-R BT.601 weights in 16.16 fixed point, the same
//! "L" conversion common imaging libraries apply by default:
//! `L = (19595 R + 38470 G + 7471 B + 32768) >> 16`. The weights sum to
//! 65536, so a gray pixel `(v, v, v)` maps back to `v` exactly. Alpha is
//! ignored.


use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::common::ColorFormat;
use crate::image::Image;
use crate::tiling::TileCoord;

/// Value recorded for a tile whose intensity could not be computed.
pub const FALLBACK_GRAY: u8 = 128;

const R_WEIGHT: u32 = 19595;
const G_WEIGHT: u32 = 38470;
const B_WEIGHT: u32 = 7471;

#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted = R_WEIGHT * r as u32 + G_WEIGHT * g as u32 + B_WEIGHT * b as u32;
    ((weighted + 0x8000) >> 16) as u8
}

#[inline]
fn pixel_luminance(pixel: &[u8], color_format: ColorFormat) -> u8 {
    match color_format {
        ColorFormat::L8 | ColorFormat::LA8 => pixel[0],
        ColorFormat::Rgb8 | ColorFormat::Rgba8 => luminance(pixel[0], pixel[1], pixel[2]),
    }
}

/// Mean luminance of all pixels, or `None` for an image without pixels.
pub fn mean_luminance(image: &Image) -> Option<f64> {
    let color_format = image.desc().color_format;

    let mut count: u64 = 0;
    let mut sum: u64 = 0;
    for pixel in image.pixels() {
        sum += pixel_luminance(pixel, color_format) as u64;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(sum as f64 / count as f64)
}

/// Mean grayscale intensity of `image`, clamped to `0..=255` and rounded
/// half to even. An image without pixels yields 0.
pub fn average_gray(image: &Image) -> u8 {
    match mean_luminance(image) {
        Some(mean) => mean.clamp(0.0, 255.0).round_ties_even() as u8,
        None => {
            tracing::warn!("Empty image ({}), grayscale defaults to 0", image.desc());
            0
        }
    }
}

/// Grayscale intensity per tile coordinate. Serializes as a map keyed by
/// `"row,col"` strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrayscaleMap {
    values: BTreeMap<TileCoord, u8>,
}

impl GrayscaleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coord: TileCoord, value: u8) -> Option<u8> {
        self.values.insert(coord, value)
    }

    pub fn get(&self, coord: TileCoord) -> Option<u8> {
        self.values.get(&coord).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, u8)> + '_ {
        self.values.iter().map(|(coord, value)| (*coord, *value))
    }
}

impl FromIterator<(TileCoord, u8)> for GrayscaleMap {
    fn from_iter<I: IntoIterator<Item = (TileCoord, u8)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Serialize for GrayscaleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (coord, value) in &self.values {
            map.serialize_entry(&coord.to_string(), value)?;
        }
        map.end()
    }
}
