use std::path::Path;

use image::DynamicImage;

use super::{Image, ImageDesc};
use crate::common::{ColorFormat, Error, Result};

pub(crate) fn decode_rgba(encoded: &[u8]) -> Result<Image> {
    let img = image::load_from_memory(encoded).map_err(|e| Error::Decode(e.to_string()))?;
    into_rgba(img)
}

/// Stored tiles are written as RGBA8, so a stock tile comes back unchanged.
/// A file replaced by hand is narrowed to RGBA8 like a submitted drawing.
pub(crate) fn load_png<P: AsRef<Path>>(filename: P) -> Result<Image> {
    let img = image::open(filename)?;
    into_rgba(img)
}

fn into_rgba(img: DynamicImage) -> Result<Image> {
    let rgba = img.into_rgba8();

    let desc = ImageDesc::new(rgba.width(), rgba.height(), ColorFormat::Rgba8);
    Image::new_with_data(desc, rgba.into_raw())
}

pub(crate) fn save_png<P: AsRef<Path>>(image: &Image, filename: P) -> Result<()> {
    image::save_buffer_with_format(
        filename,
        image.bytes(),
        image.width(),
        image.height(),
        image.desc().color_format.to_image_lib(),
        image::ImageFormat::Png,
    )?;

    Ok(())
}
