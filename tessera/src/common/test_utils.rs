use std::io::Cursor;

use base64::Engine;

use crate::common::ColorFormat;
use crate::image::{Image, ImageDesc};

/// An RGBA8 image where every pixel is `rgba`.
pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Image {
    Image::new_filled(ImageDesc::new(width, height, ColorFormat::Rgba8), &rgba).unwrap()
}

/// An RGBA8 image whose pixels are produced by `f(x, y)`.
pub fn rgba_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Image {
    let mut bytes = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            bytes.extend_from_slice(&f(x, y));
        }
    }
    Image::new_with_data(ImageDesc::new(width, height, ColorFormat::Rgba8), bytes).unwrap()
}

pub fn encode_png(image: &Image) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut cursor,
        image.bytes(),
        image.width(),
        image.height(),
        image.desc().color_format.to_image_lib(),
        image::ImageFormat::Png,
    )
    .unwrap();
    cursor.into_inner()
}

pub fn png_data_url(image: &Image) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(encode_png(image));
    format!("data:image/png;base64,{}", encoded)
}
