mod io;


use std::path::Path;

use crate::common::{ColorFormat, Error, Result};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: ColorFormat,
}

/// A tightly packed 8-bit bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

impl Image {
    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Returns the image bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn new_empty(desc: ImageDesc) -> Image {
        let bytes = vec![0; desc.size_in_bytes()];

        Image { desc, bytes }
    }

    /// Creates an image where every pixel equals `pixel`.
    pub fn new_filled(desc: ImageDesc, pixel: &[u8]) -> Result<Image> {
        if pixel.len() != desc.color_format.byte_count() as usize {
            return Err(Error::InvalidImageData(format!(
                "pixel has {} channels, {} expects {}",
                pixel.len(),
                desc.color_format,
                desc.color_format.byte_count()
            )));
        }

        let bytes = pixel.repeat(desc.pixel_count());

        Ok(Image { desc, bytes })
    }

    pub fn new_with_data(desc: ImageDesc, bytes: Vec<u8>) -> Result<Image> {
        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidImageData(format!(
                "bytes length {} does not match expected size {}",
                bytes.len(),
                desc.size_in_bytes()
            )));
        }

        Ok(Image { desc, bytes })
    }

    /// Decodes an encoded still image (PNG, JPEG, ...) held in memory.
    /// The result is always RGBA8.
    pub fn decode(encoded: &[u8]) -> Result<Image> {
        io::decode_rgba(encoded)
    }

    /// Reads a PNG file. The result is always RGBA8.
    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Image> {
        let extension = extension_of(filename.as_ref())?;

        match extension.as_str() {
            "png" => io::load_png(filename),

            _ => Err(Error::InvalidExtension(extension)),
        }
    }

    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let extension = extension_of(filename.as_ref())?;

        match extension.as_str() {
            "png" => io::save_png(self, filename)?,

            _ => return Err(Error::InvalidExtension(extension)),
        };

        Ok(())
    }

    /// Returns the channels of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.bytes_per_pixel() as usize;
        let offset = y as usize * self.desc.row_bytes() + x as usize * bpp;
        &self.bytes[offset..offset + bpp]
    }

    /// Iterates all pixels in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.bytes.chunks_exact(self.bytes_per_pixel() as usize)
    }

    /// Copies the `width` x `height` region whose top-left corner is (`x`, `y`).
    /// Returns `None` when the region does not fit inside the image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Image> {
        let right = x.checked_add(width)?;
        let lower = y.checked_add(height)?;
        if right > self.desc.width || lower > self.desc.height {
            return None;
        }

        let desc = ImageDesc::new(width, height, self.desc.color_format);
        let bpp = self.bytes_per_pixel() as usize;
        let src_row_bytes = self.desc.row_bytes();
        let dst_row_bytes = desc.row_bytes();

        let mut bytes = Vec::with_capacity(desc.size_in_bytes());
        for row in y as usize..lower as usize {
            let start = row * src_row_bytes + x as usize * bpp;
            bytes.extend_from_slice(&self.bytes[start..start + dst_row_bytes]);
        }

        Some(Image { desc, bytes })
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.desc.color_format.byte_count()
    }
}

fn extension_of(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|os_str| os_str.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))
}

impl ImageDesc {
    pub fn new(width: u32, height: u32, color_format: ColorFormat) -> Self {
        Self {
            width,
            height,
            color_format,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.row_bytes()
    }

    /// Returns the number of bytes per row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.color_format.byte_count() as usize
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color_format)
    }
}
