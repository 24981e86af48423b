/// Pixel layouts understood by [`crate::Image`]. Every channel is 8 bits.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ColorFormat {
    L8 = 1,
    LA8 = 2,
    Rgb8 = 3,
    #[default]
    Rgba8 = 4,
}

impl ColorFormat {
    pub fn channel_count(&self) -> u8 {
        *self as u8
    }

    /// Bytes per pixel.
    pub fn byte_count(&self) -> u8 {
        self.channel_count()
    }

    pub(crate) fn to_image_lib(self) -> image::ColorType {
        match self {
            ColorFormat::L8 => image::ColorType::L8,
            ColorFormat::LA8 => image::ColorType::La8,
            ColorFormat::Rgb8 => image::ColorType::Rgb8,
            ColorFormat::Rgba8 => image::ColorType::Rgba8,
        }
    }
}

impl std::fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorFormat::L8 => write!(f, "L8"),
            ColorFormat::LA8 => write!(f, "LA8"),
            ColorFormat::Rgb8 => write!(f, "RGB8"),
            ColorFormat::Rgba8 => write!(f, "RGBA8"),
        }
    }
}
