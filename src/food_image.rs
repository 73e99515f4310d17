use std::io::Cursor;

use axum::body::Bytes;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};

/// An uploaded food photo, as received from the multipart `file` field
#[derive(Debug, Clone)]
pub struct FoodImage {
    pub bytes: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl FoodImage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: None,
            content_type: None,
        }
    }

    /// Decodes the upload into pixels. The format is sniffed from the bytes;
    /// the declared content type is informational only.
    pub fn decode(&self) -> Result<DecodedImage, ImageError> {
        let pixels = image::load_from_memory(&self.bytes)?;
        Ok(DecodedImage { pixels })
    }
}

/// Pixel buffer handed to the multimodal model, dropped after the call
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: DynamicImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.pixels.dimensions().1
    }

    /// Lossless re-encoding used as inline model input.
    pub fn to_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(pixels: DynamicImage) -> Self {
        Self { pixels }
    }
}
