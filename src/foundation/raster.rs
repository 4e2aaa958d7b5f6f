use std::{io::Cursor, path::Path};

use anyhow::Context;

use crate::foundation::{
    error::{ChromacutError, ChromacutResult},
    fsio,
};

/// One straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Owned RGBA8 raster in row-major order, straight alpha.
///
/// A `Raster` is exclusively owned by whichever stage is transforming it; stages hand back a
/// new or mutated buffer and never share one across components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap raw RGBA8 bytes, rejecting buffers that do not match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ChromacutResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ChromacutError::invalid_image("raster size overflow"))?;
        if data.len() != expected {
            return Err(ChromacutError::invalid_image(format!(
                "expected {expected} bytes for {width}x{height} rgba8, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fully transparent black raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Raster filled with a single pixel value.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba8> + '_ {
        self.data.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Number of pixels with a non-zero alpha channel.
    pub fn opaque_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    /// Decode any supported encoded image and convert it to straight RGBA8.
    pub fn decode(bytes: &[u8]) -> ChromacutResult<Self> {
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| ChromacutError::invalid_image(format!("decode image from memory: {e}")))?;
        Ok(Self::from_image(dyn_img.to_rgba8()))
    }

    /// Read and decode an image file.
    pub fn load(path: &Path) -> ChromacutResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))?;
        Self::decode(&bytes).map_err(|e| match e {
            ChromacutError::InvalidImage(msg) => {
                ChromacutError::invalid_image(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> ChromacutResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::write_buffer_with_format(
            &mut Cursor::new(&mut buf),
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .context("encode png")?;
        Ok(buf)
    }

    /// Encode as PNG and write it atomically, creating parent directories as needed.
    pub fn save_png(&self, path: &Path) -> ChromacutResult<()> {
        let bytes = self.encode_png()?;
        fsio::write_atomic(path, &bytes)
    }

    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn into_image(self) -> ChromacutResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| ChromacutError::invalid_image("raster buffer does not match its size"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
