//! Synthetic raster image used as the probe's blob payload.
//!
//! Images are 8-bit RGBA and travel as PNG, which is lossless, so a decoded
//! download must match the generated pixels exactly.

use std::io::Cursor;

use rand::Rng;

use crate::error::ImageError;

const CHANNELS: usize = 4;

/// An 8-bit RGBA image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wraps a row-major RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDimensions`] if either side is zero or
    /// the buffer length is not `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let expected = (width as usize) * (height as usize) * CHANNELS;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Generates a `size` x `size` image of random opaque colours.
    pub fn random<R: Rng + ?Sized>(size: u32, rng: &mut R) -> Self {
        let count = (size as usize) * (size as usize);
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.push(rng.gen_range(0..=u8::MAX));
            pixels.push(rng.gen_range(0..=u8::MAX));
            pixels.push(rng.gen_range(0..=u8::MAX));
            pixels.push(u8::MAX);
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encodes the image as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;

        Ok(out)
    }

    /// Decodes an 8-bit RGBA PNG.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoder = png::Decoder::new(Cursor::new(bytes));
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;

        if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
            return Err(ImageError::UnsupportedLayout {
                color_type: info.color_type,
                bit_depth: info.bit_depth,
            });
        }

        buf.truncate(info.buffer_size());
        Self::from_rgba(info.width, info.height, buf)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_random_image_is_opaque() {
        let image = RasterImage::random(16, &mut StdRng::seed_from_u64(1));
        assert_eq!(image.pixels().len(), 16 * 16 * 4);
        assert!(image.pixels().chunks(4).all(|px| px[3] == u8::MAX));
    }

    #[test]
    fn test_png_decodes_to_identical_pixels() {
        let image = RasterImage::random(16, &mut StdRng::seed_from_u64(2));
        let png = image.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = RasterImage::decode_png(&png).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_non_square_buffer() {
        let pixels: Vec<u8> = (0..3 * 2 * 4).map(|i| i as u8).collect();
        let image = RasterImage::from_rgba(3, 2, pixels).unwrap();
        let decoded = RasterImage::decode_png(&image.encode_png().unwrap()).unwrap();
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        let err = RasterImage::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, ImageError::InvalidDimensions { len: 15, .. }));
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let err = RasterImage::decode_png(b"not a png").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn test_rejects_grayscale_png() {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, 2, 2);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0, 64, 128, 255]).unwrap();
        writer.finish().unwrap();

        let err = RasterImage::decode_png(&out).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedLayout { .. }));
    }
}
