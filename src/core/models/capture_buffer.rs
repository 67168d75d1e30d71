use anyhow::{Context, Result};

/// Raw RGBA pixels of one still taken from a video stream.
#[derive(Clone)]
pub struct CaptureBuffer {
    pub width: u32,
    pub height: u32,
    raw_data: Vec<u8>,
}

impl std::fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.raw_data.len())
            .finish()
    }
}

impl CaptureBuffer {
    pub fn build_from_raw_data(width_pixels: u32, height_pixels: u32, raw_rgba_data: Vec<u8>) -> Self {
        log::debug!(
            "[CAPTURE_BUFFER] building buffer: {}x{}",
            width_pixels,
            height_pixels
        );

        Self {
            width: width_pixels,
            height: height_pixels,
            raw_data: raw_rgba_data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.raw_data.is_empty()
    }

    /// Lossless PNG encoding of the pixels as they were captured.
    pub fn encode_png(self) -> Result<EncodedFrame> {
        let (width, height) = (self.width, self.height);
        let rgba = image::RgbaImage::from_raw(width, height, self.raw_data)
            .context("Pixel data does not match the frame dimensions")?;

        let mut png_bytes = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut std::io::Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .context("Failed to encode frame as PNG")?;

        log::debug!(
            "[CAPTURE_BUFFER] encoded {}x{} frame to {} PNG bytes",
            width,
            height,
            png_bytes.len()
        );

        Ok(EncodedFrame {
            width,
            height,
            png_bytes,
        })
    }
}

/// A captured still encoded as PNG, ready to be published.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub width: u32,
    pub height: u32,
    png_bytes: Vec<u8>,
}

impl std::fmt::Debug for EncodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.png_bytes.len())
            .finish()
    }
}

impl EncodedFrame {
    pub fn size_in_bytes(&self) -> usize {
        self.png_bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.png_bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.png_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_produces_png_signature_and_keeps_dimensions() {
        let buffer = CaptureBuffer::build_from_raw_data(4, 3, vec![128u8; 4 * 3 * 4]);

        let frame = buffer.encode_png().unwrap();

        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 3);
        assert!(frame.as_bytes().starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let pixels: Vec<u8> = (0..(5 * 5 * 4)).map(|value| (value * 7 % 256) as u8).collect();
        let buffer = CaptureBuffer::build_from_raw_data(5, 5, pixels.clone());

        let frame = buffer.encode_png().unwrap();
        let decoded = image::load_from_memory(frame.as_bytes()).unwrap().to_rgba8();

        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn test_encode_png_rejects_mismatched_pixel_data() {
        let buffer = CaptureBuffer::build_from_raw_data(10, 10, vec![0u8; 12]);

        assert!(buffer.encode_png().is_err());
    }

    #[test]
    fn test_is_empty_detects_zero_sized_buffers() {
        assert!(CaptureBuffer::build_from_raw_data(0, 10, vec![]).is_empty());
        assert!(!CaptureBuffer::build_from_raw_data(1, 1, vec![0, 0, 0, 255]).is_empty());
    }
}
