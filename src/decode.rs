//! Pure-Rust decoding for the formats raylib cannot open itself: WebP stills
//! and animated GIFs.

use std::io::Cursor;
use std::path::Path;
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngEncoder;
use image::{AnimationDecoder, ImageEncoder, ImageFormat};
use crate::error::MediaError;

// Browsers treat tiny GIF delays as "as fast as possible" and slow them down
const MIN_GIF_DELAY_MS: u64 = 10;
const DEFAULT_GIF_DELAY_MS: u64 = 100;

fn decode_error(path: &Path, e: impl ToString) -> MediaError {
    MediaError::Decode { path: path.to_path_buf(), message: e.to_string() }
}

/// Re-encodes a WebP file as PNG so raylib can load it.
pub fn webp_to_png(path: &Path, bytes: &[u8]) -> Result<Vec<u8>, MediaError> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::WebP)
        .map_err(|e| decode_error(path, e))?
        .to_rgba8();

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&rgba, rgba.width(), rgba.height(), image::ColorType::Rgba8.into())
        .map_err(|e| decode_error(path, e))?;
    Ok(png)
}

/// A decoded GIF: full-canvas RGBA frames and how long each one stays up.
#[derive(Debug)]
pub struct GifAnimation {
    width: u32,
    height: u32,
    frames: Vec<(Vec<u8>, u64)>,
    current: usize,
    elapsed_ms: u64,
}

impl GifAnimation {
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<GifAnimation, MediaError> {
        let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(|e| decode_error(path, e))?;
        let frames = decoder.into_frames().collect_frames().map_err(|e| decode_error(path, e))?;

        let mut width = 0;
        let mut height = 0;
        let frames: Vec<(Vec<u8>, u64)> = frames
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let delay = u64::from(numer) / u64::from(denom.max(1));
                let delay = if delay <= MIN_GIF_DELAY_MS { DEFAULT_GIF_DELAY_MS } else { delay };
                let buffer = frame.into_buffer();
                width = buffer.width();
                height = buffer.height();
                (buffer.into_raw(), delay)
            })
            .collect();

        if frames.is_empty() {
            return Err(decode_error(path, "gif has no frames"));
        }
        Ok(GifAnimation { width, height, frames, current: 0, elapsed_ms: 0 })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> &[u8] {
        &self.frames[self.current].0
    }

    /// Steps the animation, looping forever. Returns the new frame when it changed.
    pub fn advance(&mut self, dt_ms: u64) -> Option<&[u8]> {
        if self.frames.len() < 2 {
            return None;
        }
        let before = self.current;
        self.elapsed_ms += dt_ms;
        while self.elapsed_ms >= self.frames[self.current].1 {
            self.elapsed_ms -= self.frames[self.current].1;
            self.current = (self.current + 1) % self.frames.len();
        }
        (self.current != before).then(|| self.current_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, DynamicImage, Frame, Rgba, RgbaImage};

    fn gif_bytes(delays_ms: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            let frames = delays_ms.iter().enumerate().map(|(i, delay)| {
                let shade = (i as u8).wrapping_mul(80);
                let buffer = RgbaImage::from_pixel(4, 3, Rgba([shade, 0, 0, 255]));
                Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(*delay, 1))
            });
            encoder.encode_frames(frames).unwrap();
        }
        bytes
    }

    #[test]
    fn webp_becomes_loadable_png() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 2, Rgba([10, 20, 30, 255])));
        let mut webp = Cursor::new(Vec::new());
        source.write_to(&mut webp, ImageFormat::WebP).unwrap();

        let png = webp_to_png(Path::new("10.webp"), webp.get_ref()).unwrap();
        let back = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((back.width(), back.height()), (5, 2));
        assert_eq!(back.to_rgba8().get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn broken_webp_is_a_decode_error() {
        let err = webp_to_png(Path::new("bad.webp"), b"not a webp").unwrap_err();
        assert!(matches!(err, MediaError::Decode { .. }));
    }

    #[test]
    fn gif_frames_follow_their_delays() {
        let mut gif = GifAnimation::decode(Path::new("intro.gif"), &gif_bytes(&[200, 300])).unwrap();
        assert_eq!(gif.size(), (4, 3));
        assert_eq!(gif.frame_count(), 2);
        assert_eq!(gif.current_frame().len(), 4 * 3 * 4);

        assert!(gif.advance(199).is_none());
        assert!(gif.advance(1).is_some());
        assert!(gif.advance(299).is_none());
        assert!(gif.advance(1).is_some());
        assert_eq!(gif.current, 0);
    }

    #[test]
    fn tiny_delays_are_slowed_down() {
        let mut gif = GifAnimation::decode(Path::new("fast.gif"), &gif_bytes(&[0, 0])).unwrap();
        assert!(gif.advance(DEFAULT_GIF_DELAY_MS - 1).is_none());
        assert!(gif.advance(1).is_some());
    }

    #[test]
    fn single_frame_gif_never_changes() {
        let mut gif = GifAnimation::decode(Path::new("still.gif"), &gif_bytes(&[100])).unwrap();
        assert!(gif.advance(10_000).is_none());
    }
}
