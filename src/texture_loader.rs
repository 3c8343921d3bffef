use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use raylib::prelude::*;
use exif::{Reader, Tag, Value, In};
use tracing::debug;
use crate::cursor::ImageProbe;
use crate::decode::webp_to_png;
use crate::error::MediaError;

pub fn read_media(path: &Path) -> Result<Vec<u8>, MediaError> {
    fs::read(path).map_err(|source| MediaError::Read { path: path.to_path_buf(), source })
}

// --- Load Image, Apply EXIF Rotation ---
pub fn load_image_with_exif_rotation(image_path: &Path) -> Result<Image, MediaError> {
    let file_bytes = read_media(image_path)?;

    let extension = image_path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
    let orientation = if extension == "jpg" || extension == "jpeg" {
        exif_orientation(image_path, &file_bytes)
    } else {
        1
    };

    // raylib has no WebP decoder
    let (hint, file_bytes) = if extension == "webp" {
        (".png".to_string(), webp_to_png(image_path, &file_bytes)?)
    } else {
        (format!(".{}", extension), file_bytes)
    };

    // Extension hint tells raylib which decoder to use
    let mut image = Image::load_image_from_mem(&hint, &file_bytes)
        .map_err(|e| MediaError::Decode { path: image_path.to_path_buf(), message: e.to_string() })?;

    // 1 = normal, 3 = 180 deg, 6 = 90 deg CW, 8 = 90 deg CCW. Flipped variants are ignored.
    match orientation {
        3 => {
            image.rotate_cw();
            image.rotate_cw();
        }
        6 => image.rotate_cw(),
        8 => image.rotate_ccw(),
        _ => {}
    }
    if orientation != 1 {
        debug!(?image_path, orientation, "applied EXIF rotation");
    }

    Ok(image)
}

fn exif_orientation(image_path: &Path, file_bytes: &[u8]) -> u16 {
    match Reader::new().read_from_container(&mut Cursor::new(file_bytes)) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Short(values) => values.first().copied(),
                _ => None,
            })
            .unwrap_or(1),
        Err(e) => {
            // Non-critical: proceed without rotation
            debug!(?image_path, "no EXIF data: {}", e);
            1
        }
    }
}

// --- Create Texture from the (rotated) image ---
pub fn load_texture_with_exif_rotation(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    image_path: &Path,
) -> Result<Texture2D, MediaError> {
    let image = load_image_with_exif_rotation(image_path)?;
    let texture = rl.load_texture_from_image(thread, &image)
        .map_err(|e| MediaError::Texture { path: image_path.to_path_buf(), message: e.to_string() })?;
    Ok(texture)
}

/// Preloads images from disk, relative to the asset root.
#[derive(Debug)]
pub struct FileProbe {
    root: PathBuf,
}

impl FileProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageProbe for FileProbe {
    fn probe(&mut self, src: &str) -> Result<(), MediaError> {
        load_image_with_exif_rotation(&self.root.join(src)).map(drop)
    }
}
