use crate::constants::*;
use crate::document::{Overlay, ATTR_GIF_DURATION, ATTR_MEDIA, ATTR_SRC};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Gif,
    Unrecognized(String),
}

impl MediaKind {
    fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("video") => MediaKind::Video,
            Some("gif") => MediaKind::Gif,
            Some(other) => MediaKind::Unrecognized(other.to_string()),
        }
    }
}

/// What the overlay should present while the page loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaDescriptor {
    Video { src: String },
    Image { src: String, duration_hint_ms: u64 },
}

/// Loader settings, read once from the overlay attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub media: MediaKind,
    pub src: String,
    pub gif_duration_ms: u64,
    pub max_fallback_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            media: MediaKind::Video,
            src: String::new(),
            gif_duration_ms: DEFAULT_GIF_DURATION_MS,
            max_fallback_ms: MAX_FALLBACK_MS,
        }
    }
}

impl LoaderConfig {
    pub fn from_overlay(overlay: &Overlay) -> Self {
        Self {
            media: MediaKind::parse(overlay.attribute(ATTR_MEDIA)),
            src: overlay.attribute(ATTR_SRC).unwrap_or_default().to_string(),
            gif_duration_ms: overlay
                .attribute(ATTR_GIF_DURATION)
                .and_then(parse_leading_int)
                .map(|ms| ms.max(0) as u64)
                .unwrap_or(DEFAULT_GIF_DURATION_MS),
            max_fallback_ms: MAX_FALLBACK_MS,
        }
    }

    /// `None` when there is no source or the kind is not one we can play.
    pub fn descriptor(&self) -> Option<MediaDescriptor> {
        if self.src.is_empty() {
            return None;
        }
        match self.media {
            MediaKind::Video => Some(MediaDescriptor::Video { src: self.src.clone() }),
            MediaKind::Gif => Some(MediaDescriptor::Image {
                src: self.src.clone(),
                duration_hint_ms: self.gif_duration_ms,
            }),
            MediaKind::Unrecognized(_) => None,
        }
    }
}

// Lenient integer parsing: "  250ms" -> 250, "-3" -> -3, "abc" -> None
fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
