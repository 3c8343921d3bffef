use std::path::{Path, PathBuf};

pub const MEME_IMAGES: &[&str] = &[
    "img/memes/1.jpg", "img/memes/2.png", "img/memes/3.jpg",
    "img/memes/4.jpg", "img/memes/5.jpg", "img/memes/6.jpg",
    "img/memes/7.jpg", "img/memes/8.png", "img/memes/9.jpg",
    "img/memes/10.webp", "img/memes/11.png", "img/memes/12.png",
    "img/memes/13.jpg", "img/memes/14.jpg", "img/memes/15.jpg",
    "img/memes/16.jpg",
];

pub const MEME_VIDEOS: &[&str] = &[
    "vid/memes/1.mp4", "vid/memes/2.mp4", "vid/memes/3.mp4",
    "vid/memes/4.mp4", "vid/memes/5.mp4", "vid/memes/6.mp4",
    "vid/memes/7.mp4", "vid/memes/8.mp4", "vid/memes/9.mp4",
];

pub const CURSOR_IMAGES: &[&str] = &[
    "cursors/1.png", "cursors/2.png", "cursors/3.png",
    "cursors/4.png", "cursors/5.png", "cursors/6.png",
    "cursors/7.png",
];

// --- Helper: List compiled-in assets missing under the asset root ---
pub fn missing_assets(root: &Path) -> Vec<PathBuf> {
    MEME_IMAGES
        .iter()
        .chain(MEME_VIDEOS)
        .chain(CURSOR_IMAGES)
        .map(|relative| root.join(relative))
        .filter(|path| !path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_sizes() {
        assert_eq!(MEME_IMAGES.len(), 16);
        assert_eq!(MEME_VIDEOS.len(), 9);
        assert_eq!(CURSOR_IMAGES.len(), 7);
    }

    #[test]
    fn everything_missing_under_empty_root() {
        let root = std::env::temp_dir().join("memepage-no-such-asset-root");
        assert_eq!(missing_assets(&root).len(), 16 + 9 + 7);
    }
}
