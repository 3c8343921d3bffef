use rand::Rng;
use tracing::info;
use crate::constants::*;
use crate::document::*;

/// Uniform pick over a fixed list; `None` for an empty list.
pub fn pick_uniform<'a, R: Rng>(list: &'a [&'a str], rng: &mut R) -> Option<&'a str> {
    if list.is_empty() {
        return None;
    }
    Some(list[rng.random_range(0..list.len())])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick<'a> {
    Video(&'a str),
    Image(&'a str),
}

/// Random meme display: a fair coin between the video and image lists, then a
/// uniform pick inside the chosen list.
#[derive(Debug, Clone)]
pub struct MediaPicker {
    images: &'static [&'static str],
    videos: &'static [&'static str],
}

impl MediaPicker {
    pub fn new(images: &'static [&'static str], videos: &'static [&'static str]) -> Self {
        Self { images, videos }
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<Pick<'static>> {
        let want_video = rng.random_bool(0.5);
        // An empty list falls through to the other one
        let (first, second) = if want_video { (self.videos, self.images) } else { (self.images, self.videos) };
        let from_videos = if first.is_empty() { !want_video } else { want_video };
        let list = if first.is_empty() { second } else { first };
        let src = pick_uniform(list, rng)?;
        Some(if from_videos { Pick::Video(src) } else { Pick::Image(src) })
    }

    /// Replaces the meme output with a freshly picked element. Returns the new node.
    pub fn generate<R: Rng>(&self, doc: &mut Document, rng: &mut R) -> Option<NodeId> {
        doc.meme_container.as_mut()?.clear();
        let pick = self.pick(rng)?;

        let style = BoxStyle {
            max_width: Some(Length::Percent(100.0)),
            max_height: Some(Length::Px(MEME_MAX_HEIGHT)),
        };
        let kind = match pick {
            Pick::Video(src) => {
                let mut video = VideoElement::new(src);
                video.controls = true;
                video.autoplay = true;
                video.looping = true;
                ElementKind::Video(video)
            }
            Pick::Image(src) => ElementKind::Image(ImageElement { src: src.to_string(), alt: None }),
        };
        info!(?pick, "meme generated");

        let element = doc.create_element(kind, style);
        doc.meme_container.as_mut().map(|c| c.append(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MEME_IMAGES, MEME_VIDEOS};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn meme_picker() -> MediaPicker {
        MediaPicker::new(MEME_IMAGES, MEME_VIDEOS)
    }

    #[test]
    fn generate_replaces_previous_content() {
        let picker = meme_picker();
        let mut doc = Document::page(HashMap::new(), true);
        let mut rng = StdRng::seed_from_u64(7);

        let mut last = None;
        for _ in 0..50 {
            let id = picker.generate(&mut doc, &mut rng);
            let container = doc.meme_container.as_ref().unwrap();
            assert_eq!(container.children().len(), 1);
            assert_eq!(Some(container.children()[0].id), id);
            assert_ne!(id, last);
            last = id;
        }
    }

    #[test]
    fn generated_elements_are_styled() {
        let picker = meme_picker();
        let mut doc = Document::page(HashMap::new(), true);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            picker.generate(&mut doc, &mut rng);
            let element = &doc.meme_container.as_ref().unwrap().children()[0];
            assert_eq!(element.style.max_width, Some(Length::Percent(100.0)));
            assert_eq!(element.style.max_height, Some(Length::Px(MEME_MAX_HEIGHT)));
            if let ElementKind::Video(video) = &element.kind {
                assert!(video.controls && video.autoplay && video.looping);
                assert!(MEME_VIDEOS.contains(&video.src.as_str()));
            } else {
                assert!(MEME_IMAGES.contains(&element.src()));
            }
        }
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let picker = meme_picker();
        let mut doc = Document::page(HashMap::new(), true);
        doc.meme_container = None;
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(picker.generate(&mut doc, &mut rng), None);
    }

    #[test]
    fn selection_is_roughly_uniform() {
        let picker = meme_picker();
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 50_000;
        let mut videos = 0usize;
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for _ in 0..trials {
            match picker.pick(&mut rng).unwrap() {
                Pick::Video(src) => {
                    videos += 1;
                    *counts.entry(src).or_default() += 1;
                }
                Pick::Image(src) => *counts.entry(src).or_default() += 1,
            }
        }

        let video_share = videos as f64 / trials as f64;
        assert!((0.48..0.52).contains(&video_share), "video share {video_share}");

        let images = trials - videos;
        for src in MEME_VIDEOS {
            let expected = videos as f64 / MEME_VIDEOS.len() as f64;
            let got = counts[src] as f64;
            assert!((got - expected).abs() < expected * 0.1, "{src}: {got} vs {expected}");
        }
        for src in MEME_IMAGES {
            let expected = images as f64 / MEME_IMAGES.len() as f64;
            let got = counts[src] as f64;
            assert!((got - expected).abs() < expected * 0.1, "{src}: {got} vs {expected}");
        }
    }

    #[test]
    fn empty_list_falls_back_to_the_other() {
        let picker = MediaPicker::new(&["only.png"], &[]);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(picker.pick(&mut rng), Some(Pick::Image("only.png")));
        }
        assert_eq!(pick_uniform(&[], &mut rng), None);
    }
}
