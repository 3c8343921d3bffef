//! In-memory page model: the overlay, the media containers, the trigger
//! controls and the document-wide cursor. The renderer only reads it, the
//! behaviors mutate it.

use std::collections::HashMap;
use std::fmt;

pub type NodeId = u64;

pub const ATTR_MEDIA: &str = "data-media";
pub const ATTR_SRC: &str = "data-src";
pub const ATTR_GIF_DURATION: &str = "data-gif-duration";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Percent(f32),
    Px(f32),
}

impl Length {
    /// Resolves the length against the size of the containing box.
    pub fn resolve(self, reference: f32) -> f32 {
        match self {
            Length::Percent(p) => reference * p / 100.0,
            Length::Px(px) => px,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxStyle {
    pub max_width: Option<Length>,
    pub max_height: Option<Length>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPolicy {
    #[default]
    Allowed,
    MutedOnly,
    Blocked,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("playback of {src} rejected by the autoplay policy")]
pub struct PlaybackRejected {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoElement {
    pub src: String,
    pub autoplay: bool,
    pub muted: bool,
    pub plays_inline: bool,
    pub looping: bool,
    pub controls: bool,
    pub preload_auto: bool,
    pub playing: bool,
}

impl VideoElement {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.to_string(),
            autoplay: false,
            muted: false,
            plays_inline: false,
            looping: false,
            controls: false,
            preload_auto: false,
            playing: false,
        }
    }

    fn may_play(&self, policy: AutoplayPolicy) -> bool {
        match policy {
            AutoplayPolicy::Allowed => true,
            AutoplayPolicy::MutedOnly => self.muted,
            AutoplayPolicy::Blocked => false,
        }
    }

    pub fn play(&mut self, policy: AutoplayPolicy) -> Result<(), PlaybackRejected> {
        if !self.may_play(policy) {
            return Err(PlaybackRejected { src: self.src.clone() });
        }
        self.playing = true;
        Ok(())
    }

    /// Whether frames should be presented: autoplay starts without a play() call.
    pub fn is_presenting(&self, policy: AutoplayPolicy) -> bool {
        self.playing || (self.autoplay && self.may_play(policy))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Video(VideoElement),
    Image(ImageElement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: NodeId,
    pub kind: ElementKind,
    pub style: BoxStyle,
}

impl Element {
    pub fn src(&self) -> &str {
        match &self.kind {
            ElementKind::Video(v) => &v.src,
            ElementKind::Image(i) => &i.src,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Container {
    children: Vec<Element>,
}

impl Container {
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn append(&mut self, element: Element) -> NodeId {
        let id = element.id;
        self.children.push(element);
        id
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.children.iter_mut().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub hidden: bool,
    pub attributes: HashMap<String, String>,
    pub inner: Option<Container>,
}

impl Overlay {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorStyle {
    pub image: String,
    pub hotspot: (i32, i32),
}

impl fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "url(\"{}\") {} {}, auto", self.image, self.hotspot.0, self.hotspot.1)
    }
}

#[derive(Debug, Default)]
pub struct Document {
    next_id: NodeId,
    pub overlay: Option<Overlay>,
    pub body_loading: bool,
    pub meme_container: Option<Container>,
    pub meme_button: bool,
    pub cursor_button: bool,
    pub cursor: Option<CursorStyle>,
    pub autoplay: AutoplayPolicy,
}

impl Document {
    /// The page as shipped: overlay with its media container, meme button and
    /// output, and optionally the cursor button.
    pub fn page(loader_attributes: HashMap<String, String>, cursor_button: bool) -> Self {
        Self {
            overlay: Some(Overlay {
                hidden: false,
                attributes: loader_attributes,
                inner: Some(Container::default()),
            }),
            meme_container: Some(Container::default()),
            meme_button: true,
            cursor_button,
            ..Self::default()
        }
    }

    pub fn create_element(&mut self, kind: ElementKind, style: BoxStyle) -> Element {
        self.next_id += 1;
        Element { id: self.next_id, kind, style }
    }

    /// True when there is no overlay or it has been hidden.
    pub fn overlay_hidden(&self) -> bool {
        self.overlay.as_ref().is_none_or(|o| o.hidden)
    }

    pub fn loader_container_mut(&mut self) -> Option<&mut Container> {
        self.overlay.as_mut().and_then(|o| o.inner.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_are_unique() {
        let mut doc = Document::default();
        let a = doc.create_element(ElementKind::Image(ImageElement { src: "a.png".into(), alt: None }), BoxStyle::default());
        let b = doc.create_element(ElementKind::Image(ImageElement { src: "b.png".into(), alt: None }), BoxStyle::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn play_respects_autoplay_policy() {
        let mut video = VideoElement::new("a.mp4");
        assert!(video.play(AutoplayPolicy::Blocked).is_err());
        assert!(video.play(AutoplayPolicy::MutedOnly).is_err());
        assert!(!video.playing);

        video.muted = true;
        assert!(video.play(AutoplayPolicy::MutedOnly).is_ok());
        assert!(video.playing);
    }

    #[test]
    fn overlay_hidden_without_overlay() {
        let mut doc = Document::page(HashMap::new(), false);
        assert!(!doc.overlay_hidden());
        doc.overlay = None;
        assert!(doc.overlay_hidden());
    }

    #[test]
    fn cursor_style_renders_like_css() {
        let style = CursorStyle { image: "cursors/1.png".into(), hotspot: (0, 0) };
        assert_eq!(style.to_string(), "url(\"cursors/1.png\") 0 0, auto");
    }

    #[test]
    fn percent_lengths_resolve_against_reference() {
        assert_eq!(Length::Percent(100.0).resolve(640.0), 640.0);
        assert_eq!(Length::Px(400.0).resolve(640.0), 400.0);
    }
}
