//! Loading overlay lifecycle.
//!
//! Several sources race to reveal the page: the loader media finishing or
//! failing, the safety-net timer and the page `load` event. Every one of them
//! goes through [`LoaderSequencer::hide`], which performs the
//! `Pending -> Hidden` transition at most once.

use tracing::{debug, info};
use crate::config::{LoaderConfig, MediaDescriptor, MediaKind};
use crate::constants::*;
use crate::document::*;
use crate::state::LoaderState;
use crate::timer::{TimerSlot, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    CanPlayThrough,
    Ended,
    Error,
    Load,
}

// One-shot listeners still armed on the loader media element
#[derive(Debug, Default)]
struct Listeners {
    can_play_through: bool,
    ended: bool,
    error: bool,
    load: bool,
}

type RevealCallback = Box<dyn FnMut(&mut Document)>;

pub struct LoaderSequencer {
    config: LoaderConfig,
    state: LoaderState,
    timers: Timers,
    media: Option<NodeId>,
    listeners: Listeners,
    error_delay_ms: u64,
    on_reveal: RevealCallback,
}

impl LoaderSequencer {
    /// `on_reveal` runs exactly once, right after the overlay is hidden.
    pub fn new(config: LoaderConfig, on_reveal: impl FnMut(&mut Document) + 'static) -> Self {
        Self {
            config,
            state: LoaderState::Idle,
            timers: Timers::default(),
            media: None,
            listeners: Listeners::default(),
            error_delay_ms: VIDEO_ERROR_DELAY_MS,
            on_reveal: Box::new(on_reveal),
        }
    }

    /// Reads the loader settings straight from the overlay attributes.
    pub fn for_document(doc: &Document, on_reveal: impl FnMut(&mut Document) + 'static) -> Self {
        let config = doc.overlay.as_ref().map(LoaderConfig::from_overlay).unwrap_or_default();
        Self::new(config, on_reveal)
    }

    #[cfg(test)]
    pub fn state(&self) -> LoaderState {
        self.state
    }

    #[cfg(test)]
    pub fn media_node(&self) -> Option<NodeId> {
        self.media
    }

    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn start(&mut self, doc: &mut Document) {
        if self.state != LoaderState::Idle {
            return;
        }
        if doc.loader_container_mut().is_none() {
            debug!("no loader overlay or media container, nothing to do");
            return;
        }

        self.state = LoaderState::Pending;
        doc.body_loading = true;

        match self.config.descriptor() {
            Some(MediaDescriptor::Video { src }) => {
                let mut video = VideoElement::new(&src);
                video.autoplay = true;
                video.muted = true;
                video.plays_inline = true;
                video.preload_auto = true;
                let style = BoxStyle { max_width: Some(Length::Percent(100.0)), max_height: None };
                self.mount(doc, ElementKind::Video(video), style);
                self.listeners = Listeners { can_play_through: true, ended: true, error: true, load: false };
                self.error_delay_ms = VIDEO_ERROR_DELAY_MS;
                self.timers.schedule(TimerSlot::SafetyNet, self.config.max_fallback_ms);
                info!(%src, "loader playing video");
            }
            Some(MediaDescriptor::Image { src, duration_hint_ms }) => {
                let image = ImageElement { src: src.clone(), alt: Some("Loading".to_string()) };
                self.mount(doc, ElementKind::Image(image), BoxStyle::default());
                self.listeners = Listeners { can_play_through: false, ended: false, error: true, load: true };
                self.error_delay_ms = GIF_ERROR_DELAY_MS;
                self.timers.schedule(TimerSlot::SafetyNet, self.config.max_fallback_ms);
                info!(%src, duration_hint_ms, "loader showing image");
            }
            None => {
                if let MediaKind::Unrecognized(kind) = &self.config.media {
                    debug!(%kind, "unrecognized loader media kind");
                }
                self.timers.schedule(TimerSlot::Media, NO_MEDIA_DELAY_MS);
                info!("loader has no media");
            }
        }
    }

    fn mount(&mut self, doc: &mut Document, kind: ElementKind, style: BoxStyle) {
        let element = doc.create_element(kind, style);
        self.media = doc.loader_container_mut().map(|c| c.append(element));
    }

    pub fn handle_media_event(&mut self, doc: &mut Document, node: NodeId, event: MediaEvent) {
        if self.state != LoaderState::Pending || self.media != Some(node) {
            return;
        }
        debug!(?event, node, "loader media event");

        match event {
            MediaEvent::CanPlayThrough if self.listeners.can_play_through => {
                self.listeners.can_play_through = false;
                let policy = doc.autoplay;
                if let Some(ElementKind::Video(video)) =
                    doc.loader_container_mut().and_then(|c| c.get_mut(node)).map(|e| &mut e.kind)
                {
                    // A rejected play() is not a failure: ended or the safety net still come
                    if let Err(e) = video.play(policy) {
                        debug!("{}", e);
                    }
                }
            }
            MediaEvent::Ended if self.listeners.ended => {
                self.listeners.ended = false;
                self.hide(doc);
            }
            MediaEvent::Error if self.listeners.error => {
                self.listeners.error = false;
                self.timers.schedule(TimerSlot::Media, self.error_delay_ms);
            }
            MediaEvent::Load if self.listeners.load => {
                self.listeners.load = false;
                self.timers.schedule(TimerSlot::Media, self.config.gif_duration_ms.max(GIF_MIN_DURATION_MS));
            }
            _ => {}
        }
    }

    /// The whole page finished loading.
    pub fn page_loaded(&mut self) {
        if self.state != LoaderState::Pending {
            return;
        }
        self.timers.schedule(TimerSlot::PageLoad, PAGE_LOAD_DELAY_MS);
    }

    pub fn advance(&mut self, doc: &mut Document, dt_ms: u64) {
        if self.state != LoaderState::Pending {
            return;
        }
        if let Some(slot) = self.timers.advance(dt_ms).first() {
            debug!(?slot, at_ms = self.timers.now_ms(), "hide timer fired");
            self.hide(doc);
        }
    }

    pub fn hide(&mut self, doc: &mut Document) {
        if self.state != LoaderState::Pending {
            return;
        }
        self.state = LoaderState::Hidden;

        if let Some(overlay) = doc.overlay.as_mut() {
            overlay.hidden = true;
        }
        doc.body_loading = false;
        self.timers.clear();
        if let Some(container) = doc.loader_container_mut() {
            container.clear();
        }
        self.media = None;
        info!(at_ms = self.timers.now_ms(), "page revealed");

        (self.on_reveal)(doc);
    }
}
