use std::collections::HashMap;
use std::path::{Path, PathBuf};
use raylib::prelude::*;
use tracing::{debug, warn};
use crate::constants::*;
use crate::decode::GifAnimation;
use crate::document::*;
use crate::error::MediaError;
use crate::ffmpeg::{VideoDecoder, media_event};
use crate::sequencer::MediaEvent;
use crate::texture_loader::{load_texture_with_exif_rotation, read_media};

enum LoadedMedia {
    Image(Option<Texture2D>), // None once loading failed
    Animation {
        gif: GifAnimation,
        texture: Texture2D,
    },
    Video {
        decoder: Option<VideoDecoder>,
        texture: Option<Texture2D>,
    },
}

impl LoadedMedia {
    fn texture(&self) -> Option<&Texture2D> {
        match self {
            LoadedMedia::Image(texture) => texture.as_ref(),
            LoadedMedia::Animation { texture, .. } => Some(texture),
            LoadedMedia::Video { texture, .. } => texture.as_ref(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PageInput {
    pub generate_meme: bool,
    pub randomize_cursor: bool,
}

/// Presents the document in the window and turns media progress into events.
pub struct Renderer {
    asset_root: PathBuf,
    media: HashMap<NodeId, LoadedMedia>,
    cursor: Option<(String, Option<Texture2D>)>,
}

impl Renderer {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self { asset_root: asset_root.into(), media: HashMap::new(), cursor: None }
    }

    /// Loads what appeared in the document, drops what left it, advances the
    /// videos and gifs. Returns the media events of this frame.
    pub fn sync(
        &mut self,
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        doc: &Document,
        dt_ms: u64,
    ) -> Vec<(NodeId, MediaEvent)> {
        let mut events = Vec::new();

        // Each element with the box its video frames are decoded into
        let loader = doc.overlay.iter().filter_map(|o| o.inner.as_ref());
        let elements: Vec<(&Element, (u32, u32))> = loader
            .flat_map(|c| c.children())
            .map(|e| (e, LOADER_VIDEO_SIZE))
            .chain(doc.meme_container.iter().flat_map(|c| c.children()).map(|e| (e, MEME_VIDEO_SIZE)))
            .collect();

        self.media.retain(|id, _| elements.iter().any(|(e, _)| e.id == *id));

        for (element, decode_box) in elements {
            if !self.media.contains_key(&element.id) {
                let loaded = self.load(rl, thread, element, decode_box, &mut events);
                self.media.insert(element.id, loaded);
            }
            match self.media.get_mut(&element.id) {
                Some(LoadedMedia::Video { decoder: Some(decoder), texture }) => {
                    let presenting = matches!(&element.kind, ElementKind::Video(v) if v.is_presenting(doc.autoplay));
                    for event in decoder.poll() {
                        match media_event(event, presenting) {
                            Some(mapped) => events.push((element.id, mapped)),
                            None => debug!(node = ?element.id, ?event, "video not presenting, event dropped"),
                        }
                    }
                    if let Some(frame) = decoder.take_frame().filter(|_| presenting) {
                        if texture.is_none() {
                            let (w, h) = decoder.size();
                            match blank_texture(rl, thread, w, h) {
                                Ok(t) => *texture = Some(t),
                                Err(e) => warn!("could not allocate video texture: {}", e),
                            }
                        }
                        if let Some(texture) = texture.as_mut() {
                            if let Err(e) = texture.update_texture(&frame) {
                                warn!(node = ?element.id, "could not upload video frame: {}", e);
                            }
                        }
                    }
                }
                Some(LoadedMedia::Animation { gif, texture }) => {
                    if let Some(frame) = gif.advance(dt_ms) {
                        if let Err(e) = texture.update_texture(frame) {
                            warn!(node = ?element.id, "could not upload gif frame: {}", e);
                        }
                    }
                }
                _ => {}
            }
        }

        self.sync_cursor(rl, thread, doc);
        events
    }

    fn load(
        &self,
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        element: &Element,
        (w, h): (u32, u32),
        events: &mut Vec<(NodeId, MediaEvent)>,
    ) -> LoadedMedia {
        let path = self.asset_root.join(element.src());
        match &element.kind {
            ElementKind::Image(_) if is_gif(&path) => match load_animation(rl, thread, &path) {
                Ok((gif, texture)) => {
                    debug!(?path, frames = gif.frame_count(), "gif loaded");
                    events.push((element.id, MediaEvent::Load));
                    LoadedMedia::Animation { gif, texture }
                }
                Err(e) => {
                    warn!("{}", e);
                    events.push((element.id, MediaEvent::Error));
                    LoadedMedia::Image(None)
                }
            },
            ElementKind::Image(_) => match load_texture_with_exif_rotation(rl, thread, &path) {
                Ok(texture) => {
                    events.push((element.id, MediaEvent::Load));
                    LoadedMedia::Image(Some(texture))
                }
                Err(e) => {
                    warn!("{}", e);
                    events.push((element.id, MediaEvent::Error));
                    LoadedMedia::Image(None)
                }
            },
            ElementKind::Video(video) => {
                debug!(
                    ?path,
                    autoplay = video.autoplay,
                    muted = video.muted,
                    inline = video.plays_inline,
                    preload = video.preload_auto,
                    controls = video.controls,
                    "video element loaded"
                );
                match VideoDecoder::spawn(&path, w, h, video.looping) {
                    Ok(decoder) => LoadedMedia::Video { decoder: Some(decoder), texture: None },
                    Err(e) => {
                        warn!("{}", e);
                        events.push((element.id, MediaEvent::Error));
                        LoadedMedia::Video { decoder: None, texture: None }
                    }
                }
            }
        }
    }

    fn sync_cursor(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, doc: &Document) {
        let wanted = doc.cursor.as_ref().map(|c| c.image.as_str());
        let current = self.cursor.as_ref().map(|(image, _)| image.as_str());
        if wanted == current {
            return;
        }
        self.cursor = wanted.map(|image| {
            let texture = load_texture_with_exif_rotation(rl, thread, &self.asset_root.join(image))
                .inspect_err(|e| warn!("{}", e))
                .ok();
            (image.to_string(), texture)
        });
    }

    pub fn input(&self, rl: &RaylibHandle, doc: &Document) -> PageInput {
        let mut input = PageInput::default();
        // The overlay covers the page and swallows clicks
        if !doc.overlay_hidden() || !rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
            return input;
        }
        let mouse = rl.get_mouse_position();
        input.generate_meme = doc.meme_button && meme_button().check_collision_point_rec(mouse);
        input.randomize_cursor = doc.cursor_button && cursor_button().check_collision_point_rec(mouse);
        input
    }

    pub fn draw(&self, rl: &mut RaylibHandle, thread: &RaylibThread, doc: &Document) {
        let custom_cursor = self.cursor.as_ref().and_then(|(_, t)| t.as_ref());
        if custom_cursor.is_some() {
            rl.hide_cursor();
        } else {
            rl.show_cursor();
        }
        let mouse = rl.get_mouse_position();

        let mut d = rl.begin_drawing(thread);
        let sw = d.get_screen_width() as f32;
        let sh = d.get_screen_height() as f32;
        d.clear_background(Color::RAYWHITE);

        // --- Page ---
        d.draw_text("Meme Generator", PAGE_MARGIN as i32, 24, 36, Color::DARKGRAY);
        if doc.meme_button {
            draw_button(&mut d, meme_button(), "Generate Meme", mouse);
        }
        if doc.cursor_button {
            draw_button(&mut d, cursor_button(), "Randomize Cursor", mouse);
        }

        if let Some(container) = &doc.meme_container {
            let top = BUTTON_TOP + BUTTON_HEIGHT + PAGE_MARGIN;
            let area = Vector2::new(sw - PAGE_MARGIN * 2.0, sh - top);
            let mut y = top;
            for element in container.children() {
                if let Some(texture) = self.media.get(&element.id).and_then(LoadedMedia::texture) {
                    let (w, h) = fit(texture, &element.style, area);
                    draw_texture_into(&mut d, texture, Rectangle::new(PAGE_MARGIN, y, w, h));
                    y += h;
                }
            }
        }

        // --- Overlay ---
        if let Some(overlay) = doc.overlay.as_ref().filter(|o| !o.hidden) {
            d.draw_rectangle(0, 0, sw as i32, sh as i32, Color::BLACK);
            for element in overlay.inner.iter().flat_map(|c| c.children()) {
                if let Some(texture) = self.media.get(&element.id).and_then(LoadedMedia::texture) {
                    let (w, h) = fit(texture, &element.style, Vector2::new(sw, sh));
                    draw_texture_into(&mut d, texture, Rectangle::new((sw - w) / 2.0, (sh - h) / 2.0, w, h));
                }
            }
        }

        // --- Custom cursor, hotspot at the top-left corner ---
        if let Some(texture) = custom_cursor {
            d.draw_texture_v(texture, mouse, Color::WHITE);
        }
    }
}

fn is_gif(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("gif"))
}

fn blank_texture(rl: &mut RaylibHandle, thread: &RaylibThread, w: u32, h: u32) -> Result<Texture2D, String> {
    let blank = Image::gen_image_color(w as i32, h as i32, Color::BLACK);
    rl.load_texture_from_image(thread, &blank).map_err(|e| e.to_string())
}

// Decodes every frame up front and shows the first one
fn load_animation(rl: &mut RaylibHandle, thread: &RaylibThread, path: &Path) -> Result<(GifAnimation, Texture2D), MediaError> {
    let gif = GifAnimation::decode(path, &read_media(path)?)?;
    let (w, h) = gif.size();
    let texture_error = |message: String| MediaError::Texture { path: path.to_path_buf(), message };
    let mut texture = blank_texture(rl, thread, w, h).map_err(texture_error)?;
    texture.update_texture(gif.current_frame()).map_err(|e| texture_error(e.to_string()))?;
    Ok((gif, texture))
}

fn meme_button() -> Rectangle {
    Rectangle::new(PAGE_MARGIN, BUTTON_TOP, BUTTON_WIDTH, BUTTON_HEIGHT)
}

fn cursor_button() -> Rectangle {
    Rectangle::new(PAGE_MARGIN * 2.0 + BUTTON_WIDTH, BUTTON_TOP, BUTTON_WIDTH, BUTTON_HEIGHT)
}

// Scale down (never up) to honor max-width / max-height, keeping the aspect ratio.
// Without a max-height the element is still kept inside the available box.
fn fit(texture: &Texture2D, style: &BoxStyle, available: Vector2) -> (f32, f32) {
    let w = texture.width() as f32;
    let h = texture.height() as f32;
    let max_w = style.max_width.map_or(available.x, |l| l.resolve(available.x));
    let max_h = style.max_height.map_or(available.y, |l| l.resolve(available.y));
    let scale = (max_w / w).min(max_h / h).min(1.0);
    (w * scale, h * scale)
}

fn draw_texture_into(d: &mut RaylibDrawHandle, texture: &Texture2D, dest: Rectangle) {
    d.draw_texture_pro(
        texture,
        Rectangle::new(0.0, 0.0, texture.width() as f32, texture.height() as f32),
        dest,
        Vector2::new(0.0, 0.0),
        0.0,
        Color::WHITE,
    );
}

fn draw_button(d: &mut RaylibDrawHandle, rect: Rectangle, label: &str, mouse: Vector2) {
    let fill = if rect.check_collision_point_rec(mouse) { Color::SKYBLUE } else { Color::LIGHTGRAY };
    d.draw_rectangle_rec(rect, fill);
    d.draw_rectangle_lines(rect.x as i32, rect.y as i32, rect.width as i32, rect.height as i32, Color::DARKGRAY);
    d.draw_text(label, rect.x as i32 + 16, rect.y as i32 + 14, 20, Color::DARKGRAY);
}
