use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use anyhow::{Context, Result, anyhow, ensure};
use clap::{Parser, ValueEnum};
use raylib::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod assets;
mod config;
mod constants;
mod cursor;
mod decode;
mod document;
mod error;
mod ffmpeg;
mod picker;
mod renderer;
mod sequencer;
mod state;
mod texture_loader;
mod timer;

use crate::assets::{CURSOR_IMAGES, MEME_IMAGES, MEME_VIDEOS, missing_assets};
use crate::constants::*;
use crate::cursor::CursorApplier;
use crate::document::{ATTR_GIF_DURATION, ATTR_MEDIA, ATTR_SRC, AutoplayPolicy, Document};
use crate::picker::MediaPicker;
use crate::renderer::Renderer;
use crate::sequencer::LoaderSequencer;
use crate::texture_loader::FileProbe;
use crate::timer::FrameClock;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Autoplay {
    Allowed,
    MutedOnly,
    Blocked,
}

impl From<Autoplay> for AutoplayPolicy {
    fn from(value: Autoplay) -> Self {
        match value {
            Autoplay::Allowed => AutoplayPolicy::Allowed,
            Autoplay::MutedOnly => AutoplayPolicy::MutedOnly,
            Autoplay::Blocked => AutoplayPolicy::Blocked,
        }
    }
}

/// Meme page with a loading overlay, random memes and random cursors.
#[derive(Debug, Parser)]
#[command(name = "memepage", version)]
struct Args {
    /// Directory the asset paths are relative to
    #[arg(default_value = ".")]
    assets: PathBuf,

    /// Loader media kind ("video" or "gif")
    #[arg(long, value_name = "KIND")]
    loader_media: Option<String>,

    /// Loader media source, relative to the asset directory
    #[arg(long, value_name = "PATH")]
    loader_src: Option<String>,

    /// How long a loader gif stays up after loading, in milliseconds
    #[arg(long, value_name = "MS")]
    loader_gif_duration: Option<String>,

    /// Leave out the "Randomize Cursor" button
    #[arg(long)]
    no_cursor_button: bool,

    #[arg(long, value_enum, default_value_t = Autoplay::Allowed)]
    autoplay: Autoplay,

    /// Default log filter, RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    ensure!(args.assets.is_dir(), "asset directory {:?} does not exist", args.assets);
    for path in missing_assets(&args.assets) {
        warn!(?path, "asset missing");
    }

    // --- Build the page ---
    let mut attributes = HashMap::new();
    for (name, value) in [
        (ATTR_MEDIA, &args.loader_media),
        (ATTR_SRC, &args.loader_src),
        (ATTR_GIF_DURATION, &args.loader_gif_duration),
    ] {
        if let Some(value) = value {
            attributes.insert(name.to_string(), value.clone());
        }
    }
    let mut doc = Document::page(attributes, !args.no_cursor_button);
    doc.autoplay = args.autoplay.into();

    let cursor = Rc::new(RefCell::new(CursorApplier::new(
        CURSOR_IMAGES,
        FileProbe::new(&args.assets),
        rand::rng(),
    )));
    let reveal_cursor = Rc::clone(&cursor);
    let mut sequencer = LoaderSequencer::for_document(&doc, move |doc: &mut Document| {
        reveal_cursor.borrow_mut().apply(doc);
    });
    let memes = MediaPicker::new(MEME_IMAGES, MEME_VIDEOS);
    let mut rng = rand::rng();

    let (mut rl, thread) = raylib::init()
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .title("Meme Page")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let mut renderer = Renderer::new(&args.assets);
    let mut clock = FrameClock::default();
    let mut page_loaded = false;

    sequencer.start(&mut doc);

    // --- Main Loop ---
    while !rl.window_should_close() {
        let dt_ms = clock.tick(rl.get_frame_time());

        for (node, event) in renderer.sync(&mut rl, &thread, &doc, dt_ms) {
            sequencer.handle_media_event(&mut doc, node, event);
        }
        sequencer.advance(&mut doc, dt_ms);

        let input = renderer.input(&rl, &doc);
        if input.generate_meme {
            memes.generate(&mut doc, &mut rng);
        }
        if input.randomize_cursor {
            cursor.borrow_mut().apply(&mut doc);
        }

        renderer.draw(&mut rl, &thread, &doc);

        // Everything the first frame needed is loaded by now
        if !page_loaded {
            page_loaded = true;
            sequencer.page_loaded();
        }
    }

    info!("window closed");
    Ok(())
}
