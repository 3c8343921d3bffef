pub const WINDOW_WIDTH: i32 = 1280;           // Initial window width
pub const WINDOW_HEIGHT: i32 = 720;           // Initial window height
pub const FPS: u32 = 60;                      // Target frames per second

// --- Loader timings (milliseconds) ---
pub const MAX_FALLBACK_MS: u64 = 7000;        // Safety net, hides the overlay whatever the media does
pub const VIDEO_ERROR_DELAY_MS: u64 = 2000;   // Hide delay after the loader video fails
pub const GIF_MIN_DURATION_MS: u64 = 300;     // Lower bound for the gif display duration
pub const GIF_ERROR_DELAY_MS: u64 = 1200;     // Hide delay after the loader image fails
pub const NO_MEDIA_DELAY_MS: u64 = 800;       // Hide delay when there is nothing to play
pub const PAGE_LOAD_DELAY_MS: u64 = 1200;     // Hide delay after the page finished loading
pub const DEFAULT_GIF_DURATION_MS: u64 = 2000;

// --- Layout ---
pub const MEME_MAX_HEIGHT: f32 = 400.0;       // Max height of the meme output (logical pixels)
pub const PAGE_MARGIN: f32 = 24.0;
pub const BUTTON_TOP: f32 = 80.0;
pub const BUTTON_WIDTH: f32 = 220.0;
pub const BUTTON_HEIGHT: f32 = 48.0;

// --- Video decoding boxes (pixels) ---
pub const LOADER_VIDEO_SIZE: (u32, u32) = (960, 540);
pub const MEME_VIDEO_SIZE: (u32, u32) = (712, 400);
