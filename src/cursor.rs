use rand::Rng;
use tracing::{debug, info};
use crate::document::{CursorStyle, Document};
use crate::error::MediaError;
use crate::picker::pick_uniform;

/// Loads an image far enough to know it decodes.
pub trait ImageProbe {
    fn probe(&mut self, src: &str) -> Result<(), MediaError>;
}

/// Swaps the document cursor for a random cursor image, but only once the
/// loading overlay is gone.
pub struct CursorApplier<P: ImageProbe, R: Rng> {
    cursors: &'static [&'static str],
    probe: P,
    rng: R,
}

impl<P: ImageProbe, R: Rng> CursorApplier<P, R> {
    pub fn new(cursors: &'static [&'static str], probe: P, rng: R) -> Self {
        Self { cursors, probe, rng }
    }

    /// Returns true when the document cursor changed.
    pub fn apply(&mut self, doc: &mut Document) -> bool {
        let Some(cursor) = pick_uniform(self.cursors, &mut self.rng) else {
            return false;
        };
        if !doc.overlay_hidden() {
            debug!("overlay still visible, keeping the current cursor");
            return false;
        }

        match self.probe.probe(cursor) {
            Ok(()) => {
                let style = CursorStyle { image: cursor.to_string(), hotspot: (0, 0) };
                info!(cursor = %style, "cursor applied");
                doc.cursor = Some(style);
                true
            }
            Err(e) => {
                debug!("cursor image unavailable: {}", e);
                false
            }
        }
    }
}
