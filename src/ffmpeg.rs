use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, warn};
use crate::error::MediaError;
use crate::sequencer::MediaEvent;

/// What the decoder has to report since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderEvent {
    FirstFrame,
    Ended,
    Failed,
}

enum Chunk {
    Frame(Vec<u8>),
    Eof,
}

/// Decodes a video to RGBA frames in real time through an ffmpeg child
/// process. Frames are letterboxed into a fixed `width` x `height` box.
pub struct VideoDecoder {
    process: Child,
    frames: Receiver<Chunk>,
    latest: Option<Vec<u8>>,
    width: u32,
    height: u32,
    started: bool,
    draining: bool,
    finished: bool,
}

impl VideoDecoder {
    pub fn spawn(path: &Path, width: u32, height: u32, looping: bool) -> Result<VideoDecoder, MediaError> {
        let filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
            w = width,
            h = height
        );
        let mut command = Command::new("ffmpeg");
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .args(["-loglevel", "error"])
            .arg("-re");
        if looping {
            command.args(["-stream_loop", "-1"]);
        }
        let mut process = command
            .arg("-i")
            .arg(path)
            .arg("-an")
            .args(["-vf", &filter])
            .args(["-f", "rawvideo"])
            .args(["-pix_fmt", "rgba"])
            .arg("-")
            .spawn()
            .map_err(|source| MediaError::Spawn { path: path.to_path_buf(), source })?;

        let mut stdout = match process.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(MediaError::Spawn {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(ErrorKind::BrokenPipe, "ffmpeg stdout not captured"),
                });
            }
        };

        let (tx, frames) = mpsc::channel();
        let frame_len = (width * height * 4) as usize;
        thread::spawn(move || {
            loop {
                let mut frame = vec![0u8; frame_len];
                match stdout.read_exact(&mut frame) {
                    Ok(()) => {
                        if tx.send(Chunk::Frame(frame)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        let _ = tx.send(Chunk::Eof);
                        break;
                    }
                }
            }
        });

        debug!(?path, width, height, looping, "video decoder started");
        Ok(VideoDecoder { process, frames, latest: None, width, height, started: false, draining: false, finished: false })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Takes the most recent frame, dropping the ones the renderer was too slow for.
    pub fn take_frame(&mut self) -> Option<Vec<u8>> {
        self.latest.take()
    }

    pub fn poll(&mut self) -> Vec<DecoderEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        loop {
            match self.frames.try_recv() {
                Ok(Chunk::Frame(frame)) => {
                    if !self.started {
                        self.started = true;
                        events.push(DecoderEvent::FirstFrame);
                    }
                    self.latest = Some(frame);
                }
                Ok(Chunk::Eof) | Err(TryRecvError::Disconnected) => {
                    self.draining = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        // stdout closed: the exit status tells a clean end from a failure
        if self.draining {
            match self.process.try_wait() {
                Ok(Some(status)) => {
                    self.finished = true;
                    let event = finish_event(status.success(), self.started);
                    if event == DecoderEvent::Failed {
                        warn!(%status, "video decoding failed");
                    }
                    events.push(event);
                }
                Ok(None) => {}
                Err(e) => {
                    self.finished = true;
                    warn!("could not query ffmpeg: {}", e);
                    events.push(DecoderEvent::Failed);
                }
            }
        }
        events
    }
}

/// How a finished decode is reported: a clean exit after at least one frame
/// is the end of the video, anything else is a failure.
pub fn finish_event(exit_success: bool, produced_frames: bool) -> DecoderEvent {
    if exit_success && produced_frames { DecoderEvent::Ended } else { DecoderEvent::Failed }
}

/// Turns decoder progress into element events. A video that is not being
/// presented never reaches its end, only the failure path stays live.
pub fn media_event(event: DecoderEvent, presenting: bool) -> Option<MediaEvent> {
    match event {
        DecoderEvent::FirstFrame => Some(MediaEvent::CanPlayThrough),
        DecoderEvent::Ended if presenting => Some(MediaEvent::Ended),
        DecoderEvent::Ended => None,
        DecoderEvent::Failed => Some(MediaEvent::Error),
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        // Stop decoding and reap the child
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_exit_after_frames_is_the_end() {
        assert_eq!(finish_event(true, true), DecoderEvent::Ended);
    }

    #[test]
    fn anything_else_is_a_failure() {
        assert_eq!(finish_event(true, false), DecoderEvent::Failed);
        assert_eq!(finish_event(false, true), DecoderEvent::Failed);
        assert_eq!(finish_event(false, false), DecoderEvent::Failed);
    }

    #[test]
    fn end_only_reported_while_presenting() {
        assert_eq!(media_event(DecoderEvent::Ended, true), Some(MediaEvent::Ended));
        assert_eq!(media_event(DecoderEvent::Ended, false), None);
        assert_eq!(media_event(DecoderEvent::FirstFrame, false), Some(MediaEvent::CanPlayThrough));
        assert_eq!(media_event(DecoderEvent::Failed, false), Some(MediaEvent::Error));
    }
}
