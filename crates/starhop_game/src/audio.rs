//! Best-effort sound playback via rodio. Audio is strictly cosmetic here: a
//! missing output device or an unreadable file downgrades the bank to a no-op
//! with a logged warning, never an error the game loop has to handle.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

pub struct SoundBank {
    /// None when no output device could be opened; playback no-ops.
    output: Option<(OutputStream, OutputStreamHandle)>,
    /// Decoded-on-play: sounds are stored as raw file bytes and decoded into a
    /// fresh Sink each play, so overlapping plays mix naturally.
    sounds: HashMap<String, Vec<u8>>,
}

impl SoundBank {
    pub fn new() -> Self {
        let output = match OutputStream::try_default() {
            Ok(pair) => Some(pair),
            Err(err) => {
                log::warn!("No audio output device: {err}. Sound disabled.");
                None
            }
        };
        Self {
            output,
            sounds: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: &str, path: &Path) {
        match std::fs::read(path) {
            Ok(bytes) => {
                self.sounds.insert(key.to_string(), bytes);
            }
            Err(err) => {
                log::warn!(
                    "Failed to read sound '{key}' from {}: {err}. It will not play.",
                    path.display()
                );
            }
        }
    }

    /// Fire-and-forget playback. The sink is detached so the sound finishes
    /// on its own without the bank tracking it.
    pub fn play(&self, key: &str) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        let Some(bytes) = self.sounds.get(key) else {
            log::warn!("Unknown sound key '{key}'");
            return;
        };
        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(err) => {
                log::warn!("Failed to open audio sink: {err}");
                return;
            }
        };
        match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(source) => {
                sink.append(source);
                sink.detach();
            }
            Err(err) => {
                log::warn!("Failed to decode sound '{key}': {err}");
            }
        }
    }
}

impl Default for SoundBank {
    fn default() -> Self {
        Self::new()
    }
}
