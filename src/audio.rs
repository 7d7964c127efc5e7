use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use lewton::inside_ogg::OggStreamReader;
use thiserror::Error;

use crate::constants::{BASE_VOLUME, CH_UI, KEY_AUDIO_ENABLED, SE_CONFIRM};
use crate::store::KvStore;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("ogg decode failed: {0}")]
    Vorbis(#[from] lewton::VorbisError),
}

/// Decodes a complete ogg/vorbis stream into interleaved i16 samples.
pub fn decode_ogg(bytes: &[u8]) -> Result<Vec<i16>, DecodeError> {
    let mut reader = OggStreamReader::new(std::io::Cursor::new(bytes))?;
    let mut buffer = Vec::new();
    while let Some(pck_samples) = reader.read_dec_packet_itl()? {
        for sample in pck_samples {
            buffer.push(sample);
        }
    }
    Ok(buffer)
}

struct Playback {
    buffer: Arc<Vec<i16>>,
    index: usize,
}

/// Fixed set of playback channels over a preloaded sound catalog.
///
/// The catalog is filled once through `install` before the runtime loop
/// starts and is immutable afterwards. The channel slots and the enable
/// flag are shared with the audio output thread, which drains them
/// through `poll`.
pub struct AudioChannels {
    catalog: HashMap<String, Arc<Vec<i16>>>,
    channels: Mutex<Vec<Option<Playback>>>,
    enabled: AtomicBool,
}

impl AudioChannels {
    pub fn new<S: KvStore>(channel_count: usize, store: &S) -> AudioChannels {
        let enabled = match store.get(KEY_AUDIO_ENABLED) {
            Some(value) => value != "0",
            None => true,
        };
        AudioChannels {
            catalog: HashMap::new(),
            channels: Mutex::new((0..channel_count).map(|_| None).collect()),
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Installs one preloaded asset. A failed asset is logged and kept
    /// as an empty buffer so later play requests for it stay silent.
    pub fn install(&mut self, name: &str, samples: Result<Vec<i16>, DecodeError>) {
        let buffer = match samples {
            Ok(samples) => samples,
            Err(e) => {
                log::warn!("failed to load sound {}: {}", name, e);
                Vec::new()
            }
        };
        self.catalog.insert(name.to_string(), Arc::new(buffer));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Starts `name` on `channel`, replacing whatever the slot was
    /// playing. Disabled audio, an unknown name, an empty buffer or an
    /// out-of-range channel make this a no-op.
    pub fn play_se(&self, channel: u32, name: &str) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        let buffer = match self.catalog.get(name) {
            Some(buffer) => buffer,
            None => {
                log::warn!("unknown sound effect: {}", name);
                return;
            }
        };
        if buffer.is_empty() {
            return;
        }
        let mut channels = self.channels.lock().unwrap();
        match channels.get_mut(channel as usize) {
            Some(slot) => {
                *slot = Some(Playback {
                    buffer: buffer.clone(),
                    index: 0,
                });
            }
            None => log::warn!("sound channel {} out of range", channel),
        }
    }

    /// Flips the enable flag, persists it, and returns the new state.
    /// Enabling plays the confirmation sound so the change is audible.
    pub fn toggle_enabled<S: KvStore>(&self, store: &mut S) -> bool {
        let enabled = !self.enabled.load(Ordering::Relaxed);
        self.enabled.store(enabled, Ordering::Relaxed);
        store.set(KEY_AUDIO_ENABLED, if enabled { "1" } else { "0" });
        if enabled {
            self.play_se(CH_UI, SE_CONFIRM);
        }
        enabled
    }

    /// Mixes every active channel into `out`, advancing playback
    /// positions and clearing channels that finish. Called from the
    /// audio output thread with a zeroed buffer.
    pub fn poll(&self, out: &mut [i16]) {
        let mut channels = self.channels.lock().unwrap();
        for slot in channels.iter_mut() {
            let finished = match slot {
                Some(playback) => {
                    let remaining = playback.buffer.len() - playback.index;
                    let count = out.len().min(remaining);
                    for i in 0..count {
                        let sample =
                            (playback.buffer[playback.index + i] as f32 * BASE_VOLUME) as i16;
                        out[i] = out[i].saturating_add(sample);
                    }
                    playback.index += count;
                    playback.index >= playback.buffer.len()
                }
                None => false,
            };
            if finished {
                *slot = None;
            }
        }
    }
}
