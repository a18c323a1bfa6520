//! Sound playback.
//!
//! Playback is fire-and-forget: [`SoundPlayer::play`] returns nothing and
//! failures are logged, never reported back to the caller.

use std::io::Cursor;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use super::synth::{Tone, BEEP, CHIME};
use crate::core::alerts::model::SoundRequest;
use crate::core::config::SoundKind;

/// One-way playback effect.
pub trait SoundPlayer {
    fn play(&mut self, sound: &SoundRequest);
}

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("failed to fetch {url}: {source}")]
    Fetch { url: String, source: ureq::Error },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("failed to open audio output: {0}")]
    Output(#[from] rodio::StreamError),
}

/// Where a custom sound comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomSource {
    Http(String),
    File(String),
}

impl CustomSource {
    /// `None` for blank URLs.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Some(Self::Http(url.to_string()));
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        Some(Self::File(path.to_string()))
    }

    fn load(&self) -> Result<Vec<u8>, PlaybackError> {
        match self {
            Self::Http(url) => {
                let fetch_err = |source| PlaybackError::Fetch {
                    url: url.clone(),
                    source,
                };
                let mut response = ureq::get(url).call().map_err(fetch_err)?;
                response.body_mut().read_to_vec().map_err(fetch_err)
            }
            Self::File(path) => std::fs::read(Path::new(path)).map_err(|source| PlaybackError::Read {
                path: path.clone(),
                source,
            }),
        }
    }
}

/// Player backed by the default audio device.
///
/// All sounds share one output stream, opened on first use and kept for the
/// lifetime of the player. Custom sounds are fetched and decoded on a short
/// worker thread, then handed to the shared mixer.
pub struct RodioPlayer {
    stream: Option<OutputStream>,
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the default output without rodio's drop message on stderr.
pub fn open_output() -> Result<OutputStream, PlaybackError> {
    let mut stream = OutputStreamBuilder::open_default_stream()?;
    stream.log_on_drop(false);
    Ok(stream)
}

impl RodioPlayer {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn output(&mut self) -> Option<&OutputStream> {
        if self.stream.is_none() {
            match open_output() {
                Ok(stream) => self.stream = Some(stream),
                Err(e) => {
                    log::warn!("{}", e);
                    return None;
                }
            }
        }
        self.stream.as_ref()
    }

    fn play_tone(&mut self, tone: Tone) {
        if let Some(stream) = self.output() {
            stream.mixer().add(tone);
        }
    }

    fn play_custom(&mut self, url: &str, volume: f32) {
        let Some(source) = CustomSource::parse(url) else {
            return;
        };
        let Some(stream) = self.output() else {
            return;
        };
        let mixer = stream.mixer().clone();
        let volume = clamp_volume(volume);

        // The worker only loads and decodes; playback runs on the shared mixer
        std::thread::spawn(move || match load_custom(&source) {
            Ok(decoder) => {
                let sink = Sink::connect_new(&mixer);
                sink.set_volume(volume);
                sink.append(decoder);
                sink.detach();
            }
            Err(e) => log::warn!("Custom sound not played: {}", e),
        });
    }
}

/// Fetch and decode a custom sound.
pub fn load_custom(source: &CustomSource) -> Result<Decoder<Cursor<Vec<u8>>>, PlaybackError> {
    let bytes = source.load()?;
    Ok(Decoder::new(Cursor::new(bytes))?)
}

/// Volume for decoded sounds, in [0, 1].
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

impl SoundPlayer for RodioPlayer {
    fn play(&mut self, sound: &SoundRequest) {
        match sound.kind {
            SoundKind::None => {}
            SoundKind::Beep => self.play_tone(Tone::new(BEEP, sound.volume)),
            SoundKind::Chime => self.play_tone(Tone::new(CHIME, sound.volume)),
            SoundKind::Custom => self.play_custom(&sound.custom_url, sound.volume),
        }
    }
}
