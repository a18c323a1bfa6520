// Alert model types for triggers and fired alerts.

use serde::Serialize;

use crate::core::config::{Settings, SoundKind, SoundSettings};
use crate::core::model::ChannelId;

/// The two alert categories. Each has its own sound and cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertTrigger {
    /// A channel appeared in, or moved into, the watched category
    NewChannel,
    /// A message arrived in a claimed channel
    ClaimedMessage,
}

impl AlertTrigger {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NewChannel => "New Channel",
            Self::ClaimedMessage => "Claimed Message",
        }
    }

    pub fn all() -> &'static [AlertTrigger] {
        &[Self::NewChannel, Self::ClaimedMessage]
    }

    pub fn sound_settings<'a>(&self, settings: &'a Settings) -> &'a SoundSettings {
        match self {
            Self::NewChannel => &settings.new_channel_sound,
            Self::ClaimedMessage => &settings.message_sound,
        }
    }
}

/// What to play. Built from the trigger's sound settings at fire time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundRequest {
    pub kind: SoundKind,
    pub custom_url: String,
    pub volume: f32,
}

impl From<&SoundSettings> for SoundRequest {
    fn from(sound: &SoundSettings) -> Self {
        Self {
            kind: sound.kind,
            custom_url: sound.custom_url.clone(),
            volume: sound.volume,
        }
    }
}

/// Alert fired by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub trigger: AlertTrigger,
    pub channel_id: ChannelId,
    /// Unix milliseconds
    pub timestamp: i64,
    pub sound: SoundRequest,
}
