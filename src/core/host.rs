//! Lookups into host-owned state.
//!
//! The alert engine never owns channel or guild data; it asks a [`Host`]
//! each time it needs something. [`LocalHost`] is an in-memory host fed from
//! a directory file and from the event stream itself.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::model::{Channel, ChannelId, GuildChannelList, HostEvent, UserId};

/// Read-only view of the host's channel and guild directory.
pub trait Directory {
    fn channel(&self, id: &str) -> Option<Channel>;
    /// Guild that owns the given category, if known
    fn guild_id_for_category(&self, category_id: &str) -> Option<String>;
    fn guild_channels(&self, guild_id: &str) -> GuildChannelList;
}

/// Per-session client state: who we are and what the user is looking at.
pub trait ClientState {
    fn current_user_id(&self) -> Option<UserId>;
    fn is_window_focused(&self) -> bool;
    fn viewed_channel_id(&self) -> Option<ChannelId>;
}

/// Everything the alert engine reads from the host.
pub trait Host: Directory + ClientState {}

impl<T: Directory + ClientState> Host for T {}

/// Hosts that keep their own state in step with the event stream.
pub trait ObservesEvents {
    fn observe(&mut self, event: &HostEvent);
}

/// Initial contents for a [`LocalHost`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectorySeed {
    pub current_user_id: Option<UserId>,
    /// guild id -> channels of that guild
    pub guilds: HashMap<String, Vec<Channel>>,
    pub focused: Option<bool>,
    pub viewed_channel_id: Option<ChannelId>,
}

/// In-memory host.
#[derive(Debug, Clone)]
pub struct LocalHost {
    channels: HashMap<ChannelId, Channel>,
    /// channel id -> owning guild id
    guild_of: HashMap<ChannelId, String>,
    current_user_id: Option<UserId>,
    focused: bool,
    viewed_channel_id: Option<ChannelId>,
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHost {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            guild_of: HashMap::new(),
            current_user_id: None,
            focused: true,
            viewed_channel_id: None,
        }
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        let mut host = Self::new();
        host.current_user_id = seed.current_user_id;
        host.focused = seed.focused.unwrap_or(true);
        host.viewed_channel_id = seed.viewed_channel_id;
        for (guild_id, channels) in seed.guilds {
            for channel in channels {
                host.insert_channel(&guild_id, channel);
            }
        }
        host
    }

    /// Load a directory seed from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading directory file {}", path.display()))?;
        let seed: DirectorySeed = serde_json::from_str(&content)
            .with_context(|| format!("parsing directory file {}", path.display()))?;
        Ok(Self::from_seed(seed))
    }

    pub fn insert_channel(&mut self, guild_id: &str, channel: Channel) {
        self.guild_of.insert(channel.id.clone(), guild_id.to_string());
        self.channels.insert(channel.id.clone(), channel);
    }

    pub fn set_current_user(&mut self, id: Option<UserId>) {
        self.current_user_id = id;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_viewed_channel(&mut self, id: Option<ChannelId>) {
        self.viewed_channel_id = id;
    }
}

impl Directory for LocalHost {
    fn channel(&self, id: &str) -> Option<Channel> {
        self.channels.get(id).cloned()
    }

    fn guild_id_for_category(&self, category_id: &str) -> Option<String> {
        self.guild_of.get(category_id).cloned()
    }

    fn guild_channels(&self, guild_id: &str) -> GuildChannelList {
        let mut channels: Vec<Channel> = self
            .guild_of
            .iter()
            .filter(|(_, guild)| guild.as_str() == guild_id)
            .filter_map(|(id, _)| self.channels.get(id).cloned())
            .collect();
        channels.sort_by(|a, b| a.id.cmp(&b.id));
        channels.into()
    }
}

impl ObservesEvents for LocalHost {
    /// Mirror host state changes carried by an event.
    ///
    /// Channel events update the table; a channel whose guild is unknown is
    /// placed in the guild of its parent category.
    fn observe(&mut self, event: &HostEvent) {
        match event {
            HostEvent::ChannelCreate(payload) | HostEvent::ChannelUpdate(payload) => {
                let Some(channel) = payload.extract_channel() else {
                    return;
                };
                let guild = self.guild_of.get(&channel.id).cloned().or_else(|| {
                    channel
                        .parent_id
                        .as_deref()
                        .and_then(|parent| self.guild_of.get(parent).cloned())
                });
                match guild {
                    Some(guild_id) => self.insert_channel(&guild_id, channel),
                    None => {
                        self.channels.insert(channel.id.clone(), channel);
                    }
                }
            }
            HostEvent::WindowFocus(payload) => self.focused = payload.focused,
            HostEvent::ChannelSelect(payload) => {
                self.viewed_channel_id = payload.channel_id.clone();
            }
            HostEvent::MessageCreate(_) | HostEvent::Other => {}
        }
    }
}

impl ClientState for LocalHost {
    fn current_user_id(&self) -> Option<UserId> {
        self.current_user_id.clone()
    }

    fn is_window_focused(&self) -> bool {
        self.focused
    }

    fn viewed_channel_id(&self) -> Option<ChannelId> {
        self.viewed_channel_id.clone()
    }
}
