//! Records delivered by the host and their validation.
//!
//! Host payloads arrive loosely shaped: most fields are optional and the
//! same channel can appear under different keys. Everything here is parsed
//! into owned, fully-populated types at the boundary; anything that does not
//! validate is dropped before it reaches the alert engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type ChannelId = String;
pub type UserId = String;

/// Channel type tag as sent by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ChannelKind(pub u8);

impl ChannelKind {
    pub const TEXT: Self = Self(0);
    pub const CATEGORY: Self = Self(4);

    /// Categories group other channels and never alert themselves.
    pub fn is_category(self) -> bool {
        self == Self::CATEGORY
    }
}

/// A validated channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    #[serde(default)]
    pub parent_id: Option<ChannelId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default)]
    pub kind: ChannelKind,
}

/// Channel as it appears in a host payload. Every field may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChannel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<u8>,
}

impl RawChannel {
    /// Returns `None` when the channel carries no usable id.
    pub fn validate(&self) -> Option<Channel> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        Some(Channel {
            id: id.to_string(),
            parent_id: self.parent_id.clone().filter(|p| !p.is_empty()),
            name: self.name.clone().unwrap_or_default(),
            topic: self.topic.clone().unwrap_or_default(),
            kind: ChannelKind(self.kind.unwrap_or_default()),
        })
    }
}

/// Payload of a channel create or update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPayload {
    #[serde(default)]
    pub channel: Option<RawChannel>,
    #[serde(default)]
    pub updated_channel: Option<RawChannel>,
}

impl ChannelPayload {
    /// The first of `channel` / `updatedChannel` that has an id.
    pub fn extract_channel(&self) -> Option<Channel> {
        [self.channel.as_ref(), self.updated_channel.as_ref()]
            .into_iter()
            .flatten()
            .find_map(RawChannel::validate)
    }
}

/// Delivery state of a message on the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageState {
    #[default]
    Sent,
    /// Queued locally, not yet accepted by the server
    Sending,
    SendFailed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub state: MessageState,
}

/// Payload of a new message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Local echo of our own send, not confirmed by the server
    #[serde(default)]
    pub optimistic: bool,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusPayload {
    #[serde(default)]
    pub focused: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSelectPayload {
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

/// Events delivered by the host, discriminated by their `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostEvent {
    ChannelCreate(ChannelPayload),
    ChannelUpdate(ChannelPayload),
    MessageCreate(MessagePayload),
    WindowFocus(FocusPayload),
    ChannelSelect(ChannelSelectPayload),
    #[serde(other)]
    Other,
}

impl HostEvent {
    /// Parse one JSON-encoded event.
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// One element of a guild channel listing: either the channel itself or
/// a wrapper object holding it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelEntry {
    Wrapped { channel: RawChannel },
    Bare(RawChannel),
}

impl ChannelEntry {
    fn raw(&self) -> &RawChannel {
        match self {
            Self::Wrapped { channel } | Self::Bare(channel) => channel,
        }
    }
}

/// A value inside a grouped listing. Groups sit next to bookkeeping fields
/// such as counts, which are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelGroup {
    Channels(Vec<ChannelEntry>),
    Other(serde_json::Value),
}

/// The channel listing of a guild. Hosts return either a flat list or
/// lists grouped by an arbitrary key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GuildChannelList {
    Flat(Vec<ChannelEntry>),
    Grouped(BTreeMap<String, ChannelGroup>),
}

impl Default for GuildChannelList {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl GuildChannelList {
    /// Flatten into validated channels, dropping entries without an id.
    pub fn into_channels(self) -> Vec<Channel> {
        let entries: Vec<ChannelEntry> = match self {
            Self::Flat(entries) => entries,
            Self::Grouped(groups) => groups
                .into_values()
                .filter_map(|group| match group {
                    ChannelGroup::Channels(entries) => Some(entries),
                    ChannelGroup::Other(_) => None,
                })
                .flatten()
                .collect(),
        };
        entries.iter().filter_map(|e| e.raw().validate()).collect()
    }
}

impl From<Vec<Channel>> for GuildChannelList {
    fn from(channels: Vec<Channel>) -> Self {
        Self::Flat(
            channels
                .into_iter()
                .map(|c| {
                    ChannelEntry::Bare(RawChannel {
                        id: Some(c.id),
                        parent_id: c.parent_id,
                        name: Some(c.name),
                        topic: Some(c.topic),
                        kind: Some(c.kind.0),
                    })
                })
                .collect(),
        )
    }
}
