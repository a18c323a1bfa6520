// Alert engine - decides per event whether a sound should play and keeps the
// session state (category snapshot, cooldowns) those decisions depend on.

use super::claim::is_claimed;
use super::model::{AlertEvent, AlertTrigger, SoundRequest};
use super::snapshot::CategorySnapshot;
use super::throttle::Throttle;
use crate::core::config::Settings;
use crate::core::host::{Directory, Host};
use crate::core::model::{Channel, ChannelPayload, HostEvent, MessagePayload, MessageState};

/// Session state for one user. Construct once at startup.
#[derive(Debug, Default)]
pub struct AlertEngine {
    snapshot: CategorySnapshot,
    throttle: Throttle,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &CategorySnapshot {
        &self.snapshot
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Route an event to its handler. Events that never alert return `None`.
    pub fn handle(
        &mut self,
        event: &HostEvent,
        settings: &Settings,
        host: &impl Host,
        now_ms: i64,
    ) -> Option<AlertEvent> {
        match event {
            HostEvent::ChannelCreate(payload) => {
                self.on_channel_created(payload, settings, host, now_ms)
            }
            HostEvent::ChannelUpdate(payload) => {
                self.on_channel_updated(payload, settings, host, now_ms)
            }
            HostEvent::MessageCreate(payload) => {
                self.on_message_created(payload, settings, host, now_ms)
            }
            HostEvent::WindowFocus(_) | HostEvent::ChannelSelect(_) | HostEvent::Other => None,
        }
    }

    pub fn on_channel_created(
        &mut self,
        payload: &ChannelPayload,
        settings: &Settings,
        directory: &impl Directory,
        now_ms: i64,
    ) -> Option<AlertEvent> {
        if !settings.enabled {
            return None;
        }
        self.snapshot
            .refresh_if_needed(&settings.watched_category_id, directory);

        let channel = payload.extract_channel()?;
        let watched = settings.watched_category_id.as_str();
        if watched.is_empty() {
            return None;
        }
        // Recorded even when no alert follows, or a later edit looks like a move-in
        self.snapshot
            .record(&channel.id, channel.parent_id.as_deref());

        if !settings.play_on_new_channel {
            return None;
        }
        if channel.parent_id.as_deref() != Some(watched) || channel.kind.is_category() {
            return None;
        }

        self.fire_new_channel(&channel, settings, now_ms)
    }

    pub fn on_channel_updated(
        &mut self,
        payload: &ChannelPayload,
        settings: &Settings,
        directory: &impl Directory,
        now_ms: i64,
    ) -> Option<AlertEvent> {
        if !settings.enabled {
            return None;
        }
        self.snapshot
            .refresh_if_needed(&settings.watched_category_id, directory);

        let channel = payload.extract_channel()?;
        let watched = settings.watched_category_id.as_str();
        if watched.is_empty() {
            return None;
        }

        let previous_parent = self.snapshot.parent_of(&channel.id).map(str::to_string);
        let next_parent = channel.parent_id.as_deref();
        // Bookkeeping happens before any gate so later transitions stay correct
        self.snapshot.record(&channel.id, next_parent);

        if !(settings.play_on_moved_into_category && settings.play_on_new_channel) {
            return None;
        }
        if previous_parent.as_deref() == Some(watched) {
            log::debug!("Channel {} already in watched category", channel.id);
            return None;
        }
        if next_parent != Some(watched) || channel.kind.is_category() {
            return None;
        }

        self.fire_new_channel(&channel, settings, now_ms)
    }

    pub fn on_message_created(
        &mut self,
        payload: &MessagePayload,
        settings: &Settings,
        host: &impl Host,
        now_ms: i64,
    ) -> Option<AlertEvent> {
        if !settings.enabled || payload.optimistic {
            return None;
        }
        let message = payload.message.as_ref()?;
        if message.state == MessageState::Sending {
            return None;
        }

        let author = &message.author;
        if settings.ignore_bots && author.bot {
            return None;
        }
        if settings.ignore_self {
            // Unknown current user never suppresses
            if let (Some(me), Some(author_id)) = (host.current_user_id(), author.id.as_deref()) {
                if me == author_id {
                    return None;
                }
            }
        }

        let channel_id = payload.channel_id.as_deref().filter(|id| !id.is_empty())?;
        if !message_alert_eligible(channel_id, settings, host) {
            return None;
        }

        let trigger = AlertTrigger::ClaimedMessage;
        let sound = trigger.sound_settings(settings);
        if !self.throttle.try_fire(trigger, now_ms, sound.cooldown_ms) {
            log::debug!("Message alert for {} throttled", channel_id);
            return None;
        }

        log::info!("Message in claimed channel {}", channel_id);
        Some(AlertEvent {
            trigger,
            channel_id: channel_id.to_string(),
            timestamp: now_ms,
            sound: SoundRequest::from(sound),
        })
    }

    fn fire_new_channel(
        &mut self,
        channel: &Channel,
        settings: &Settings,
        now_ms: i64,
    ) -> Option<AlertEvent> {
        let trigger = AlertTrigger::NewChannel;
        let sound = trigger.sound_settings(settings);
        if !self.throttle.try_fire(trigger, now_ms, sound.cooldown_ms) {
            log::debug!("New channel alert for {} throttled", channel.id);
            return None;
        }

        log::info!("Channel {} ({}) entered watched category", channel.id, channel.name);
        Some(AlertEvent {
            trigger,
            channel_id: channel.id.clone(),
            timestamp: now_ms,
            sound: SoundRequest::from(sound),
        })
    }
}

fn message_alert_eligible(channel_id: &str, settings: &Settings, host: &impl Host) -> bool {
    if !settings.play_on_claimed_message {
        return false;
    }
    if !is_claimed(channel_id, settings, host) {
        return false;
    }
    if settings.only_when_unfocused && host.is_window_focused() {
        return false;
    }
    if settings.mute_when_viewing_channel
        && host.viewed_channel_id().as_deref() == Some(channel_id)
    {
        return false;
    }
    true
}
