use std::time::Duration;

use tokio::sync::mpsc;

use super::alerts::engine::AlertEngine;
use super::alerts::model::{AlertEvent, AlertTrigger, SoundRequest};
use super::audio::player::SoundPlayer;
use super::config::SettingsSource;
use super::host::{Host, ObservesEvents};
use super::model::HostEvent;

/// Dispatches host events one at a time: engine decision first, then any
/// resulting alert goes to the player.
pub struct Coordinator<H, S, P> {
    engine: AlertEngine,
    host: H,
    settings: S,
    player: P,
    alerts_fired: u64,
}

impl<H, S, P> Coordinator<H, S, P>
where
    H: Host + ObservesEvents,
    S: SettingsSource,
    P: SoundPlayer,
{
    pub fn new(host: H, settings: S, player: P) -> Self {
        Self {
            engine: AlertEngine::new(),
            host,
            settings,
            player,
            alerts_fired: 0,
        }
    }

    pub fn dispatch(&mut self, event: &HostEvent, now_ms: i64) -> Option<AlertEvent> {
        // Settings are read per event so edits apply immediately
        let settings = self.settings.settings();
        let alert = self.engine.handle(event, &settings, &self.host, now_ms);

        // Mirror after deciding: the engine must see the pre-event directory
        self.host.observe(event);

        if let Some(alert) = &alert {
            self.alerts_fired += 1;
            self.player.play(&alert.sound);
        }
        alert
    }

    pub fn dispatch_now(&mut self, event: &HostEvent) -> Option<AlertEvent> {
        self.dispatch(event, chrono::Utc::now().timestamp_millis())
    }

    /// Play a trigger's configured sound without touching cooldowns.
    pub fn preview(&mut self, trigger: AlertTrigger) {
        let settings = self.settings.settings();
        let sound = SoundRequest::from(trigger.sound_settings(&settings));
        self.player.play(&sound);
    }

    /// Consume events until the channel closes, calling `on_tick` every
    /// `tick` in between (used for settings hot-reload).
    pub async fn run(
        &mut self,
        events: &mut mpsc::Receiver<HostEvent>,
        tick: Duration,
        mut on_tick: impl FnMut(),
    ) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    self.dispatch_now(&event);
                }
                _ = interval.tick() => on_tick(),
            }
        }
        log::info!("Event stream closed after {} alerts", self.alerts_fired);
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired
    }

    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Settings, SoundKind};
    use crate::core::host::{Directory, LocalHost};
    use crate::core::model::{Channel, ChannelKind};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingPlayer {
        played: Vec<SoundRequest>,
    }

    impl SoundPlayer for RecordingPlayer {
        fn play(&mut self, sound: &SoundRequest) {
            self.played.push(sound.clone());
        }
    }

    fn make_host() -> LocalHost {
        let mut host = LocalHost::new();
        host.set_current_user(Some("me".to_string()));
        host.insert_channel(
            "G1",
            Channel {
                id: "C1".to_string(),
                parent_id: None,
                name: "tickets".to_string(),
                topic: String::new(),
                kind: ChannelKind::CATEGORY,
            },
        );
        host
    }

    fn make_settings() -> Settings {
        let mut settings = Settings {
            watched_category_id: "C1".to_string(),
            ..Settings::default()
        };
        settings.new_channel_sound.cooldown_ms = 0;
        settings.message_sound.cooldown_ms = 0;
        settings
    }

    fn event(json: &str) -> HostEvent {
        HostEvent::from_json(json).unwrap()
    }

    #[test]
    fn test_create_plays_new_channel_sound() {
        let mut coordinator = Coordinator::new(make_host(), make_settings(), RecordingPlayer::default());

        let alert = coordinator.dispatch(
            &event(r#"{ "type": "CHANNEL_CREATE", "channel": { "id": "X", "parent_id": "C1", "type": 0 } }"#),
            1_000,
        );

        assert!(alert.is_some());
        assert_eq!(coordinator.player().played.len(), 1);
        assert_eq!(coordinator.player().played[0].kind, SoundKind::Chime);
        assert_eq!(
            coordinator.engine().throttle().last_fired(AlertTrigger::NewChannel),
            Some(1_000)
        );
        assert!(coordinator.host().channel("X").is_some());
    }

    #[test]
    fn test_category_create_plays_nothing() {
        let mut coordinator = Coordinator::new(make_host(), make_settings(), RecordingPlayer::default());
        coordinator.dispatch(
            &event(r#"{ "type": "CHANNEL_CREATE", "channel": { "id": "X", "parent_id": "C1", "type": 4 } }"#),
            1_000,
        );
        assert!(coordinator.player().played.is_empty());
        assert_eq!(coordinator.alerts_fired(), 0);
    }

    #[test]
    fn test_session_replay_with_focus_events() {
        let settings = Settings {
            only_when_unfocused: true,
            ..make_settings()
        };
        let mut coordinator = Coordinator::new(make_host(), settings, RecordingPlayer::default());

        // Channel appears, gets claimed, then messages arrive
        coordinator.dispatch(
            &event(r#"{ "type": "CHANNEL_CREATE", "channel": { "id": "T", "parent_id": "C1", "name": "ticket-1", "type": 0 } }"#),
            1,
        );
        coordinator.dispatch(
            &event(r#"{ "type": "CHANNEL_UPDATE", "channel": { "id": "T", "parent_id": "C1", "name": "ticket-1", "topic": "🧩 mine", "type": 0 } }"#),
            2,
        );
        let message = r#"{ "type": "MESSAGE_CREATE", "channelId": "T", "optimistic": false,
                           "message": { "author": { "id": "customer" }, "state": "SENT" } }"#;

        assert!(coordinator.dispatch(&event(message), 3).is_none(), "window focused");

        coordinator.dispatch(&event(r#"{ "type": "WINDOW_FOCUS", "focused": false }"#), 4);
        let alert = coordinator.dispatch(&event(message), 5).expect("alert fired");
        assert_eq!(alert.trigger, AlertTrigger::ClaimedMessage);

        let kinds: Vec<SoundKind> = coordinator.player().played.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SoundKind::Chime, SoundKind::Beep]);
    }

    #[test]
    fn test_settings_read_per_event() {
        let shared = Arc::new(Mutex::new(make_settings()));
        let mut coordinator =
            Coordinator::new(make_host(), Arc::clone(&shared), RecordingPlayer::default());
        let create = |id: &str| {
            event(&format!(
                r#"{{ "type": "CHANNEL_CREATE", "channel": {{ "id": "{}", "parent_id": "C1" }} }}"#,
                id
            ))
        };

        assert!(coordinator.dispatch(&create("A"), 1).is_some());
        shared.lock().unwrap().enabled = false;
        assert!(coordinator.dispatch(&create("B"), 2).is_none());
        shared.lock().unwrap().enabled = true;
        assert!(coordinator.dispatch(&create("C"), 3).is_some());
    }

    #[test]
    fn test_preview_skips_cooldown() {
        let mut settings = make_settings();
        settings.message_sound.kind = SoundKind::Custom;
        settings.message_sound.custom_url = "https://example.com/a.ogg".to_string();
        let mut coordinator = Coordinator::new(make_host(), settings, RecordingPlayer::default());

        coordinator.preview(AlertTrigger::ClaimedMessage);
        coordinator.preview(AlertTrigger::ClaimedMessage);

        assert_eq!(coordinator.player().played.len(), 2);
        assert_eq!(coordinator.player().played[0].custom_url, "https://example.com/a.ogg");
        assert_eq!(
            coordinator.engine().throttle().last_fired(AlertTrigger::ClaimedMessage),
            None
        );
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut coordinator = Coordinator::new(make_host(), make_settings(), RecordingPlayer::default());

        tx.send(event(r#"{ "type": "CHANNEL_CREATE", "channel": { "id": "X", "parent_id": "C1" } }"#))
            .await
            .unwrap();
        tx.send(event(r#"{ "type": "TYPING_START" }"#)).await.unwrap();
        drop(tx);

        let mut ticks = 0;
        coordinator
            .run(&mut rx, Duration::from_millis(50), || ticks += 1)
            .await;

        assert_eq!(coordinator.alerts_fired(), 1);
        assert_eq!(coordinator.player().played.len(), 1);
    }
}
