// Per-trigger cooldown tracking.

use super::model::AlertTrigger;

/// True when a fire at `now_ms` falls inside the cooldown that started at
/// `last_fired_at_ms`. Negative cooldowns count as zero.
pub fn should_throttle(now_ms: i64, last_fired_at_ms: i64, cooldown_ms: i64) -> bool {
    let cooldown = cooldown_ms.max(0);
    now_ms.saturating_sub(last_fired_at_ms) < cooldown
}

/// Last fire time of each trigger. `None` means the trigger never fired.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    new_channel_at: Option<i64>,
    message_at: Option<i64>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fired(&self, trigger: AlertTrigger) -> Option<i64> {
        match trigger {
            AlertTrigger::NewChannel => self.new_channel_at,
            AlertTrigger::ClaimedMessage => self.message_at,
        }
    }

    pub fn is_throttled(&self, trigger: AlertTrigger, now_ms: i64, cooldown_ms: i64) -> bool {
        self.last_fired(trigger)
            .is_some_and(|last| should_throttle(now_ms, last, cooldown_ms))
    }

    /// Stamp a fire. Only call right before the sound is actually played.
    pub fn record(&mut self, trigger: AlertTrigger, now_ms: i64) {
        let slot = match trigger {
            AlertTrigger::NewChannel => &mut self.new_channel_at,
            AlertTrigger::ClaimedMessage => &mut self.message_at,
        };
        // Never move backwards
        *slot = Some(slot.map_or(now_ms, |last| last.max(now_ms)));
    }

    /// Check and stamp in one step. Returns true if the fire may proceed.
    pub fn try_fire(&mut self, trigger: AlertTrigger, now_ms: i64, cooldown_ms: i64) -> bool {
        if self.is_throttled(trigger, now_ms, cooldown_ms) {
            return false;
        }
        self.record(trigger, now_ms);
        true
    }
}
