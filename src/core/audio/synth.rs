//! Short synthesized alert tones.

use std::f32::consts::TAU;
use std::time::Duration;

use rodio::Source;

pub const SAMPLE_RATE: u32 = 44_100;

/// Lowest gain used by the envelope. The decay is exponential, which can
/// never start from or reach exactly zero.
pub const MIN_GAIN: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    /// Sample at `phase` in [0, 1).
    fn sample(self, phase: f32) -> f32 {
        match self {
            Self::Sine => (phase * TAU).sin(),
            Self::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    /// Pitch reached at the end, swept exponentially from `start_hz`
    pub end_hz: f32,
    pub duration_ms: u32,
    pub attack_ms: u32,
}

pub const BEEP: ToneSpec = ToneSpec {
    waveform: Waveform::Sine,
    start_hz: 880.0,
    end_hz: 880.0,
    duration_ms: 200,
    attack_ms: 10,
};

pub const CHIME: ToneSpec = ToneSpec {
    waveform: Waveform::Triangle,
    start_hz: 660.0,
    end_hz: 1320.0,
    duration_ms: 400,
    attack_ms: 20,
};

/// Mono tone with a linear attack and an exponential decay to [`MIN_GAIN`].
#[derive(Debug, Clone)]
pub struct Tone {
    spec: ToneSpec,
    peak: f32,
    total_samples: usize,
    attack_samples: usize,
    position: usize,
    phase: f32,
}

impl Tone {
    pub fn new(spec: ToneSpec, volume: f32) -> Self {
        let total_samples = (SAMPLE_RATE as usize * spec.duration_ms as usize / 1000).max(1);
        let attack_samples =
            (SAMPLE_RATE as usize * spec.attack_ms as usize / 1000).clamp(1, total_samples);
        Self {
            spec,
            peak: clamp_tone_volume(volume),
            total_samples,
            attack_samples,
            position: 0,
            phase: 0.0,
        }
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    fn gain_at(&self, position: usize) -> f32 {
        if position < self.attack_samples {
            let t = position as f32 / self.attack_samples as f32;
            return MIN_GAIN + (self.peak - MIN_GAIN) * t;
        }
        let decay_len = (self.total_samples - self.attack_samples).max(1) as f32;
        let t = (position - self.attack_samples) as f32 / decay_len;
        self.peak * (MIN_GAIN / self.peak).powf(t)
    }

    fn frequency_at(&self, position: usize) -> f32 {
        let t = position as f32 / self.total_samples as f32;
        self.spec.start_hz * (self.spec.end_hz / self.spec.start_hz).powf(t)
    }
}

/// Tone volume: at most 1, and never below [`MIN_GAIN`].
pub fn clamp_tone_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return MIN_GAIN;
    }
    volume.clamp(MIN_GAIN, 1.0)
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.total_samples {
            return None;
        }
        let value = self.spec.waveform.sample(self.phase) * self.gain_at(self.position);
        self.phase = (self.phase + self.frequency_at(self.position) / SAMPLE_RATE as f32).fract();
        self.position += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_samples - self.position;
        (remaining, Some(remaining))
    }
}

impl Source for Tone {
    fn current_span_len(&self) -> Option<usize> {
        Some(self.total_samples - self.position)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(u64::from(self.spec.duration_ms)))
    }
}
