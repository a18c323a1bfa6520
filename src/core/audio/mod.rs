//! Alert sounds: synthesized tones and user-supplied files.

pub mod player;
pub mod synth;
