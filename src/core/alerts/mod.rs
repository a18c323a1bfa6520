// Alert decision core.
//
// Architecture:
// - model.rs: Triggers, sound requests and fired alerts
// - throttle.rs: Per-trigger cooldowns
// - snapshot.rs: Channel -> parent category record for move detection
// - claim.rs: Claim marker detection
// - engine.rs: Event handlers combining the above

pub mod claim;
pub mod engine;
pub mod model;
pub mod snapshot;
pub mod throttle;
