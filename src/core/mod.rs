pub mod alerts;
pub mod audio;
pub mod config;
pub mod coordinator;
pub mod feed;
pub mod host;
pub mod model;
