//! Runtime Layer
//!
//! Async engine, notification sinks, configuration and the front-end
//! protocol. This layer owns wall-clock time and timers; everything in
//! `game/` stays synchronous.

pub mod config;
pub mod notify;
pub mod engine;
pub mod protocol;

pub use config::{ClickerConfig, ConfigError};
pub use notify::{NotificationSink, TracingSink, ChannelSink};
pub use engine::{ClickerEngine, EngineError, EngineId};
pub use protocol::{Command, CommandError, Response, Snapshot, ClickReport, ParticleView, dispatch};
