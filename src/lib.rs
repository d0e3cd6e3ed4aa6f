//! # Happy Clicker
//!
//! Click counter engine with particle feedback, mood tiers and a static
//! leaderboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       HAPPY CLICKER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Pure primitives                         │
//! │  ├── happiness.rs  - Happiness derivation and mood tiers     │
//! │  └── rng.rs        - Xorshift128+ particle nonces            │
//! │                                                              │
//! │  game/             - Clicker state (synchronous)             │
//! │  ├── input.rs      - Pointer events and surface bounds       │
//! │  ├── session.rs    - Counter, total, click power             │
//! │  ├── particles.rs  - Live particle set                       │
//! │  ├── content.rs    - Leaderboard, tournaments, countdowns    │
//! │  └── events.rs     - Notifications and engine events         │
//! │                                                              │
//! │  runtime/          - Async shell (timers, I/O)               │
//! │  ├── engine.rs     - Serialized mutations, removal timers    │
//! │  ├── notify.rs     - Toast sinks                             │
//! │  ├── config.rs     - Environment configuration               │
//! │  └── protocol.rs   - Front-end commands and responses        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Model
//!
//! A session stores only `clicks`, `total_clicks` and `click_power`.
//! Happiness and mood are derived on every read, so a reset can never
//! leave them stale. Particles live for a fixed lifetime and are removed
//! exactly once, by their own timer or by the capacity bound.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use crate::core::happiness::{happiness, Mood};
pub use game::session::{Session, ClickOutcome};
pub use game::particles::{Particle, ParticleId, ParticleManager};
pub use game::content::{ContentSource, StaticContent, format_remaining};
pub use runtime::engine::ClickerEngine;
pub use runtime::config::ClickerConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
