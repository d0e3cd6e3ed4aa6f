//! Clicker Logic Module
//!
//! Synchronous state: counters, particles, content, events.
//!
//! ## Module Structure
//!
//! - `input`: Pointer coordinates and the clickable surface
//! - `session`: Click counter, total and click power
//! - `particles`: Live particle set and its lifecycle
//! - `content`: Leaderboard, tournaments, countdown formatting
//! - `events`: Notifications and engine events

pub mod input;
pub mod session;
pub mod particles;
pub mod content;
pub mod events;

// Re-export key types
pub use input::{PointerEvent, SurfaceRect};
pub use session::{Session, ClickOutcome};
pub use particles::{Particle, ParticleId, ParticleManager, PARTICLE_LIFETIME};
pub use content::{ContentSource, StaticContent, LeaderEntry, TournamentEntry, ContentError};
pub use events::{EngineEvent, Notification, NotificationKind};
