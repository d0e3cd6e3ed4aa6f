//! Core primitives.
//!
//! Pure functions and small value types with no runtime dependencies.

pub mod happiness;
pub mod rng;

// Re-export core types
pub use happiness::{happiness, progress_fraction, Mood, HAPPINESS_MAX};
pub use rng::NonceRng;
