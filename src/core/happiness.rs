//! Happiness Derivation
//!
//! Happiness is a pure function of the click counter. It is never stored,
//! only recomputed from `clicks` whenever someone reads it.

use serde::{Serialize, Deserialize};

/// Upper bound of the happiness scale (percent).
pub const HAPPINESS_MAX: u8 = 100;

/// Clicks needed to fill the happiness scale.
pub const CLICKS_FOR_FULL_HAPPINESS: u64 = 100;

/// Derive happiness (0-100) from the click counter.
///
/// `min(100, floor(clicks / 100 * 100))`, which for integer clicks is
/// simply `min(100, clicks)`.
#[inline]
pub fn happiness(clicks: u64) -> u8 {
    let scaled = clicks.saturating_mul(HAPPINESS_MAX as u64) / CLICKS_FOR_FULL_HAPPINESS;
    scaled.min(HAPPINESS_MAX as u64) as u8
}

/// Fraction of the progress bar to fill, in `[0.0, 1.0]`.
#[inline]
pub fn progress_fraction(happiness: u8) -> f64 {
    f64::from(happiness.min(HAPPINESS_MAX)) / f64::from(HAPPINESS_MAX)
}

// =============================================================================
// MOOD TIERS
// =============================================================================

/// Five-tier mood shown on the click button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
#[derive(Default)]
pub enum Mood {
    /// Below 20
    #[default]
    Neutral = 0,
    /// 20 to 39
    SlightSmile = 1,
    /// 40 to 59
    Smile = 2,
    /// 60 to 79
    BigSmile = 3,
    /// 80 and above
    Grin = 4,
}

impl Mood {
    /// Tier thresholds (exclusive upper bounds of the first four tiers).
    pub const THRESHOLDS: [u8; 4] = [20, 40, 60, 80];

    /// Map a happiness value onto its mood tier.
    pub fn from_happiness(happiness: u8) -> Mood {
        match happiness {
            h if h < Self::THRESHOLDS[0] => Mood::Neutral,
            h if h < Self::THRESHOLDS[1] => Mood::SlightSmile,
            h if h < Self::THRESHOLDS[2] => Mood::Smile,
            h if h < Self::THRESHOLDS[3] => Mood::BigSmile,
            _ => Mood::Grin,
        }
    }

    /// Mood for a raw click counter.
    #[inline]
    pub fn from_clicks(clicks: u64) -> Mood {
        Self::from_happiness(happiness(clicks))
    }

    /// Emoji rendered for this tier.
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Neutral => "😐",
            Mood::SlightSmile => "🙂",
            Mood::Smile => "😊",
            Mood::BigSmile => "😄",
            Mood::Grin => "😁",
        }
    }

    /// Next tier up (if not already at the top).
    pub fn next(self) -> Option<Mood> {
        match self {
            Mood::Neutral => Some(Mood::SlightSmile),
            Mood::SlightSmile => Some(Mood::Smile),
            Mood::Smile => Some(Mood::BigSmile),
            Mood::BigSmile => Some(Mood::Grin),
            Mood::Grin => None,
        }
    }
}
