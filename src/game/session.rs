//! Click Session State
//!
//! The counter engine: click count, lifetime total and click power.
//! Happiness is derived on read and never stored, so it cannot drift from
//! the counter.

use serde::{Serialize, Deserialize};

use crate::core::happiness::{happiness, Mood};

/// Default spacing of congratulation milestones (in clicks).
pub const DEFAULT_MILESTONE_INTERVAL: u64 = 50;

/// Result of applying one click.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOutcome {
    /// Amount added to both counters
    pub added: u64,
    /// Click counter after the click
    pub clicks: u64,
    /// Lifetime total after the click
    pub total_clicks: u64,
    /// Set when the post-click counter is a positive multiple of the interval
    pub milestone: Option<u64>,
}

/// Per-session counter state.
///
/// Built only through the constructors below; `click_power` is always at
/// least 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Current click counter (resettable)
    clicks: u64,
    /// Lifetime total for the session (never decreases)
    total_clicks: u64,
    /// Amount added per click (always >= 1)
    click_power: u64,
    /// Milestone spacing
    milestone_interval: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session: zero counters, power 1.
    pub fn new() -> Self {
        Self::with_milestone_interval(DEFAULT_MILESTONE_INTERVAL)
    }

    /// Fresh session with a custom milestone interval (0 is treated as 1).
    pub fn with_milestone_interval(interval: u64) -> Self {
        Self {
            clicks: 0,
            total_clicks: 0,
            click_power: 1,
            milestone_interval: interval.max(1),
        }
    }

    /// Current click counter.
    #[inline]
    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    /// Lifetime total.
    #[inline]
    pub fn total_clicks(&self) -> u64 {
        self.total_clicks
    }

    /// Current click power.
    #[inline]
    pub fn click_power(&self) -> u64 {
        self.click_power
    }

    /// Happiness derived from the click counter.
    #[inline]
    pub fn happiness(&self) -> u8 {
        happiness(self.clicks)
    }

    /// Mood tier derived from happiness.
    #[inline]
    pub fn mood(&self) -> Mood {
        Mood::from_happiness(self.happiness())
    }

    /// Milestone spacing in use.
    pub fn milestone_interval(&self) -> u64 {
        self.milestone_interval
    }

    /// Apply one click at the current power.
    pub fn apply_click(&mut self) -> ClickOutcome {
        let added = self.click_power;
        self.clicks = self.clicks.saturating_add(added);
        self.total_clicks = self.total_clicks.saturating_add(added);

        let milestone = if self.is_milestone(self.clicks) {
            Some(self.clicks)
        } else {
            None
        };

        ClickOutcome {
            added,
            clicks: self.clicks,
            total_clicks: self.total_clicks,
            milestone,
        }
    }

    /// Raise click power by one. Returns the new power.
    pub fn increase_power(&mut self) -> u64 {
        self.click_power = self.click_power.saturating_add(1);
        self.click_power
    }

    /// Zero the click counter. Total and power are kept.
    pub fn reset(&mut self) {
        self.clicks = 0;
    }

    /// Check whether a counter value is a positive multiple of the interval.
    #[inline]
    pub fn is_milestone(&self, clicks: u64) -> bool {
        clicks > 0 && clicks % self.milestone_interval == 0
    }
}
