//! Leaderboard and Tournament Content
//!
//! Read-only records shown next to the clicker. The default source is the
//! built-in set; a JSON file with the same shape can replace it.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Label shown for a tournament whose deadline has passed.
pub const FINISHED_LABEL: &str = "Завершён";

// =============================================================================
// RECORDS
// =============================================================================

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderEntry {
    /// Rank (dense from 1)
    pub rank: u32,
    /// Display name
    pub display_name: String,
    /// Clicks credited to this player
    pub click_count: u64,
    /// Avatar emoji
    pub avatar_glyph: String,
}

impl LeaderEntry {
    /// Podium placement for the top three ranks.
    pub fn podium(&self) -> Podium {
        match self.rank {
            1 => Podium::Gold,
            2 => Podium::Silver,
            3 => Podium::Bronze,
            _ => Podium::None,
        }
    }

    /// Click count with Russian digit grouping.
    pub fn formatted_clicks(&self) -> String {
        format_count(self.click_count)
    }
}

/// Podium highlight for a leaderboard row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Podium {
    /// First place
    Gold,
    /// Second place
    Silver,
    /// Third place
    Bronze,
    /// Everyone else
    None,
}

/// One tournament card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentEntry {
    /// Tournament name
    pub name: String,
    /// Deadline
    pub end_instant: DateTime<Utc>,
    /// Prize text
    pub prize_description: String,
    /// Number of participants
    pub participant_count: u32,
}

impl TournamentEntry {
    /// Check whether the deadline has passed at `now`.
    pub fn is_finished_at(&self, now: DateTime<Utc>) -> bool {
        self.end_instant < now
    }

    /// Countdown label relative to the current wall clock.
    pub fn remaining(&self) -> String {
        format_remaining(self.end_instant)
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Read-only provider of leaderboard and tournament records.
pub trait ContentSource: Send + Sync {
    /// Leaderboard, ordered by rank.
    fn leaders(&self) -> &[LeaderEntry];

    /// Tournament cards, in display order.
    fn tournaments(&self) -> &[TournamentEntry];
}

/// Content errors.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Failed to read the content file.
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    /// Content file is not valid JSON for the expected shape.
    #[error("invalid content file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Ranks are not dense from 1 in list order.
    #[error("rank {found} at position {position}, expected {expected}")]
    RankGap {
        /// Zero-based position in the list
        position: usize,
        /// Rank the position requires
        expected: u32,
        /// Rank actually present
        found: u32,
    },

    /// A lower rank has more clicks than a higher one.
    #[error("rank {rank} has {clicks} clicks, more than rank {previous_rank}")]
    OrderViolation {
        /// Offending rank
        rank: u32,
        /// Its click count
        clicks: u64,
        /// Rank right above it
        previous_rank: u32,
    },

    /// A tournament deadline offset does not fit the calendar.
    #[error("tournament {name:?} ends out of range")]
    DeadlineOutOfRange {
        /// Tournament name
        name: String,
    },
}

/// In-memory content, fixed at construction.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StaticContent {
    leaders: Vec<LeaderEntry>,
    tournaments: Vec<TournamentEntry>,
}

impl StaticContent {
    /// Build content from explicit records, validating the leaderboard.
    pub fn new(
        leaders: Vec<LeaderEntry>,
        tournaments: Vec<TournamentEntry>,
    ) -> Result<Self, ContentError> {
        validate_leaders(&leaders)?;
        Ok(Self { leaders, tournaments })
    }

    /// Built-in records. Tournament deadlines are `now + 3h` and `now + 24h`.
    pub fn builtin(now: DateTime<Utc>) -> Self {
        let leaders = [
            (1, "Патриот2024", 15420, "🇷🇺"),
            (2, "ВладимирВ", 12350, "⭐"),
            (3, "Россиянин", 10890, "🏆"),
            (4, "Победа", 9540, "🎖️"),
            (5, "Сила", 8720, "💪"),
        ]
        .into_iter()
        .map(|(rank, name, clicks, avatar)| LeaderEntry {
            rank,
            display_name: name.to_string(),
            click_count: clicks,
            avatar_glyph: avatar.to_string(),
        })
        .collect();

        let tournaments = vec![
            TournamentEntry {
                name: "Весенний рывок".to_string(),
                end_instant: now + Duration::hours(3),
                prize_description: "🏅 Золотая медаль".to_string(),
                participant_count: 156,
            },
            TournamentEntry {
                name: "Патриотический марафон".to_string(),
                end_instant: now + Duration::hours(24),
                prize_description: "🎁 Эксклюзивный значок".to_string(),
                participant_count: 342,
            },
        ];

        Self { leaders, tournaments }
    }

    /// Parse content from JSON. Tournament deadlines are offsets from `now`.
    pub fn from_json(json: &str, now: DateTime<Utc>) -> Result<Self, ContentError> {
        let file: ContentFile = serde_json::from_str(json)?;
        let tournaments = file
            .tournaments
            .into_iter()
            .map(|t| {
                let end_instant = Duration::try_minutes(t.ends_in_minutes)
                    .and_then(|offset| now.checked_add_signed(offset))
                    .ok_or_else(|| ContentError::DeadlineOutOfRange { name: t.name.clone() })?;
                Ok(TournamentEntry {
                    name: t.name,
                    end_instant,
                    prize_description: t.prize_description,
                    participant_count: t.participant_count,
                })
            })
            .collect::<Result<Vec<_>, ContentError>>()?;
        Self::new(file.leaders, tournaments)
    }

    /// Load content from a JSON file.
    pub fn load(path: impl AsRef<Path>, now: DateTime<Utc>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, now)
    }

    /// Tournaments still running at `now`.
    pub fn active_tournaments(&self, now: DateTime<Utc>) -> impl Iterator<Item = &TournamentEntry> {
        self.tournaments.iter().filter(move |t| !t.is_finished_at(now))
    }
}

impl ContentSource for StaticContent {
    fn leaders(&self) -> &[LeaderEntry] {
        &self.leaders
    }

    fn tournaments(&self) -> &[TournamentEntry] {
        &self.tournaments
    }
}

/// On-disk shape of a content file.
#[derive(Debug, Deserialize)]
struct ContentFile {
    leaders: Vec<LeaderEntry>,
    #[serde(default)]
    tournaments: Vec<TournamentRecord>,
}

#[derive(Debug, Deserialize)]
struct TournamentRecord {
    name: String,
    ends_in_minutes: i64,
    prize_description: String,
    #[serde(default)]
    participant_count: u32,
}

/// Check that ranks run 1, 2, 3, ... in list order and click counts never
/// increase down the list.
pub fn validate_leaders(leaders: &[LeaderEntry]) -> Result<(), ContentError> {
    for (position, leader) in leaders.iter().enumerate() {
        let expected = position as u32 + 1;
        if leader.rank != expected {
            return Err(ContentError::RankGap {
                position,
                expected,
                found: leader.rank,
            });
        }
    }

    for pair in leaders.windows(2) {
        if pair[1].click_count > pair[0].click_count {
            return Err(ContentError::OrderViolation {
                rank: pair[1].rank,
                clicks: pair[1].click_count,
                previous_rank: pair[0].rank,
            });
        }
    }

    Ok(())
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Countdown label relative to the current wall clock.
pub fn format_remaining(end: DateTime<Utc>) -> String {
    format_remaining_at(end, Utc::now())
}

/// Countdown label `"{hours}ч {minutes}м"` (both floored).
///
/// A deadline in the past renders as [`FINISHED_LABEL`]; exactly at the
/// deadline it is `"0ч 0м"`.
pub fn format_remaining_at(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if end < now {
        return FINISHED_LABEL.to_string();
    }
    let diff = end.signed_duration_since(now).num_seconds();
    let hours = diff / 3600;
    let minutes = (diff % 3600) / 60;
    format!("{}ч {}м", hours, minutes)
}

/// Group digits in threes with a non-breaking space (`15 420`).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{a0}');
        }
        out.push(ch);
    }
    out
}
