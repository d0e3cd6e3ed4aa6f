//! Front-End Protocol
//!
//! Line-oriented command/response format used by the terminal front end.
//! Commands are accepted as JSON or as short text; responses are always
//! JSON, one per line.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tokio::time::Instant;

use crate::core::happiness::{progress_fraction, Mood};
use crate::game::content::{format_count, format_remaining_at, ContentSource, Podium};
use crate::game::events::{EngineEvent, Notification};
use crate::game::input::{PointerEvent, SurfaceRect};
use crate::game::particles::{Particle, ParticleId};
use crate::game::session::{ClickOutcome, Session};
use crate::runtime::engine::{ClickerEngine, EngineError};

// =============================================================================
// FRONT END -> ENGINE
// =============================================================================

/// Commands accepted by the engine front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Click the button.
    Click {
        /// Viewport X (defaults to the surface center)
        #[serde(default)]
        client_x: Option<f64>,
        /// Viewport Y (defaults to the surface center)
        #[serde(default)]
        client_y: Option<f64>,
        /// Surface bounds (defaults to the stock button)
        #[serde(default)]
        surface: Option<SurfaceRect>,
    },

    /// Raise click power by one.
    Upgrade,

    /// Zero the click counter.
    Reset,

    /// Report current state.
    State,

    /// List the leaderboard.
    Leaders,

    /// List tournaments with countdowns.
    Tournaments,

    /// End the session.
    Quit,
}

/// Command parse errors.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Line looked like JSON but did not parse.
    #[error("invalid command JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown text command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// Text command with a bad argument.
    #[error("invalid argument for {command}: {argument:?}")]
    InvalidArgument {
        /// Command name
        command: &'static str,
        /// Offending argument
        argument: String,
    },
}

impl Command {
    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Parse one input line, JSON or text.
    ///
    /// Text forms: `click [X Y]`, `upgrade`, `reset`, `state`, `leaders`,
    /// `tournaments`, `quit`.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.starts_with('{') {
            return Ok(Self::from_json(line)?);
        }

        let mut parts = line.split_whitespace();
        let word = parts.next().unwrap_or_default().to_lowercase();
        match word.as_str() {
            "click" | "c" => {
                let coord = |raw: Option<&str>| -> Result<Option<f64>, CommandError> {
                    raw.map(|v| {
                        v.parse::<f64>().map_err(|_| CommandError::InvalidArgument {
                            command: "click",
                            argument: v.to_string(),
                        })
                    })
                    .transpose()
                };
                let client_x = coord(parts.next())?;
                let client_y = coord(parts.next())?;
                Ok(Command::Click { client_x, client_y, surface: None })
            }
            "upgrade" | "power" | "u" => Ok(Command::Upgrade),
            "reset" | "r" => Ok(Command::Reset),
            "state" | "s" => Ok(Command::State),
            "leaders" => Ok(Command::Leaders),
            "tournaments" => Ok(Command::Tournaments),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}

// =============================================================================
// ENGINE -> FRONT END
// =============================================================================

/// A live particle as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    /// Particle id
    pub id: ParticleId,
    /// Offset from the surface's left edge
    pub x: f64,
    /// Offset from the surface's top edge
    pub y: f64,
    /// Floating label ("+N")
    pub label: String,
    /// Age in milliseconds
    pub age_ms: u64,
}

impl ParticleView {
    /// View of a particle at `now`.
    pub fn from_particle(particle: &Particle, now: Instant) -> Self {
        Self {
            id: particle.id,
            x: particle.x,
            y: particle.y,
            label: particle.label(),
            age_ms: particle.age(now).as_millis() as u64,
        }
    }
}

/// Everything the presentation layer renders for the clicker card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Click counter
    pub clicks: u64,
    /// Lifetime total
    pub total_clicks: u64,
    /// Click power
    pub click_power: u64,
    /// Happiness (0-100)
    pub happiness: u8,
    /// Mood tier
    pub mood: Mood,
    /// Mood emoji
    pub emoji: String,
    /// Progress bar fill (0.0-1.0)
    pub progress: f64,
    /// Live particles in spawn order
    pub particles: Vec<ParticleView>,
}

impl Snapshot {
    /// Capture session and particles at `now`.
    pub fn capture<'a>(
        session: &Session,
        particles: impl Iterator<Item = &'a Particle>,
        now: Instant,
    ) -> Self {
        let happiness = session.happiness();
        let mood = session.mood();
        Self {
            clicks: session.clicks(),
            total_clicks: session.total_clicks(),
            click_power: session.click_power(),
            happiness,
            mood,
            emoji: mood.emoji().to_string(),
            progress: progress_fraction(happiness),
            particles: particles.map(|p| ParticleView::from_particle(p, now)).collect(),
        }
    }
}

/// Result of a click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickReport {
    /// Counter changes
    pub outcome: ClickOutcome,
    /// Spawned particle
    pub particle: ParticleView,
}

/// Leaderboard row for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderView {
    /// Rank
    pub rank: u32,
    /// Display name
    pub name: String,
    /// Avatar emoji
    pub avatar: String,
    /// Raw click count
    pub click_count: u64,
    /// Grouped click count ("15 420")
    pub clicks: String,
    /// Podium highlight
    pub podium: Podium,
}

/// Tournament card for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentView {
    /// Tournament name
    pub name: String,
    /// Countdown label
    pub remaining: String,
    /// Deadline passed
    pub finished: bool,
    /// Prize text
    pub prize: String,
    /// Participants
    pub participants: u32,
}

/// Responses written by the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current state.
    State(Snapshot),
    /// Click applied.
    Click(ClickReport),
    /// Power raised.
    Power {
        /// New power
        click_power: u64,
    },
    /// Leaderboard.
    Leaders {
        /// Rows in rank order
        leaders: Vec<LeaderView>,
    },
    /// Tournaments.
    Tournaments {
        /// Cards in display order
        tournaments: Vec<TournamentView>,
    },
    /// Toast to display.
    Toast(Notification),
    /// Engine event.
    Event(EngineEvent),
    /// Command failed.
    Error {
        /// Human-readable reason
        message: String,
    },
    /// Session ended.
    Bye {
        /// Lifetime total of the session
        total_clicks: u64,
    },
}

impl Response {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Error response.
    pub fn error(message: impl ToString) -> Self {
        Response::Error { message: message.to_string() }
    }
}

/// Leaderboard rows for display.
pub fn leader_views(content: &dyn ContentSource) -> Vec<LeaderView> {
    content
        .leaders()
        .iter()
        .map(|l| LeaderView {
            rank: l.rank,
            name: l.display_name.clone(),
            avatar: l.avatar_glyph.clone(),
            click_count: l.click_count,
            clicks: format_count(l.click_count),
            podium: l.podium(),
        })
        .collect()
}

/// Tournament cards for display at `now`.
pub fn tournament_views(content: &dyn ContentSource, now: DateTime<Utc>) -> Vec<TournamentView> {
    content
        .tournaments()
        .iter()
        .map(|t| TournamentView {
            name: t.name.clone(),
            remaining: format_remaining_at(t.end_instant, now),
            finished: t.is_finished_at(now),
            prize: t.prize_description.clone(),
            participants: t.participant_count,
        })
        .collect()
}

/// Run one command against the engine.
///
/// `Quit` is handled by the caller; here it only reports the final total.
pub async fn dispatch(engine: &ClickerEngine, command: Command) -> Response {
    let result: Result<Response, EngineError> = match command {
        Command::Click { client_x, client_y, surface } => {
            let surface = surface.unwrap_or_default();
            let center = surface.center();
            let pointer = PointerEvent::new(
                client_x.unwrap_or(center.client_x),
                client_y.unwrap_or(center.client_y),
            );
            engine.click(pointer, surface).await.map(Response::Click)
        }
        Command::Upgrade => engine
            .increase_power()
            .await
            .map(|click_power| Response::Power { click_power }),
        Command::Reset => match engine.reset().await {
            Ok(()) => Ok(Response::State(engine.snapshot().await)),
            Err(e) => Err(e),
        },
        Command::State => Ok(Response::State(engine.snapshot().await)),
        Command::Leaders => Ok(Response::Leaders {
            leaders: leader_views(engine.content()),
        }),
        Command::Tournaments => Ok(Response::Tournaments {
            tournaments: tournament_views(engine.content(), Utc::now()),
        }),
        Command::Quit => Ok(Response::Bye {
            total_clicks: engine.snapshot().await.total_clicks,
        }),
    };

    result.unwrap_or_else(|e| Response::error(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::Duration;
    use crate::core::rng::NonceRng;
    use crate::game::content::{StaticContent, FINISHED_LABEL};
    use crate::runtime::config::ClickerConfig;
    use crate::runtime::notify::TracingSink;

    fn create_test_engine() -> ClickerEngine {
        ClickerEngine::with_rng(
            [1; 16],
            ClickerConfig::default(),
            Arc::new(StaticContent::builtin(Utc::now())),
            Arc::new(TracingSink),
            NonceRng::new(5),
        )
    }

    #[test]
    fn test_parse_text_commands() {
        assert_eq!(
            Command::parse("click 12.5 40").unwrap(),
            Command::Click { client_x: Some(12.5), client_y: Some(40.0), surface: None }
        );
        assert_eq!(
            Command::parse("click").unwrap(),
            Command::Click { client_x: None, client_y: None, surface: None }
        );
        assert_eq!(Command::parse("  UPGRADE ").unwrap(), Command::Upgrade);
        assert_eq!(Command::parse("reset").unwrap(), Command::Reset);
        assert_eq!(Command::parse("leaders").unwrap(), Command::Leaders);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse("dance"), Err(CommandError::Unknown(_))));
        assert!(matches!(
            Command::parse("click left 3"),
            Err(CommandError::InvalidArgument { command: "click", .. })
        ));
        assert!(matches!(Command::parse("{\"type\":"), Err(CommandError::Json(_))));
    }

    #[test]
    fn test_parse_json_command() {
        let cmd = Command::parse(
            r#"{"type":"click","client_x":5,"client_y":6,"surface":{"left":1,"top":2,"width":10,"height":10}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::Click {
                client_x: Some(5.0),
                client_y: Some(6.0),
                surface: Some(SurfaceRect::new(1.0, 2.0, 10.0, 10.0)),
            }
        );
        assert_eq!(Command::parse(r#"{"type":"tournaments"}"#).unwrap(), Command::Tournaments);
    }

    #[test]
    fn test_response_json_tag() {
        let json = Response::Power { click_power: 3 }.to_json().unwrap();
        assert_eq!(json, r#"{"type":"power","click_power":3}"#);
        assert_eq!(Response::from_json(&json).unwrap(), Response::Power { click_power: 3 });
    }

    #[test]
    fn test_tournament_views_mark_finished() {
        let now = Utc::now();
        let content = StaticContent::builtin(now);

        let views = tournament_views(&content, now + Duration::hours(4));
        assert!(views[0].finished);
        assert_eq!(views[0].remaining, FINISHED_LABEL);
        assert!(!views[1].finished);
        assert_eq!(views[1].remaining, "20ч 0м");
    }

    #[test]
    fn test_leader_views() {
        let content = StaticContent::builtin(Utc::now());
        let views = leader_views(&content);
        assert_eq!(views.len(), 5);
        assert_eq!(views[0].clicks, "15\u{a0}420");
        assert_eq!(views[0].podium, Podium::Gold);
        assert_eq!(views[4].podium, Podium::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_click_uses_surface_offsets() {
        let engine = create_test_engine();
        let response = dispatch(
            &engine,
            Command::Click {
                client_x: Some(110.0),
                client_y: Some(220.0),
                surface: Some(SurfaceRect::new(100.0, 200.0, 50.0, 50.0)),
            },
        )
        .await;

        match response {
            Response::Click(report) => {
                assert_eq!((report.particle.x, report.particle.y), (10.0, 20.0));
                assert_eq!(report.outcome.clicks, 1);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_flow() {
        let engine = create_test_engine();

        dispatch(&engine, Command::parse("click").unwrap()).await;
        assert_eq!(
            dispatch(&engine, Command::Upgrade).await,
            Response::Power { click_power: 2 }
        );
        dispatch(&engine, Command::parse("click 1 1").unwrap()).await;

        match dispatch(&engine, Command::Reset).await {
            Response::State(snapshot) => {
                assert_eq!(snapshot.clicks, 0);
                assert_eq!(snapshot.total_clicks, 3);
                assert_eq!(snapshot.emoji, "😐");
            }
            other => panic!("unexpected response: {:?}", other),
        }

        assert!(matches!(
            dispatch(&engine, Command::Leaders).await,
            Response::Leaders { leaders } if leaders.len() == 5
        ));
        assert!(matches!(
            dispatch(&engine, Command::Tournaments).await,
            Response::Tournaments { tournaments } if tournaments.len() == 2
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_after_shutdown_reports_error() {
        let engine = create_test_engine();
        engine.shutdown().await;

        assert_eq!(
            dispatch(&engine, Command::Upgrade).await,
            Response::error(EngineError::ShutDown)
        );
        assert!(matches!(dispatch(&engine, Command::State).await, Response::State(_)));
    }
}
