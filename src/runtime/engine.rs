//! Clicker Engine
//!
//! Async shell around the session and particle set. All mutations go
//! through one write lock, so they apply in call order. Every click
//! schedules its own removal task; tasks are independent and are all
//! aborted on shutdown.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::core::rng::NonceRng;
use crate::game::content::ContentSource;
use crate::game::events::{EngineEvent, Notification};
use crate::game::input::{PointerEvent, SurfaceRect};
use crate::game::particles::{ParticleId, ParticleManager};
use crate::game::session::Session;
use crate::runtime::config::ClickerConfig;
use crate::runtime::notify::NotificationSink;
use crate::runtime::protocol::{ClickReport, ParticleView, Snapshot};

/// Unique engine (session) identifier.
pub type EngineId = [u8; 16];

/// Capacity of the engine event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine has been shut down.
    #[error("engine is shut down")]
    ShutDown,
}

/// Mutable state behind the engine lock.
struct EngineState {
    session: Session,
    particles: ParticleManager,
    shut_down: bool,
}

/// The clicker engine.
pub struct ClickerEngine {
    /// Session identifier.
    id: EngineId,
    /// Engine configuration.
    config: ClickerConfig,
    /// Counters and particles.
    state: Arc<RwLock<EngineState>>,
    /// Leaderboard and tournaments.
    content: Arc<dyn ContentSource>,
    /// Toast delivery.
    sink: Arc<dyn NotificationSink>,
    /// Pending particle removal tasks.
    timers: Mutex<JoinSet<()>>,
    /// Event broadcast channel.
    event_tx: broadcast::Sender<EngineEvent>,
}

impl ClickerEngine {
    /// Create an engine with a fresh session.
    pub fn new(
        config: ClickerConfig,
        content: Arc<dyn ContentSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let id = uuid::Uuid::new_v4().into_bytes();
        let rng = NonceRng::for_session(&id, Utc::now().timestamp_millis());
        Self::with_rng(id, config, content, sink, rng)
    }

    /// Create an engine with an explicit id and nonce generator.
    pub fn with_rng(
        id: EngineId,
        config: ClickerConfig,
        content: Arc<dyn ContentSource>,
        sink: Arc<dyn NotificationSink>,
        rng: NonceRng,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = EngineState {
            session: Session::with_milestone_interval(config.milestone_interval),
            particles: ParticleManager::with_capacity(
                rng,
                config.particle_lifetime,
                config.max_live_particles,
            ),
            shut_down: false,
        };

        info!(
            "Clicker session {} started (particle lifetime {:?}, milestone every {} clicks)",
            hex::encode(&id[..4]),
            config.particle_lifetime,
            config.milestone_interval,
        );

        Self {
            id,
            config,
            state: Arc::new(RwLock::new(state)),
            content,
            sink,
            timers: Mutex::new(JoinSet::new()),
            event_tx,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &EngineId {
        &self.id
    }

    /// Session identifier as a UUID string.
    pub fn id_string(&self) -> String {
        uuid::Uuid::from_bytes(self.id).to_string()
    }

    /// Engine configuration.
    pub fn config(&self) -> &ClickerConfig {
        &self.config
    }

    /// Leaderboard and tournament source.
    pub fn content(&self) -> &dyn ContentSource {
        self.content.as_ref()
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Apply a click at `pointer` on `surface`.
    ///
    /// Spawns a particle, schedules its removal and, on a milestone,
    /// issues exactly one congratulation toast.
    #[instrument(skip(self), level = "debug")]
    pub async fn click(
        &self,
        pointer: PointerEvent,
        surface: SurfaceRect,
    ) -> Result<ClickReport, EngineError> {
        let now = Instant::now();
        let (outcome, particle, evicted) = {
            let mut state = self.state.write().await;
            if state.shut_down {
                return Err(EngineError::ShutDown);
            }
            let outcome = state.session.apply_click();
            let (particle, evicted) = state.particles.spawn(pointer, &surface, outcome.added, now);
            (outcome, particle, evicted)
        };

        self.schedule_removal(particle.id, now + self.config.particle_lifetime).await;

        self.emit(EngineEvent::Clicked {
            added: outcome.added,
            clicks: outcome.clicks,
            total_clicks: outcome.total_clicks,
        });
        self.emit(EngineEvent::ParticleSpawned {
            id: particle.id,
            x: particle.x,
            y: particle.y,
            power: particle.power,
        });
        if let Some(evicted) = evicted {
            debug!("Particle {} evicted by capacity bound", evicted.id);
            self.emit(EngineEvent::ParticleRemoved { id: evicted.id });
        }

        if let Some(clicks) = outcome.milestone {
            info!("Milestone reached: {} clicks", clicks);
            self.sink.notify(Notification::milestone(clicks, self.config.milestone_toast_ms));
            self.emit(EngineEvent::Milestone { clicks });
        }

        Ok(ClickReport {
            outcome,
            particle: ParticleView::from_particle(&particle, now),
        })
    }

    /// Raise click power by one. Returns the new power.
    pub async fn increase_power(&self) -> Result<u64, EngineError> {
        let click_power = {
            let mut state = self.state.write().await;
            if state.shut_down {
                return Err(EngineError::ShutDown);
            }
            state.session.increase_power()
        };

        debug!("Click power increased to {}", click_power);
        self.sink.notify(Notification::power_increased(click_power, self.config.toast_ms));
        self.emit(EngineEvent::PowerIncreased { click_power });
        Ok(click_power)
    }

    /// Zero the click counter. Total and power are kept.
    pub async fn reset(&self) -> Result<(), EngineError> {
        let total_clicks = {
            let mut state = self.state.write().await;
            if state.shut_down {
                return Err(EngineError::ShutDown);
            }
            state.session.reset();
            state.session.total_clicks()
        };

        debug!("Counter reset (total {})", total_clicks);
        self.sink.notify(Notification::counter_reset(self.config.toast_ms));
        self.emit(EngineEvent::Reset { total_clicks });
        Ok(())
    }

    /// Current state for presentation.
    pub async fn snapshot(&self) -> Snapshot {
        let now = Instant::now();
        let state = self.state.read().await;
        Snapshot::capture(&state.session, state.particles.live(), now)
    }

    /// Check whether a particle is live.
    pub async fn has_particle(&self, id: ParticleId) -> bool {
        self.state.read().await.particles.contains(id)
    }

    /// Number of live particles.
    pub async fn particle_count(&self) -> usize {
        self.state.read().await.particles.len()
    }

    /// Number of removal tasks not yet reaped.
    pub async fn pending_timers(&self) -> usize {
        let mut timers = self.timers.lock().await;
        while timers.try_join_next().is_some() {}
        timers.len()
    }

    /// Check whether shutdown has run.
    pub async fn is_shut_down(&self) -> bool {
        self.state.read().await.shut_down
    }

    /// Stop accepting commands, drop live particles and abort every
    /// pending removal task.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let dropped = {
            let mut state = self.state.write().await;
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            let dropped = state.particles.len();
            state.particles.clear();
            dropped
        };

        let mut timers = self.timers.lock().await;
        let pending = timers.len();
        timers.shutdown().await;

        info!(
            "Clicker session {} shut down ({} particles dropped, {} timers cancelled)",
            hex::encode(&self.id[..4]),
            dropped,
            pending,
        );
    }

    /// Spawn the task that retires one particle at `deadline`.
    ///
    /// Runs under the timer lock. If shutdown has already drained the set,
    /// no task is added.
    async fn schedule_removal(&self, id: ParticleId, deadline: Instant) {
        let state = Arc::clone(&self.state);
        let event_tx = self.event_tx.clone();

        let mut timers = self.timers.lock().await;
        if state.read().await.shut_down {
            debug!("Particle {} not scheduled, engine shut down", id);
            return;
        }
        // Reap finished tasks so the set only holds pending ones
        while timers.try_join_next().is_some() {}

        timers.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let removed = state.write().await.particles.remove(id);
            if removed > 0 {
                debug!("Particle {} expired", id);
                let _ = event_tx.send(EngineEvent::ParticleRemoved { id });
            }
        });
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::content::StaticContent;
    use crate::game::events::NotificationKind;
    use crate::runtime::notify::ChannelSink;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn create_test_engine(
        config: ClickerConfig,
    ) -> (ClickerEngine, mpsc::UnboundedReceiver<Notification>) {
        let (sink, rx) = ChannelSink::new();
        let engine = ClickerEngine::with_rng(
            [7; 16],
            config,
            Arc::new(StaticContent::builtin(Utc::now())),
            Arc::new(sink),
            NonceRng::new(99),
        );
        (engine, rx)
    }

    fn center() -> PointerEvent {
        SurfaceRect::BUTTON.center()
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_updates_counters() {
        let (engine, _rx) = create_test_engine(ClickerConfig::default());

        let report = engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        assert_eq!(report.outcome.added, 1);
        assert_eq!(report.particle.x, 128.0);
        assert_eq!(report.particle.label, "+1");

        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.clicks, 1);
        assert_eq!(snapshot.total_clicks, 1);
        assert_eq!(snapshot.happiness, 1);
        assert_eq!(snapshot.particles.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_particle_removed_exactly_at_lifetime() {
        let (engine, _rx) = create_test_engine(ClickerConfig::default());

        let report = engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        let id = report.particle.id;
        assert!(engine.has_particle(id).await);

        tokio::time::sleep(Duration::from_millis(999)).await;
        settle().await;
        assert!(engine.has_particle(id).await, "removed before its lifetime");

        tokio::time::sleep(Duration::from_millis(1)).await;
        settle().await;
        assert!(!engine.has_particle(id).await, "still live after its lifetime");
        assert_eq!(engine.pending_timers().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_particles_expire_independently() {
        let (engine, _rx) = create_test_engine(ClickerConfig::default());

        let first = engine.click(center(), SurfaceRect::BUTTON).await.unwrap().particle.id;
        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = engine.click(center(), SurfaceRect::BUTTON).await.unwrap().particle.id;
        assert_ne!(first, second);
        assert_eq!(engine.particle_count().await, 2);

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert!(!engine.has_particle(first).await);
        assert!(engine.has_particle(second).await);

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(engine.particle_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_milestone_toast_once_per_qualifying_click() {
        let (engine, mut rx) = create_test_engine(ClickerConfig::default());

        for _ in 0..49 {
            engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        }
        assert!(drain(&mut rx).is_empty());

        engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        let toasts = drain(&mut rx);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Отличная работа! 50 кликов!");
        assert_eq!(toasts[0].duration_ms, 2000);

        engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_scenario() {
        let (engine, mut rx) = create_test_engine(ClickerConfig::default());

        for _ in 0..50 {
            engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        }
        let snapshot = engine.snapshot().await;
        assert_eq!((snapshot.clicks, snapshot.total_clicks, snapshot.happiness), (50, 50, 50));
        assert_eq!(drain(&mut rx).len(), 1);

        assert_eq!(engine.increase_power().await.unwrap(), 2);
        let toasts = drain(&mut rx);
        assert_eq!(toasts[0].message, "Сила клика увеличена до 2!");

        engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        let snapshot = engine.snapshot().await;
        assert_eq!((snapshot.clicks, snapshot.total_clicks, snapshot.happiness), (52, 52, 52));
        assert!(drain(&mut rx).is_empty());

        engine.reset().await.unwrap();
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.clicks, 0);
        assert_eq!(snapshot.happiness, 0);
        assert_eq!(snapshot.total_clicks, 52);
        assert_eq!(snapshot.click_power, 2);

        let toasts = drain(&mut rx);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Info);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_broadcast() {
        let (engine, _rx) = create_test_engine(ClickerConfig::default());
        let mut events = engine.subscribe();

        let id = engine.click(center(), SurfaceRect::BUTTON).await.unwrap().particle.id;
        assert!(matches!(events.recv().await.unwrap(), EngineEvent::Clicked { clicks: 1, .. }));
        assert!(matches!(
            events.recv().await.unwrap(),
            EngineEvent::ParticleSpawned { id: spawned, .. } if spawned == id
        ));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(events.recv().await.unwrap(), EngineEvent::ParticleRemoved { id });
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_particles_evict_oldest() {
        let config = ClickerConfig {
            max_live_particles: Some(2),
            ..Default::default()
        };
        let (engine, _rx) = create_test_engine(config);
        let mut events = engine.subscribe();

        let first = engine.click(center(), SurfaceRect::BUTTON).await.unwrap().particle.id;
        engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        engine.click(center(), SurfaceRect::BUTTON).await.unwrap();

        assert_eq!(engine.particle_count().await, 2);
        assert!(!engine.has_particle(first).await);

        let mut removed = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::ParticleRemoved { id } = event {
                removed.push(id);
            }
        }
        assert_eq!(removed, vec![first]);

        // The evicted particle's timer must not report it a second time
        tokio::time::sleep(Duration::from_millis(1000)).await;
        settle().await;
        let mut removed_later = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::ParticleRemoved { id } = event {
                removed_later.push(id);
            }
        }
        assert_eq!(removed_later.len(), 2);
        assert!(!removed_later.contains(&first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_timers() {
        let (engine, _rx) = create_test_engine(ClickerConfig::default());
        let mut events = engine.subscribe();

        for _ in 0..5 {
            engine.click(center(), SurfaceRect::BUTTON).await.unwrap();
        }
        assert_eq!(engine.pending_timers().await, 5);

        engine.shutdown().await;
        assert!(engine.is_shut_down().await);
        assert_eq!(engine.pending_timers().await, 0);
        assert_eq!(engine.particle_count().await, 0);

        // Drain click events, then make sure no timer fires afterwards
        while events.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(2000)).await;
        settle().await;
        assert!(events.try_recv().is_err());

        assert_eq!(
            engine.click(center(), SurfaceRect::BUTTON).await.unwrap_err(),
            EngineError::ShutDown
        );
        assert_eq!(engine.increase_power().await.unwrap_err(), EngineError::ShutDown);
        assert_eq!(engine.reset().await.unwrap_err(), EngineError::ShutDown);

        // Second shutdown is a no-op
        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shutdown_racing_clicks_leaves_no_timers() {
        for _ in 0..20 {
            let (engine, _rx) = create_test_engine(ClickerConfig::default());
            let engine = Arc::new(engine);

            let mut clicks = JoinSet::new();
            for _ in 0..16 {
                let engine = Arc::clone(&engine);
                clicks.spawn(async move {
                    for _ in 0..8 {
                        if engine.click(center(), SurfaceRect::BUTTON).await.is_err() {
                            break;
                        }
                        tokio::task::yield_now().await;
                    }
                });
            }
            tokio::task::yield_now().await;
            engine.shutdown().await;
            while clicks.join_next().await.is_some() {}

            assert!(engine.is_shut_down().await);
            assert_eq!(engine.pending_timers().await, 0);
            assert_eq!(engine.particle_count().await, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_lifetime() {
        let config = ClickerConfig {
            particle_lifetime: Duration::from_millis(200),
            ..Default::default()
        };
        let (engine, _rx) = create_test_engine(config);
        assert_eq!(engine.config().particle_lifetime, Duration::from_millis(200));

        let id = engine.click(center(), SurfaceRect::BUTTON).await.unwrap().particle.id;
        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;
        assert!(!engine.has_particle(id).await);
    }

    #[tokio::test]
    async fn test_engine_identity() {
        let (engine, _rx) = create_test_engine(ClickerConfig::default());
        assert_eq!(engine.id(), &[7; 16]);
        assert_eq!(engine.id_string(), "07070707-0707-0707-0707-070707070707");
        assert_eq!(engine.content().leaders().len(), 5);
    }
}
