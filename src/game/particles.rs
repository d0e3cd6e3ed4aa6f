//! Click Particles
//!
//! One floating "+N" particle per click, removed once its display lifetime
//! has elapsed. The live set is a `VecDeque` in spawn order, so the oldest
//! particle is at the front for capacity eviction; removal filters by id.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use tokio::time::Instant;

use crate::core::rng::NonceRng;
use crate::game::input::{PointerEvent, SurfaceRect};

/// Default display lifetime of a particle.
pub const PARTICLE_LIFETIME: Duration = Duration::from_millis(1000);

/// Unique particle identifier: spawn time plus a random nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId {
    /// Milliseconds since the manager was created
    pub spawned_ms: u64,
    /// Random component
    pub nonce: u32,
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:08x}", self.spawned_ms, self.nonce)
    }
}

/// A live particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Unique id
    pub id: ParticleId,
    /// Horizontal offset from the surface's left edge
    pub x: f64,
    /// Vertical offset from the surface's top edge
    pub y: f64,
    /// When it was spawned
    pub spawned_at: Instant,
    /// Click power of the click that spawned it (rendered as "+power")
    pub power: u64,
}

impl Particle {
    /// Label shown while the particle floats.
    pub fn label(&self) -> String {
        format!("+{}", self.power)
    }

    /// Time since spawn.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.spawned_at)
    }
}

/// Owner of the live particle set.
#[derive(Debug)]
pub struct ParticleManager {
    live: VecDeque<Particle>,
    rng: NonceRng,
    lifetime: Duration,
    max_live: Option<usize>,
    epoch: Instant,
    spawned_total: u64,
    evicted_total: u64,
}

impl ParticleManager {
    /// Create an unbounded manager.
    pub fn new(rng: NonceRng, lifetime: Duration) -> Self {
        Self::with_capacity(rng, lifetime, None)
    }

    /// Create a manager, optionally bounded to `max_live` particles.
    ///
    /// When bounded, spawning into a full set evicts the oldest particle.
    pub fn with_capacity(rng: NonceRng, lifetime: Duration, max_live: Option<usize>) -> Self {
        Self {
            live: VecDeque::new(),
            rng,
            lifetime,
            max_live: max_live.map(|cap| cap.max(1)),
            epoch: Instant::now(),
            spawned_total: 0,
            evicted_total: 0,
        }
    }

    /// Display lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Capacity bound, if any.
    pub fn max_live(&self) -> Option<usize> {
        self.max_live
    }

    /// Spawn a particle at the click position relative to the surface.
    ///
    /// Returns the new particle and, if the set was full, the evicted one.
    pub fn spawn(
        &mut self,
        pointer: PointerEvent,
        surface: &SurfaceRect,
        power: u64,
        now: Instant,
    ) -> (Particle, Option<Particle>) {
        let (x, y) = surface.relative_position(pointer);
        let id = self.fresh_id(now);

        let evicted = match self.max_live {
            Some(cap) if self.live.len() >= cap => {
                self.evicted_total += 1;
                self.live.pop_front()
            }
            _ => None,
        };

        let particle = Particle {
            id,
            x,
            y,
            spawned_at: now,
            power,
        };
        self.live.push_back(particle.clone());
        self.spawned_total += 1;

        (particle, evicted)
    }

    /// Remove every particle with this id. Returns how many were removed.
    pub fn remove(&mut self, id: ParticleId) -> usize {
        let before = self.live.len();
        self.live.retain(|p| p.id != id);
        before - self.live.len()
    }

    /// Remove every particle whose lifetime has elapsed at `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<ParticleId> {
        let lifetime = self.lifetime;
        let mut expired = Vec::new();
        self.live.retain(|p| {
            if p.age(now) >= lifetime {
                expired.push(p.id);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Check whether a particle is live.
    pub fn contains(&self, id: ParticleId) -> bool {
        self.live.iter().any(|p| p.id == id)
    }

    /// Live particles in spawn order.
    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.live.iter()
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True when no particle is live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drop every live particle.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Particles spawned over the manager's lifetime.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Particles evicted by the capacity bound.
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total
    }

    /// Generate an id not shared with any live particle.
    fn fresh_id(&mut self, now: Instant) -> ParticleId {
        let spawned_ms = now.saturating_duration_since(self.epoch).as_millis() as u64;
        loop {
            let id = ParticleId {
                spawned_ms,
                nonce: self.rng.next_u32(),
            };
            if !self.contains(id) {
                return id;
            }
        }
    }
}
