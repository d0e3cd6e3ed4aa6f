//! Particle Nonce Generator
//!
//! Xorshift128+ generator that supplies the random component of particle
//! identifiers. Seeded once per session from the session id and start time,
//! so a replayed session with the same seed yields the same nonces.

use sha2::{Sha256, Digest};

/// Xorshift128+ generator for particle nonces.
///
/// # Example
///
/// ```
/// use happy_clicker::core::rng::NonceRng;
///
/// let mut a = NonceRng::new(7);
/// let mut b = NonceRng::new(7);
/// assert_eq!(a.next_u32(), b.next_u32());
/// ```
#[derive(Clone, Debug)]
pub struct NonceRng {
    state: [u64; 2],
}

impl Default for NonceRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NonceRng {
    /// Create a generator from a 64-bit seed.
    ///
    /// SplitMix64 spreads weak seeds over the full state.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // State must never be all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create a generator for a session.
    pub fn for_session(session_id: &[u8; 16], started_unix_ms: i64) -> Self {
        Self::new(derive_session_seed(session_id, started_unix_ms))
    }

    /// Next 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Next 32-bit value (upper half of the 64-bit output).
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

/// SplitMix64 step.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive the nonce seed for a session.
pub fn derive_session_seed(session_id: &[u8; 16], started_unix_ms: i64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"HAPPY_CLICKER_NONCE_V1");
    hasher.update(session_id);
    hasher.update(started_unix_ms.to_le_bytes());
    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}
