//! Injectable randomness for the opponent scheduler.
//!
//! The scheduler only ever asks for uniform integers in `[0, n)`, so the
//! abstraction is a single method. [`SeededSource`] is the production source;
//! [`ScriptedSource`] replays fixed rolls so tests can force a decision.
use std::collections::VecDeque;

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;

/// Source of uniform integers.
pub trait RandomSource {
    /// Uniform value in `[0, n)`. Returns 0 when `n == 0`.
    fn next_below(&mut self, n: u32) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_below(&mut self, n: u32) -> u32 {
        (**self).next_below(n)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_below(&mut self, n: u32) -> u32 {
        (**self).next_below(n)
    }
}

/// Domain tag for the opponent AI stream.
const OPPONENT_STREAM: &[u8] = b"opponent-ai";

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Seeded `SmallRng` stream that counts its draws.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: SmallRng,
    draws: u64,
}

impl SeededSource {
    /// Construct the opponent stream from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(derive_stream_seed(seed, OPPONENT_STREAM)),
            draws: 0,
        }
    }

    /// Number of draws performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SeededSource {
    fn next_below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.draws = self.draws.saturating_add(1);
        self.rng.gen_range(0..n)
    }
}

/// Replays a fixed list of rolls, each reduced modulo the requested bound.
/// Once exhausted it yields `fallback`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    rolls: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 0,
        }
    }

    /// Source that always answers `value % n`.
    #[must_use]
    pub fn constant(value: u32) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: value,
        }
    }

    pub fn push(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rolls.pop_front().unwrap_or(self.fallback) % n
    }
}
