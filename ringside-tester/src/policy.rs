use std::fmt;

use anyhow::{Result, bail};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use ringside_game::{FighterState, InputEvent, SessionSnapshot};
use serde::{Deserialize, Serialize};

/// Dodge when a telegraph is this close to releasing.
const DODGE_LEAD_MS: u64 = 120;

/// Policy interface for automated play.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Input to queue for the next frame, if any.
    fn decide(&mut self, snapshot: &SessionSnapshot) -> Option<InputEvent>;
}

/// Built-in policies selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Idle,
    Masher,
    Counter,
    Random,
}

impl PolicyKind {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Masher, Self::Counter, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Masher => "masher",
            Self::Counter => "counter",
            Self::Random => "random",
        }
    }

    /// Parse CLI tokens; `all` expands to every policy.
    pub fn parse_list(tokens: &[String]) -> Result<Vec<Self>> {
        let mut kinds = Vec::new();
        for token in tokens {
            let parsed: &[Self] = match token.to_ascii_lowercase().as_str() {
                "all" => &Self::ALL,
                "idle" => &[Self::Idle],
                "masher" => &[Self::Masher],
                "counter" => &[Self::Counter],
                "random" => &[Self::Random],
                _ => bail!("Unknown policy: {token}"),
            };
            for kind in parsed {
                if !kinds.contains(kind) {
                    kinds.push(*kind);
                }
            }
        }
        if kinds.is_empty() {
            kinds.extend_from_slice(&Self::ALL);
        }
        Ok(kinds)
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Idle => Box::new(IdlePolicy),
            Self::Masher => Box::new(MasherPolicy),
            Self::Counter => Box::new(CounterPolicy::default()),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct IdlePolicy;
struct MasherPolicy;

#[derive(Default)]
struct CounterPolicy {
    dodge_right: bool,
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn decide(&mut self, _snapshot: &SessionSnapshot) -> Option<InputEvent> {
        None
    }
}

impl PlayerPolicy for MasherPolicy {
    fn name(&self) -> &'static str {
        "masher"
    }

    fn decide(&mut self, snapshot: &SessionSnapshot) -> Option<InputEvent> {
        snapshot.player.is_idle().then_some(InputEvent::Punch)
    }
}

impl PlayerPolicy for CounterPolicy {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn decide(&mut self, snapshot: &SessionSnapshot) -> Option<InputEvent> {
        if !snapshot.player.is_idle() {
            return None;
        }
        let opponent = &snapshot.opponent;
        if snapshot.vulnerability_open {
            return Some(InputEvent::Punch);
        }
        if opponent.state() != FighterState::Telegraph {
            return None;
        }
        if snapshot.opponent_interruptible {
            return Some(InputEvent::Punch);
        }
        if opponent.state_deadline().saturating_sub(snapshot.at) <= DODGE_LEAD_MS {
            self.dodge_right = !self.dodge_right;
            return Some(if self.dodge_right {
                InputEvent::DodgeRight
            } else {
                InputEvent::DodgeLeft
            });
        }
        None
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, _snapshot: &SessionSnapshot) -> Option<InputEvent> {
        match self.rng.gen_range(0..8) {
            0 | 1 => Some(InputEvent::Punch),
            2 => Some(InputEvent::DodgeLeft),
            3 => Some(InputEvent::DodgeRight),
            _ => None,
        }
    }
}
