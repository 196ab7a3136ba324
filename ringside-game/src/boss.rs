//! Boss profiles and the fixed three-opponent roster.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Millis;

const DEFAULT_ROSTER_DATA: &str = include_str!("../assets/bosses.json");

/// Number of opponents in a run.
pub const BOSS_COUNT: usize = 3;

/// Immutable tuning for one opponent encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossProfile {
    pub name: String,
    /// Banner shown when the encounter starts; falls back to `name`.
    #[serde(default)]
    pub intro: String,
    pub opponent_health: u32,
    pub telegraph_ms: Millis,
    pub punch_ms: Millis,
    pub vulnerable_ms: Millis,
    pub ai_base_delay_ms: Millis,
    pub ai_rand_delay_ms: u32,
    /// Percent chance to commit when the player is near.
    pub punch_chance_near: u32,
    /// Percent chance to commit when the player is far.
    pub punch_chance_far: u32,
    #[serde(default = "BossProfile::default_damage_to_player")]
    pub damage_to_player: u32,
    pub damage_to_opponent: u32,
    /// Player counter-hits land during the telegraph.
    #[serde(default)]
    pub telegraph_interruptible: bool,
}

impl BossProfile {
    const fn default_damage_to_player() -> u32 {
        1
    }

    #[must_use]
    pub fn intro(&self) -> &str {
        if self.intro.is_empty() {
            &self.name
        } else {
            &self.intro
        }
    }

    #[must_use]
    pub const fn punch_chance(&self, near: bool) -> u32 {
        if near {
            self.punch_chance_near
        } else {
            self.punch_chance_far
        }
    }

    fn validate(&self, index: usize) -> Result<(), RosterError> {
        if self.name.trim().is_empty() {
            return Err(RosterError::EmptyName { index });
        }
        if self.opponent_health == 0 {
            return Err(RosterError::ZeroValue {
                index,
                field: "opponent_health",
            });
        }
        for (field, value) in [
            ("telegraph_ms", self.telegraph_ms),
            ("punch_ms", self.punch_ms),
            ("vulnerable_ms", self.vulnerable_ms),
        ] {
            if value == 0 {
                return Err(RosterError::ZeroValue { index, field });
            }
        }
        for (field, value) in [
            ("damage_to_player", self.damage_to_player),
            ("damage_to_opponent", self.damage_to_opponent),
        ] {
            if value == 0 {
                return Err(RosterError::ZeroValue { index, field });
            }
        }
        for (field, value) in [
            ("punch_chance_near", self.punch_chance_near),
            ("punch_chance_far", self.punch_chance_far),
        ] {
            if value > 100 {
                return Err(RosterError::ChanceOutOfRange {
                    index,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Errors raised when a roster fails to parse or breaks profile invariants.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("boss {index} has an empty name")]
    EmptyName { index: usize },
    #[error("boss {index}: {field} must be non-zero")]
    ZeroValue { index: usize, field: &'static str },
    #[error("boss {index}: {field} must be a percentage (got {value})")]
    ChanceOutOfRange {
        index: usize,
        field: &'static str,
        value: u32,
    },
}

/// Ordered opponents, fought front to back and never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRoster {
    profiles: [BossProfile; BOSS_COUNT],
}

impl Default for BossRoster {
    fn default() -> Self {
        Self::from_json(DEFAULT_ROSTER_DATA).unwrap_or_else(|_| Self::builtin())
    }
}

impl BossRoster {
    /// Parse and validate a roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, does not hold exactly
    /// [`BOSS_COUNT`] profiles, or a profile violates its invariants.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let roster: Self = serde_json::from_str(json)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Build a roster from explicit profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if any profile violates its invariants.
    pub fn from_profiles(profiles: [BossProfile; BOSS_COUNT]) -> Result<Self, RosterError> {
        let roster = Self { profiles };
        roster.validate()?;
        Ok(roster)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<(), RosterError> {
        self.profiles
            .iter()
            .enumerate()
            .try_for_each(|(index, profile)| profile.validate(index))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BossProfile> {
        self.profiles.get(index)
    }

    /// Profile at `index`, clamped to the final boss.
    #[must_use]
    pub fn profile(&self, index: usize) -> &BossProfile {
        &self.profiles[index.min(Self::last_index())]
    }

    #[must_use]
    pub const fn last_index() -> usize {
        BOSS_COUNT - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossProfile> {
        self.profiles.iter()
    }

    /// Hard-coded copy of the shipped roster.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            profiles: [
                BossProfile {
                    name: String::from("B1 EASY"),
                    intro: String::from("BOSS 1"),
                    opponent_health: 6,
                    telegraph_ms: 700,
                    punch_ms: 320,
                    vulnerable_ms: 1_200,
                    ai_base_delay_ms: 900,
                    ai_rand_delay_ms: 800,
                    punch_chance_near: 40,
                    punch_chance_far: 8,
                    damage_to_player: 1,
                    damage_to_opponent: 2,
                    telegraph_interruptible: true,
                },
                BossProfile {
                    name: String::from("B2 MED"),
                    intro: String::from("BOSS 2"),
                    opponent_health: 8,
                    telegraph_ms: 520,
                    punch_ms: 260,
                    vulnerable_ms: 900,
                    ai_base_delay_ms: 700,
                    ai_rand_delay_ms: 650,
                    punch_chance_near: 55,
                    punch_chance_far: 14,
                    damage_to_player: 1,
                    damage_to_opponent: 2,
                    telegraph_interruptible: true,
                },
                BossProfile {
                    name: String::from("B3 HARD"),
                    intro: String::from("FINAL"),
                    opponent_health: 10,
                    telegraph_ms: 260,
                    punch_ms: 220,
                    vulnerable_ms: 520,
                    ai_base_delay_ms: 550,
                    ai_rand_delay_ms: 500,
                    punch_chance_near: 78,
                    punch_chance_far: 22,
                    damage_to_player: 1,
                    damage_to_opponent: 1,
                    telegraph_interruptible: false,
                },
            ],
        }
    }
}
