//! Punch and dodge resolution between the two fighters.
//!
//! Outcomes are decided the moment an action starts; the Punching state that
//! follows is only an animation lock.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::boss::BossProfile;
use crate::clock::Millis;
use crate::constants::{HIT_STUN_MS, HOME_X, OPPONENT_Y, PLAYER_MAX_HEALTH, PLAYER_Y, PUNCH_RANGE};
use crate::event::{CombatEventKind, Message, Side};
use crate::fighter::{DodgeDirection, Fighter, FighterState, Position};

/// Result of a player punch command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPunch {
    /// Player could not act; nothing changed.
    Ignored,
    /// Out of range; only the Punching lock was applied.
    Whiffed,
    Blocked,
    /// Hittable, but the opponent was already stunned.
    Absorbed,
    Landed {
        damage: u32,
        remaining: u32,
        interrupted_telegraph: bool,
    },
}

impl PlayerPunch {
    #[must_use]
    pub const fn message(self) -> Option<Message> {
        match self {
            Self::Blocked => Some(Message::Block),
            Self::Landed { .. } => Some(Message::Good),
            Self::Ignored | Self::Whiffed | Self::Absorbed => None,
        }
    }

    #[must_use]
    pub const fn event(self) -> Option<CombatEventKind> {
        match self {
            Self::Whiffed => Some(CombatEventKind::Whiffed { by: Side::Player }),
            Self::Blocked => Some(CombatEventKind::Blocked),
            Self::Landed {
                damage,
                remaining,
                interrupted_telegraph,
            } => Some(CombatEventKind::CounterLanded {
                damage,
                remaining,
                interrupted_telegraph,
            }),
            Self::Ignored | Self::Absorbed => None,
        }
    }

    #[must_use]
    pub const fn knocked_out(self) -> bool {
        matches!(self, Self::Landed { remaining: 0, .. })
    }
}

/// Result of an opponent punch released by an expired telegraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentPunch {
    Ignored,
    /// Thrown into a dodge; opens the opponent until `until`.
    Evaded { until: Millis },
    /// Out of range, or the player was already stunned.
    Missed,
    Hit { damage: u32, remaining: u32 },
}

impl OpponentPunch {
    #[must_use]
    pub const fn message(self) -> Option<Message> {
        match self {
            Self::Evaded { .. } => Some(Message::Open),
            Self::Hit { .. } => Some(Message::Hit),
            Self::Ignored | Self::Missed => None,
        }
    }

    #[must_use]
    pub const fn event(self) -> Option<CombatEventKind> {
        match self {
            Self::Evaded { until } => Some(CombatEventKind::Evaded { until }),
            Self::Missed => Some(CombatEventKind::Whiffed { by: Side::Opponent }),
            Self::Hit { damage, remaining } => {
                Some(CombatEventKind::PlayerHit { damage, remaining })
            }
            Self::Ignored => None,
        }
    }

    #[must_use]
    pub const fn knocked_out(self) -> bool {
        matches!(self, Self::Hit { remaining: 0, .. })
    }
}

/// The two fighters plus the post-dodge vulnerability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bout {
    pub player: Fighter,
    pub opponent: Fighter,
    /// Opponent is counterable while `now < vulnerable_until`.
    pub vulnerable_until: Millis,
}

impl Bout {
    #[must_use]
    pub fn new(opponent_health: u32) -> Self {
        Self {
            player: Fighter::new(Position::new(HOME_X, PLAYER_Y), PLAYER_MAX_HEALTH),
            opponent: Fighter::new(Position::new(HOME_X, OPPONENT_Y), opponent_health),
            vulnerable_until: 0,
        }
    }

    #[must_use]
    pub const fn distance(&self) -> i32 {
        self.player.distance_to(&self.opponent)
    }

    #[must_use]
    pub const fn either_knocked_out(&self) -> bool {
        self.player.is_knocked_out() || self.opponent.is_knocked_out()
    }

    #[must_use]
    pub const fn vulnerability_open(&self, now: Millis) -> bool {
        now < self.vulnerable_until
    }

    /// Whether a player punch in range would land right now.
    #[must_use]
    pub fn opponent_hittable(&self, profile: &BossProfile, now: Millis) -> bool {
        self.vulnerability_open(now)
            || (profile.telegraph_interruptible
                && self.opponent.state() == FighterState::Telegraph)
    }

    pub fn player_punch(&mut self, profile: &BossProfile, now: Millis) -> PlayerPunch {
        if self.either_knocked_out() || !self.player.is_idle() {
            return PlayerPunch::Ignored;
        }

        self.player.enter(FighterState::Punching, now, profile.punch_ms);

        if self.distance() > PUNCH_RANGE {
            debug!("player whiffed at distance {}", self.distance());
            return PlayerPunch::Whiffed;
        }

        if !self.opponent_hittable(profile, now) {
            return PlayerPunch::Blocked;
        }

        if self.opponent.state() == FighterState::HitStun {
            return PlayerPunch::Absorbed;
        }

        let damage = profile.damage_to_opponent;
        let remaining = self.opponent.take_damage(damage);
        let interrupted_telegraph = self.opponent.state() == FighterState::Telegraph
            && self.opponent.cancel_pending_punch();

        self.opponent.enter(FighterState::HitStun, now, HIT_STUN_MS);
        self.vulnerable_until = 0;
        if remaining == 0 {
            self.opponent.knock_out();
        }

        debug!("player landed {damage} ({remaining} left, interrupted: {interrupted_telegraph})");
        PlayerPunch::Landed {
            damage,
            remaining,
            interrupted_telegraph,
        }
    }

    pub fn opponent_punch(&mut self, profile: &BossProfile, now: Millis) -> OpponentPunch {
        if self.either_knocked_out() || !self.opponent.is_idle() {
            return OpponentPunch::Ignored;
        }

        self.opponent
            .enter(FighterState::Punching, now, profile.punch_ms);

        if self.player.state() == FighterState::Dodging {
            self.vulnerable_until = now.saturating_add(profile.vulnerable_ms);
            debug!("opponent punch evaded; open until {}ms", self.vulnerable_until);
            return OpponentPunch::Evaded {
                until: self.vulnerable_until,
            };
        }

        if self.distance() > PUNCH_RANGE || self.player.state() == FighterState::HitStun {
            return OpponentPunch::Missed;
        }

        let damage = profile.damage_to_player;
        let remaining = self.player.take_damage(damage);
        self.player.enter(FighterState::HitStun, now, HIT_STUN_MS);
        if remaining == 0 {
            self.player.knock_out();
        }

        debug!("player took {damage} ({remaining} left)");
        OpponentPunch::Hit { damage, remaining }
    }

    /// Start a dodge. Returns whether the command was accepted.
    pub fn player_dodge(&mut self, direction: DodgeDirection, now: Millis) -> bool {
        if self.either_knocked_out() || !self.player.is_idle() {
            return false;
        }
        self.player.dodge(direction, now);
        true
    }
}
