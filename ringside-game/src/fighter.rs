//! Per-actor timed state machine.
//!
//! Every timed state stores an absolute deadline; [`Fighter::update`] compares
//! the current timestamp against it, so the machine behaves the same at any
//! tick cadence.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::constants::{
    ARENA_MAX_X, ARENA_MIN_X, BLINK_INTERVAL_MS, DODGE_MS, DODGE_OFFSET, FIGHTER_WIDTH,
    SHUFFLE_RANGE,
};

/// Delay before the first blink toggle after a reset.
const FLASH_RESET_DELAY_MS: Millis = 60;

/// Integer arena coordinate (top-left corner of the sprite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    /// No timed action in progress.
    Idle,
    /// Opponent announcing a committed punch.
    Telegraph,
    /// Punch lock; the outcome was already resolved when it started.
    Punching,
    /// Forced recovery after a landed hit.
    HitStun,
    /// Player displaced to one side of home.
    Dodging,
    /// Terminal until an explicit reset.
    KnockedOut,
}

impl FighterState {
    #[must_use]
    pub const fn is_timed(self) -> bool {
        !matches!(self, Self::Idle | Self::KnockedOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DodgeDirection {
    Left,
    Right,
}

impl DodgeDirection {
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Result of a timed state running out during [`Fighter::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub from: FighterState,
    /// A telegraph finished with its punch still armed.
    pub punch_due: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    position: Position,
    home_position: Position,
    state: FighterState,
    state_deadline: Millis,
    health: u32,
    max_health: u32,
    /// Blink phase while telegraphing. Render-only: no gameplay rule reads it.
    flash: bool,
    flash_deadline: Millis,
    pending_punch: bool,
}

impl Fighter {
    /// Fresh fighter standing at `home` with full health.
    #[must_use]
    pub const fn new(home: Position, max_health: u32) -> Self {
        Self {
            position: home,
            home_position: home,
            state: FighterState::Idle,
            state_deadline: 0,
            health: max_health,
            max_health,
            flash: false,
            flash_deadline: 0,
            pending_punch: false,
        }
    }

    /// Back to home, full health, Idle, with every timer cleared.
    pub fn reset(&mut self, max_health: u32, now: Millis) {
        self.position = self.home_position;
        self.max_health = max_health;
        self.health = max_health;
        self.state = FighterState::Idle;
        self.state_deadline = now;
        self.flash = false;
        self.flash_deadline = now.saturating_add(FLASH_RESET_DELAY_MS);
        self.pending_punch = false;
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn home_position(&self) -> Position {
        self.home_position
    }

    #[must_use]
    pub const fn state(&self) -> FighterState {
        self.state
    }

    #[must_use]
    pub const fn state_deadline(&self) -> Millis {
        self.state_deadline
    }

    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Blink phase for the telegraph cue. Cosmetic only.
    #[must_use]
    pub const fn flash(&self) -> bool {
        self.flash
    }

    #[must_use]
    pub const fn flash_deadline(&self) -> Millis {
        self.flash_deadline
    }

    #[must_use]
    pub const fn pending_punch(&self) -> bool {
        self.pending_punch
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, FighterState::Idle)
    }

    #[must_use]
    pub const fn is_knocked_out(&self) -> bool {
        matches!(self.state, FighterState::KnockedOut)
    }

    #[must_use]
    pub const fn center_x(&self) -> i32 {
        self.position.x + FIGHTER_WIDTH / 2
    }

    /// Horizontal center-to-center distance.
    #[must_use]
    pub const fn distance_to(&self, other: &Self) -> i32 {
        (self.center_x() - other.center_x()).abs()
    }

    /// Enter a timed state lasting `duration_ms` from `now`.
    pub(crate) fn enter(&mut self, state: FighterState, now: Millis, duration_ms: Millis) {
        self.state = state;
        self.state_deadline = now.saturating_add(duration_ms);
    }

    pub(crate) fn knock_out(&mut self) {
        self.state = FighterState::KnockedOut;
        self.pending_punch = false;
    }

    /// Saturating damage; returns the remaining health.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub(crate) fn begin_telegraph(&mut self, now: Millis, duration_ms: Millis) {
        self.flash = false;
        self.flash_deadline = now.saturating_add(BLINK_INTERVAL_MS);
        self.pending_punch = true;
        self.enter(FighterState::Telegraph, now, duration_ms);
    }

    /// Drop an armed punch. Returns whether one was armed.
    pub(crate) fn cancel_pending_punch(&mut self) -> bool {
        std::mem::replace(&mut self.pending_punch, false)
    }

    pub(crate) fn dodge(&mut self, direction: DodgeDirection, now: Millis) {
        let target = self.home_position.x + direction.sign() * DODGE_OFFSET;
        self.position.x = target.clamp(ARENA_MIN_X, ARENA_MAX_X);
        self.enter(FighterState::Dodging, now, DODGE_MS);
    }

    /// Nudge horizontally, staying near home and inside the arena.
    pub(crate) fn shuffle(&mut self, step: i32) {
        let home = self.home_position.x;
        let nudged = (self.position.x + step).clamp(home - SHUFFLE_RANGE, home + SHUFFLE_RANGE);
        self.position.x = nudged.clamp(ARENA_MIN_X, ARENA_MAX_X);
    }

    /// Advance timers to `now`. Returns the expired state, if any.
    pub fn update(&mut self, now: Millis) -> Option<Expiry> {
        if self.is_knocked_out() {
            return None;
        }

        if self.state == FighterState::Telegraph && now >= self.flash_deadline {
            self.flash = !self.flash;
            self.flash_deadline = now.saturating_add(BLINK_INTERVAL_MS);
        }

        if !self.state.is_timed() || now < self.state_deadline {
            return None;
        }

        let from = self.state;
        let mut punch_due = false;
        match from {
            FighterState::Dodging => self.position = self.home_position,
            FighterState::Telegraph => punch_due = self.cancel_pending_punch(),
            _ => {}
        }
        self.state = FighterState::Idle;
        debug!("fighter {from:?} expired at {now}ms");
        Some(Expiry { from, punch_due })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HOME_X, PLAYER_Y};

    fn fighter() -> Fighter {
        Fighter::new(Position::new(HOME_X, PLAYER_Y), 10)
    }

    #[test]
    fn damage_saturates_at_zero() {
        let mut f = fighter();
        assert_eq!(f.take_damage(3), 7);
        assert_eq!(f.take_damage(50), 0);
        assert_eq!(f.health(), 0);
    }

    #[test]
    fn dodge_offsets_then_snaps_home() {
        let mut f = fighter();
        f.dodge(DodgeDirection::Left, 1_000);
        assert_eq!(f.position().x, HOME_X - DODGE_OFFSET);
        assert_eq!(f.state(), FighterState::Dodging);

        assert_eq!(f.update(1_000 + DODGE_MS - 1), None);
        assert_eq!(f.state(), FighterState::Dodging);

        let expiry = f.update(1_000 + DODGE_MS).expect("dodge expires");
        assert_eq!(expiry.from, FighterState::Dodging);
        assert_eq!(f.position(), f.home_position());
        assert!(f.is_idle());
    }

    #[test]
    fn dodge_is_clamped_to_arena() {
        let mut f = Fighter::new(Position::new(ARENA_MIN_X + 2, PLAYER_Y), 10);
        f.dodge(DodgeDirection::Left, 0);
        assert_eq!(f.position().x, ARENA_MIN_X);

        let mut g = Fighter::new(Position::new(ARENA_MAX_X - 2, PLAYER_Y), 10);
        g.dodge(DodgeDirection::Right, 0);
        assert_eq!(g.position().x, ARENA_MAX_X);
    }

    #[test]
    fn telegraph_blinks_and_releases_punch() {
        let mut f = fighter();
        f.begin_telegraph(0, 300);
        assert!(f.pending_punch());
        assert!(!f.flash());

        assert_eq!(f.update(79), None);
        assert!(!f.flash());
        assert_eq!(f.update(80), None);
        assert!(f.flash());
        assert_eq!(f.flash_deadline(), 160);
        assert_eq!(f.update(160), None);
        assert!(!f.flash());

        let expiry = f.update(300).expect("telegraph expires");
        assert_eq!(
            expiry,
            Expiry {
                from: FighterState::Telegraph,
                punch_due: true
            }
        );
        assert!(!f.pending_punch());
        assert!(f.is_idle());
    }

    #[test]
    fn cancelled_telegraph_expires_without_punch() {
        let mut f = fighter();
        f.begin_telegraph(0, 300);
        assert!(f.cancel_pending_punch());
        let expiry = f.update(300).expect("telegraph expires");
        assert!(!expiry.punch_due);
    }

    #[test]
    fn knocked_out_fighter_ignores_time() {
        let mut f = fighter();
        f.enter(FighterState::HitStun, 0, 100);
        f.knock_out();
        assert_eq!(f.update(10_000), None);
        assert!(f.is_knocked_out());
    }

    #[test]
    fn shuffle_stays_near_home() {
        let mut f = fighter();
        for _ in 0..20 {
            f.shuffle(1);
        }
        assert_eq!(f.position().x, HOME_X + SHUFFLE_RANGE);
        for _ in 0..40 {
            f.shuffle(-1);
        }
        assert_eq!(f.position().x, HOME_X - SHUFFLE_RANGE);
    }

    #[test]
    fn reset_restores_home_and_health() {
        let mut f = fighter();
        f.dodge(DodgeDirection::Right, 0);
        f.take_damage(4);
        f.reset(6, 500);
        assert_eq!(f.position(), f.home_position());
        assert_eq!(f.health(), 6);
        assert_eq!(f.max_health(), 6);
        assert!(f.is_idle());
        assert_eq!(f.flash_deadline(), 560);
    }

    #[test]
    fn distance_uses_centers() {
        let a = Fighter::new(Position::new(40, 0), 1);
        let b = Fighter::new(Position::new(56, 30), 1);
        assert_eq!(a.distance_to(&b), 16);
        assert_eq!(b.distance_to(&a), 16);
    }
}
