//! Structured combat events and feedback banners.
//!
//! Events are an observation stream for hosts and test harnesses; nothing in
//! the resolver reads them back. Banners are the short texts a renderer shows
//! over the ring.
use serde::{Deserialize, Serialize};

use crate::boss::BossRoster;
use crate::clock::Millis;
use crate::constants::{
    BANNER_BLOCK_MS, BANNER_BOSS_DOWN_MS, BANNER_GOOD_MS, BANNER_HIT_MS, BANNER_INTRO_MS,
    BANNER_NEW_GAME_MS, BANNER_OPEN_MS, BANNER_TERMINAL_MS,
};
use crate::fighter::DodgeDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

/// Mechanical outcome emitted by the resolver, scheduler, or session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatEventKind {
    NewGame,
    BossStarted { boss_index: usize },
    Dodged { direction: DodgeDirection },
    /// Punch thrown out of range.
    Whiffed { by: Side },
    /// Player punch in range while the opponent was guarded.
    Blocked,
    CounterLanded {
        damage: u32,
        remaining: u32,
        interrupted_telegraph: bool,
    },
    Telegraphed { until: Millis },
    Shuffled { x: i32 },
    /// Opponent punch thrown into a dodge; the opponent is open until `until`.
    Evaded { until: Millis },
    PlayerHit { damage: u32, remaining: u32 },
    KnockedOut { side: Side },
    Victory,
    Defeat,
    SessionEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub at: Millis,
    #[serde(flatten)]
    pub kind: CombatEventKind,
}

/// Feedback banner shown over the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    NewGame,
    BossIntro { boss_index: usize },
    Open,
    Hit,
    Defeat,
    Block,
    Good,
    BossDown,
    Victory,
}

impl Message {
    #[must_use]
    pub const fn duration_ms(self) -> Millis {
        match self {
            Self::NewGame => BANNER_NEW_GAME_MS,
            Self::BossIntro { .. } => BANNER_INTRO_MS,
            Self::Open => BANNER_OPEN_MS,
            Self::Hit => BANNER_HIT_MS,
            Self::Block => BANNER_BLOCK_MS,
            Self::Good => BANNER_GOOD_MS,
            Self::BossDown => BANNER_BOSS_DOWN_MS,
            Self::Defeat | Self::Victory => BANNER_TERMINAL_MS,
        }
    }

    #[must_use]
    pub fn text(self, roster: &BossRoster) -> &str {
        match self {
            Self::NewGame => "DODGE / PUNCH",
            Self::BossIntro { boss_index } => roster.profile(boss_index).intro(),
            Self::Open => "OPEN!",
            Self::Hit => "HIT!",
            Self::Defeat => "YOU LOSE...",
            Self::Block => "BLOCK",
            Self::Good => "GOOD!",
            Self::BossDown => "BOSS DOWN!",
            Self::Victory => "YOU WIN!",
        }
    }
}

/// Transient banner slot; a newer message replaces the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Banner {
    message: Option<Message>,
    until: Millis,
}

impl Banner {
    pub fn show(&mut self, message: Message, now: Millis) {
        self.message = Some(message);
        self.until = now.saturating_add(message.duration_ms());
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.until = 0;
    }

    /// Drop the message once its display time has passed.
    pub fn expire(&mut self, now: Millis) {
        if self.message.is_some() && now >= self.until {
            self.message = None;
        }
    }

    #[must_use]
    pub const fn message(&self) -> Option<Message> {
        self.message
    }

    #[must_use]
    pub const fn until(&self) -> Millis {
        self.until
    }

    #[must_use]
    pub fn visible(&self, now: Millis) -> Option<Message> {
        self.message.filter(|_| now < self.until)
    }
}
