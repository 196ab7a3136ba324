//! Session orchestration: input handling, per-tick updates, boss progression.
use std::collections::VecDeque;

use log::info;
use serde::{Deserialize, Serialize};

use crate::ai::{Decision, OpponentAi};
use crate::boss::{BossProfile, BossRoster};
use crate::clock::Millis;
use crate::combat::{Bout, OpponentPunch, PlayerPunch};
use crate::constants::PLAYER_MAX_HEALTH;
use crate::event::{Banner, CombatEvent, CombatEventKind, Message, Side};
use crate::fighter::{DodgeDirection, Fighter};
use crate::input::InputEvent;
use crate::rng::{RandomSource, SeededSource};

/// Events kept when the host never drains the stream.
const EVENT_BACKLOG: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    InProgress,
    /// Final boss knocked out.
    Victory,
    /// Player knocked out.
    Defeat,
}

impl MatchOutcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// One run through the boss roster.
///
/// The session is the only owner of both fighters; hosts feed it inputs and
/// ticks with explicit timestamps and read it back between ticks.
#[derive(Debug, Clone)]
pub struct Session<R: RandomSource> {
    roster: BossRoster,
    boss_index: usize,
    bout: Bout,
    ai: OpponentAi,
    banner: Banner,
    outcome: MatchOutcome,
    running: bool,
    events: VecDeque<CombatEvent>,
    rng: R,
}

impl Session<SeededSource> {
    /// Session whose opponent stream is derived from `seed`.
    #[must_use]
    pub fn seeded(roster: BossRoster, seed: u64, now: Millis) -> Self {
        Self::new(roster, SeededSource::from_user_seed(seed), now)
    }
}

impl<R: RandomSource> Session<R> {
    /// Start a new game at `now`.
    #[must_use]
    pub fn new(roster: BossRoster, rng: R, now: Millis) -> Self {
        let first = roster.profile(0).opponent_health;
        let mut session = Self {
            roster,
            boss_index: 0,
            bout: Bout::new(first),
            ai: OpponentAi::armed_at(now),
            banner: Banner::default(),
            outcome: MatchOutcome::InProgress,
            running: true,
            events: VecDeque::new(),
            rng,
        };
        session.reset(now);
        session
    }

    /// Full reset: first boss, both fighters at full health, timers cleared.
    /// Also resumes a cancelled session.
    pub fn reset(&mut self, now: Millis) {
        self.running = true;
        self.boss_index = 0;
        self.outcome = MatchOutcome::InProgress;
        self.banner.clear();
        self.bout.player.reset(PLAYER_MAX_HEALTH, now);
        self.emit(now, CombatEventKind::NewGame);
        self.start_boss(0, now);
        self.banner.show(Message::NewGame, now);
        info!("new game at {now}ms against {}", self.boss().name);
    }

    fn start_boss(&mut self, index: usize, now: Millis) {
        self.boss_index = index;
        let health = self.roster.profile(index).opponent_health;
        self.bout.opponent.reset(health, now);
        self.bout.vulnerable_until = 0;
        self.ai = OpponentAi::armed_at(now);
        self.banner.show(Message::BossIntro { boss_index: index }, now);
        self.emit(now, CombatEventKind::BossStarted { boss_index: index });
    }

    /// Apply one input immediately.
    pub fn handle_input(&mut self, event: InputEvent, now: Millis) {
        if !self.running {
            return;
        }
        match event {
            InputEvent::Cancel => {
                self.running = false;
                self.emit(now, CombatEventKind::SessionEnded);
                info!("session ended at {now}ms");
            }
            InputEvent::Confirm if self.bout.player.is_knocked_out() => self.reset(now),
            InputEvent::Confirm | InputEvent::Punch => self.player_punch(now),
            InputEvent::DodgeLeft | InputEvent::DodgeRight => {
                if let Some(direction) = event.dodge_direction() {
                    self.player_dodge(direction, now);
                }
            }
        }
    }

    /// Advance fighter timers, release due punches, expire the banner, run the AI.
    pub fn tick(&mut self, now: Millis) {
        if !self.running {
            return;
        }

        self.bout.player.update(now);
        let released = self
            .bout
            .opponent
            .update(now)
            .is_some_and(|expiry| expiry.punch_due);
        if released {
            self.opponent_punch(now);
        }

        self.banner.expire(now);

        let profile = self.roster.profile(self.boss_index);
        let step = self.ai.step(&mut self.bout, profile, &mut self.rng, now);
        if let Some(x) = step.shuffled {
            self.emit(now, CombatEventKind::Shuffled { x });
        }
        if let Some(Decision::Telegraph { until }) = step.decision {
            self.emit(now, CombatEventKind::Telegraphed { until });
        }
    }

    /// Make the opponent commit to a punch now, skipping the decision roll.
    /// Returns whether a telegraph started.
    pub fn force_opponent_telegraph(&mut self, now: Millis) -> bool {
        let profile = self.roster.profile(self.boss_index);
        match self
            .ai
            .force_telegraph(&mut self.bout, profile, &mut self.rng, now)
        {
            Some(Decision::Telegraph { until }) => {
                self.emit(now, CombatEventKind::Telegraphed { until });
                true
            }
            _ => false,
        }
    }

    fn player_punch(&mut self, now: Millis) {
        let profile = self.roster.profile(self.boss_index);
        let outcome = self.bout.player_punch(profile, now);
        if outcome == PlayerPunch::Ignored {
            return;
        }
        self.announce(outcome.message(), outcome.event(), now);
        if outcome.knocked_out() {
            self.opponent_knocked_out(now);
        }
    }

    fn player_dodge(&mut self, direction: DodgeDirection, now: Millis) {
        if self.bout.player_dodge(direction, now) {
            self.emit(now, CombatEventKind::Dodged { direction });
        }
    }

    fn opponent_punch(&mut self, now: Millis) {
        let profile = self.roster.profile(self.boss_index);
        let outcome = self.bout.opponent_punch(profile, now);
        if outcome == OpponentPunch::Ignored {
            return;
        }
        self.announce(outcome.message(), outcome.event(), now);
        if outcome.knocked_out() {
            self.outcome = MatchOutcome::Defeat;
            self.emit(
                now,
                CombatEventKind::KnockedOut {
                    side: Side::Player,
                },
            );
            self.emit(now, CombatEventKind::Defeat);
            self.banner.show(Message::Defeat, now);
            info!("player knocked out by {} at {now}ms", self.boss().name);
        }
    }

    fn opponent_knocked_out(&mut self, now: Millis) {
        self.emit(
            now,
            CombatEventKind::KnockedOut {
                side: Side::Opponent,
            },
        );
        self.banner.show(Message::BossDown, now);

        if self.boss_index < BossRoster::last_index() {
            let next = self.boss_index + 1;
            info!(
                "{} down at {now}ms; advancing to {}",
                self.boss().name,
                self.roster.profile(next).name
            );
            self.start_boss(next, now);
        } else {
            self.outcome = MatchOutcome::Victory;
            self.banner.show(Message::Victory, now);
            self.emit(now, CombatEventKind::Victory);
            info!("final boss down at {now}ms; victory");
        }
    }

    fn announce(
        &mut self,
        message: Option<Message>,
        event: Option<CombatEventKind>,
        now: Millis,
    ) {
        if let Some(message) = message {
            self.banner.show(message, now);
        }
        if let Some(kind) = event {
            self.emit(now, kind);
        }
    }

    fn emit(&mut self, at: Millis, kind: CombatEventKind) {
        if self.events.len() >= EVENT_BACKLOG {
            self.events.pop_front();
        }
        self.events.push_back(CombatEvent { at, kind });
    }

    #[must_use]
    pub const fn player(&self) -> &Fighter {
        &self.bout.player
    }

    #[must_use]
    pub const fn opponent(&self) -> &Fighter {
        &self.bout.opponent
    }

    #[must_use]
    pub const fn bout(&self) -> &Bout {
        &self.bout
    }

    #[must_use]
    pub const fn boss_index(&self) -> usize {
        self.boss_index
    }

    /// Active boss profile.
    #[must_use]
    pub fn boss(&self) -> &BossProfile {
        self.roster.profile(self.boss_index)
    }

    #[must_use]
    pub const fn roster(&self) -> &BossRoster {
        &self.roster
    }

    #[must_use]
    pub const fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    /// False once the player cancelled.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn ai(&self) -> &OpponentAi {
        &self.ai
    }

    #[must_use]
    pub const fn vulnerable_until(&self) -> Millis {
        self.bout.vulnerable_until
    }

    /// Whether a player punch in range would land at `now` (UI hint).
    #[must_use]
    pub fn opponent_hittable(&self, now: Millis) -> bool {
        self.bout.opponent_hittable(self.boss(), now)
    }

    #[must_use]
    pub const fn banner(&self) -> &Banner {
        &self.banner
    }

    /// Text of the current banner, visible or not.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.banner
            .message()
            .map(|message| message.text(&self.roster))
    }

    #[must_use]
    pub fn message_visible(&self, now: Millis) -> bool {
        self.banner.visible(now).is_some()
    }

    /// Events recorded since the last drain, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain(..).collect()
    }

    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    /// Owned copy of everything a renderer reads.
    #[must_use]
    pub fn snapshot(&self, now: Millis) -> SessionSnapshot {
        let boss = self.boss();
        SessionSnapshot {
            at: now,
            boss_index: self.boss_index,
            boss_name: boss.name.clone(),
            opponent_interruptible: boss.telegraph_interruptible,
            opponent_hittable: self.opponent_hittable(now),
            vulnerability_open: self.bout.vulnerability_open(now),
            player: self.bout.player.clone(),
            opponent: self.bout.opponent.clone(),
            message: self
                .banner
                .visible(now)
                .map(|message| message.text(&self.roster).to_owned()),
            outcome: self.outcome,
            running: self.running,
        }
    }
}

/// Render-side view of a session at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub at: Millis,
    pub boss_index: usize,
    pub boss_name: String,
    pub opponent_interruptible: bool,
    pub opponent_hittable: bool,
    pub vulnerability_open: bool,
    pub player: Fighter,
    pub opponent: Fighter,
    /// Visible banner text, if any.
    pub message: Option<String>,
    pub outcome: MatchOutcome,
    pub running: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::FighterState;
    use crate::rng::ScriptedSource;

    fn passive_session() -> Session<ScriptedSource> {
        // Rolls of 99 never shuffle and never commit.
        Session::new(BossRoster::builtin(), ScriptedSource::constant(99), 0)
    }

    #[test]
    fn new_game_shows_intro_banner() {
        let session = passive_session();
        assert_eq!(session.boss_index(), 0);
        assert_eq!(session.message(), Some("DODGE / PUNCH"));
        assert!(session.message_visible(899));
        assert!(!session.message_visible(900));
        assert_eq!(session.ai().next_decision_at(), 700);
        assert_eq!(session.ai().next_shuffle_at(), 450);
        let kinds: Vec<_> = session.events().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CombatEventKind::NewGame,
                CombatEventKind::BossStarted { boss_index: 0 }
            ]
        );
    }

    #[test]
    fn banner_is_cleared_by_tick() {
        let mut session = passive_session();
        session.tick(899);
        assert!(session.message().is_some());
        session.tick(900);
        assert_eq!(session.message(), None);
    }

    #[test]
    fn guarded_punch_shows_block() {
        let mut session = passive_session();
        session.handle_input(InputEvent::Punch, 1_000);
        assert_eq!(session.message(), Some("BLOCK"));
        assert_eq!(session.player().state(), FighterState::Punching);
        assert_eq!(session.opponent().health(), 6);
    }

    #[test]
    fn confirm_punches_while_standing() {
        let mut session = passive_session();
        session.handle_input(InputEvent::Confirm, 1_000);
        assert_eq!(session.player().state(), FighterState::Punching);
    }

    #[test]
    fn cancel_stops_the_session() {
        let mut session = passive_session();
        session.handle_input(InputEvent::Cancel, 10);
        assert!(!session.is_running());
        let before = session.player().clone();
        session.handle_input(InputEvent::DodgeLeft, 20);
        session.tick(5_000);
        assert_eq!(session.player(), &before);
        assert_eq!(
            session.drain_events().last().map(|e| e.kind),
            Some(CombatEventKind::SessionEnded)
        );
    }

    #[test]
    fn reset_resumes_a_cancelled_session() {
        let mut session = passive_session();
        session.handle_input(InputEvent::Cancel, 10);
        session.reset(1_000);
        assert!(session.is_running());
        session.handle_input(InputEvent::DodgeRight, 1_100);
        assert_eq!(session.player().state(), FighterState::Dodging);
        session.tick(1_320);
        assert!(session.player().is_idle());
    }

    #[test]
    fn telegraph_releases_punch_on_expiry() {
        let mut session = passive_session();
        assert!(session.force_opponent_telegraph(1_000));
        session.tick(1_699);
        assert_eq!(session.opponent().state(), FighterState::Telegraph);
        session.tick(1_700);
        assert_eq!(session.opponent().state(), FighterState::Punching);
        assert_eq!(session.player().health(), PLAYER_MAX_HEALTH - 1);
        assert_eq!(session.player().state(), FighterState::HitStun);
        assert_eq!(session.message(), Some("HIT!"));
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = passive_session();
        session.force_opponent_telegraph(1_000);
        let snapshot = session.snapshot(1_010);
        assert_eq!(snapshot.boss_name, "B1 EASY");
        assert!(snapshot.opponent_interruptible);
        assert!(snapshot.opponent_hittable);
        assert!(!snapshot.vulnerability_open);
        assert_eq!(snapshot.opponent.state(), FighterState::Telegraph);
        assert_eq!(snapshot.message, None);
        assert_eq!(snapshot.outcome, MatchOutcome::InProgress);
    }

    #[test]
    fn event_backlog_is_bounded() {
        let mut session = passive_session();
        for step in 0..(EVENT_BACKLOG as u64 * 2) {
            session.handle_input(InputEvent::DodgeLeft, step * 1_000);
            session.tick(step * 1_000 + 500);
        }
        assert_eq!(session.events().count(), EVENT_BACKLOG);
    }
}
