//! Opponent scheduler: two jittered timers gating shuffles and punch commits.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::boss::BossProfile;
use crate::clock::Millis;
use crate::combat::Bout;
use crate::constants::{
    FIRST_DECISION_DELAY_MS, FIRST_SHUFFLE_DELAY_MS, NEAR_MARGIN, PASS_BASE_MS, PASS_JITTER_MS,
    PUNCH_RANGE, SHUFFLE_BASE_MS, SHUFFLE_JITTER_MS, SHUFFLE_ODDS, SHUFFLE_STEP,
};
use crate::rng::RandomSource;

/// What the decision timer did when it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Committed to a punch; the telegraph runs until `until`.
    Telegraph { until: Millis },
    /// Rolled over the punch chance; waits a short interval.
    Pass,
}

/// Everything the scheduler did during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AiStep {
    /// New opponent x when the shuffle roll hit.
    pub shuffled: Option<i32>,
    pub decision: Option<Decision>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpponentAi {
    next_decision_at: Millis,
    next_shuffle_at: Millis,
}

impl OpponentAi {
    /// Timers armed for an encounter starting at `now`.
    #[must_use]
    pub const fn armed_at(now: Millis) -> Self {
        Self {
            next_decision_at: now.saturating_add(FIRST_DECISION_DELAY_MS),
            next_shuffle_at: now.saturating_add(FIRST_SHUFFLE_DELAY_MS),
        }
    }

    #[must_use]
    pub const fn next_decision_at(&self) -> Millis {
        self.next_decision_at
    }

    #[must_use]
    pub const fn next_shuffle_at(&self) -> Millis {
        self.next_shuffle_at
    }

    /// Run both timers. Does nothing while either fighter is knocked out.
    pub fn step<R: RandomSource + ?Sized>(
        &mut self,
        bout: &mut Bout,
        profile: &BossProfile,
        rng: &mut R,
        now: Millis,
    ) -> AiStep {
        let mut step = AiStep::default();
        if bout.either_knocked_out() {
            return step;
        }

        if bout.opponent.is_idle() && now >= self.next_shuffle_at {
            if rng.next_below(SHUFFLE_ODDS) == 0 {
                let nudge = if rng.next_below(2) == 1 {
                    SHUFFLE_STEP
                } else {
                    -SHUFFLE_STEP
                };
                bout.opponent.shuffle(nudge);
                step.shuffled = Some(bout.opponent.position().x);
            }
            self.next_shuffle_at = now
                .saturating_add(SHUFFLE_BASE_MS)
                .saturating_add(u64::from(rng.next_below(SHUFFLE_JITTER_MS)));
        }

        if now < self.next_decision_at || !bout.opponent.is_idle() {
            return step;
        }

        let distance = bout.distance();
        let near = distance <= PUNCH_RANGE + NEAR_MARGIN;
        let roll = rng.next_below(100);
        if roll < profile.punch_chance(near) {
            step.decision = Some(self.commit(bout, profile, rng, now));
        } else {
            self.next_decision_at = now
                .saturating_add(PASS_BASE_MS)
                .saturating_add(u64::from(rng.next_below(PASS_JITTER_MS)));
            step.decision = Some(Decision::Pass);
        }
        step
    }

    /// Commit to a punch immediately, bypassing the timer and the roll.
    /// Returns `None` unless the opponent is idle and nobody is knocked out.
    pub fn force_telegraph<R: RandomSource + ?Sized>(
        &mut self,
        bout: &mut Bout,
        profile: &BossProfile,
        rng: &mut R,
        now: Millis,
    ) -> Option<Decision> {
        if bout.either_knocked_out() || !bout.opponent.is_idle() {
            return None;
        }
        Some(self.commit(bout, profile, rng, now))
    }

    fn commit<R: RandomSource + ?Sized>(
        &mut self,
        bout: &mut Bout,
        profile: &BossProfile,
        rng: &mut R,
        now: Millis,
    ) -> Decision {
        bout.opponent.begin_telegraph(now, profile.telegraph_ms);
        self.next_decision_at = now
            .saturating_add(profile.telegraph_ms)
            .saturating_add(profile.ai_base_delay_ms)
            .saturating_add(u64::from(rng.next_below(profile.ai_rand_delay_ms)));
        let until = bout.opponent.state_deadline();
        debug!(
            "opponent telegraphs until {until}ms; next decision at {}ms",
            self.next_decision_at
        );
        Decision::Telegraph { until }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::BossRoster;
    use crate::constants::HOME_X;
    use crate::fighter::{DodgeDirection, FighterState};
    use crate::rng::ScriptedSource;

    fn setup() -> (OpponentAi, Bout, BossProfile) {
        let profile = BossRoster::builtin().profile(0).clone();
        (
            OpponentAi::armed_at(0),
            Bout::new(profile.opponent_health),
            profile,
        )
    }

    #[test]
    fn nothing_happens_before_timers() {
        let (mut ai, mut bout, profile) = setup();
        let mut rng = ScriptedSource::constant(0);
        let step = ai.step(&mut bout, &profile, &mut rng, 449);
        assert_eq!(step, AiStep::default());
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn shuffle_hits_one_in_four() {
        let (mut ai, mut bout, profile) = setup();
        ai.next_decision_at = Millis::MAX;
        // shuffle roll 0 (hit), direction 1 (right), jitter 10
        let mut rng = ScriptedSource::new([0, 1, 10]);
        let step = ai.step(&mut bout, &profile, &mut rng, 450);
        assert_eq!(step.shuffled, Some(HOME_X + 1));
        assert_eq!(step.decision, None);
        assert_eq!(ai.next_shuffle_at(), 450 + 350 + 10);

        // shuffle roll 3 (miss), jitter 399
        let mut rng = ScriptedSource::new([3, 399]);
        let step = ai.step(&mut bout, &profile, &mut rng, 810);
        assert_eq!(step, AiStep::default());
        assert_eq!(bout.opponent.position().x, HOME_X + 1);
        assert_eq!(ai.next_shuffle_at(), 810 + 350 + 399);
    }

    #[test]
    fn near_roll_under_chance_commits() {
        let (mut ai, mut bout, profile) = setup();
        ai.next_shuffle_at = Millis::MAX;
        // punch roll 39 (< 40 near), rand delay 100
        let mut rng = ScriptedSource::new([39, 100]);
        let step = ai.step(&mut bout, &profile, &mut rng, 700);
        assert_eq!(step.decision, Some(Decision::Telegraph { until: 1_400 }));
        assert_eq!(bout.opponent.state(), FighterState::Telegraph);
        assert!(bout.opponent.pending_punch());
        assert_eq!(ai.next_decision_at(), 700 + 700 + 900 + 100);
    }

    #[test]
    fn roll_at_chance_passes() {
        let (mut ai, mut bout, profile) = setup();
        ai.next_shuffle_at = Millis::MAX;
        let mut rng = ScriptedSource::new([40, 123]);
        let step = ai.step(&mut bout, &profile, &mut rng, 700);
        assert_eq!(step.decision, Some(Decision::Pass));
        assert!(bout.opponent.is_idle());
        assert_eq!(ai.next_decision_at(), 700 + 300 + 123);
    }

    #[test]
    fn far_player_uses_far_chance() {
        let (mut ai, mut bout, profile) = setup();
        ai.next_shuffle_at = Millis::MAX;
        bout.player.dodge(DodgeDirection::Left, 0);
        assert!(bout.distance() > PUNCH_RANGE + NEAR_MARGIN);

        let mut rng = ScriptedSource::new([8, 0]);
        let step = ai.step(&mut bout, &profile, &mut rng, 700);
        assert_eq!(step.decision, Some(Decision::Pass));

        let mut rng = ScriptedSource::new([7, 0]);
        let step = ai.step(&mut bout, &profile, &mut rng, ai.next_decision_at());
        assert!(matches!(step.decision, Some(Decision::Telegraph { .. })));
    }

    #[test]
    fn busy_opponent_defers_decision() {
        let (mut ai, mut bout, profile) = setup();
        ai.next_shuffle_at = Millis::MAX;
        bout.opponent.enter(FighterState::HitStun, 600, 260);
        let mut rng = ScriptedSource::constant(0);
        let step = ai.step(&mut bout, &profile, &mut rng, 700);
        assert_eq!(step, AiStep::default());
        assert_eq!(ai.next_decision_at(), 700);
    }

    #[test]
    fn knockout_suppresses_everything() {
        let (mut ai, mut bout, profile) = setup();
        bout.player.knock_out();
        let mut rng = ScriptedSource::constant(0);
        let before = ai;
        assert_eq!(
            ai.step(&mut bout, &profile, &mut rng, 10_000),
            AiStep::default()
        );
        assert_eq!(ai, before);
        assert_eq!(
            ai.force_telegraph(&mut bout, &profile, &mut rng, 10_000),
            None
        );
    }
}
