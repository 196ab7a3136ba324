use std::hash::Hasher;

use anyhow::{Context, Result};
use log::{debug, warn};
use ringside_game::constants::FRAME_MS;
use ringside_game::{
    BossRoster, CombatEvent, CombatEventKind, FrameDriver, ManualClock, MatchOutcome, Millis,
    Session, Side,
};
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::policy::PolicyKind;

/// Configuration for one simulated bout.
#[derive(Debug, Clone, Copy)]
pub struct BoutConfig {
    pub seed: u64,
    pub policy: PolicyKind,
    pub duration_ms: Millis,
    pub tick_ms: Millis,
}

impl BoutConfig {
    #[must_use]
    pub fn new(policy: PolicyKind, seed: u64) -> Self {
        Self {
            seed,
            policy,
            duration_ms: 120_000,
            tick_ms: FRAME_MS,
        }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: Millis) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_tick_ms(mut self, tick_ms: Millis) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }
}

/// Summary of a finished (or timed-out) bout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutRecord {
    pub seed: u64,
    pub policy: PolicyKind,
    /// `in_progress` when the time budget ran out.
    pub outcome: MatchOutcome,
    pub bosses_defeated: usize,
    pub player_health_left: u32,
    pub punches_landed: u32,
    pub punches_blocked: u32,
    pub punches_whiffed: u32,
    pub dodges: u32,
    pub hits_taken: u32,
    pub ticks: u64,
    pub elapsed_ms: Millis,
    /// Values drawn from the opponent's random stream.
    pub rng_draws: u64,
    pub trace_digest: u64,
}

impl BoutRecord {
    fn empty(config: &BoutConfig) -> Self {
        Self {
            seed: config.seed,
            policy: config.policy,
            outcome: MatchOutcome::InProgress,
            bosses_defeated: 0,
            player_health_left: 0,
            punches_landed: 0,
            punches_blocked: 0,
            punches_whiffed: 0,
            dodges: 0,
            hits_taken: 0,
            ticks: 0,
            elapsed_ms: 0,
            rng_draws: 0,
            trace_digest: 0,
        }
    }

    fn tally(&mut self, event: &CombatEvent) {
        match event.kind {
            CombatEventKind::CounterLanded { .. } => self.punches_landed += 1,
            CombatEventKind::Blocked => self.punches_blocked += 1,
            CombatEventKind::Whiffed { by: Side::Player } => self.punches_whiffed += 1,
            CombatEventKind::Dodged { .. } => self.dodges += 1,
            CombatEventKind::PlayerHit { .. } => self.hits_taken += 1,
            CombatEventKind::KnockedOut {
                side: Side::Opponent,
            } => self.bosses_defeated += 1,
            _ => {}
        }
    }
}

/// Play one bout headlessly on a manual clock.
///
/// Every frame's snapshot and events are folded into an `XxHash64` digest so
/// two runs can be compared without keeping the trace.
pub fn run_bout(roster: &BossRoster, config: &BoutConfig) -> Result<BoutRecord> {
    let mut session = Session::seeded(roster.clone(), config.seed, 0);
    let mut driver = FrameDriver::new(ManualClock::starting_at(0));
    let mut policy = config.policy.create_policy(config.seed);
    let mut hasher = XxHash64::with_seed(0);
    let mut record = BoutRecord::empty(config);

    for event in session.drain_events() {
        hash_json(&mut hasher, &event)?;
    }

    while driver.now() < config.duration_ms && session.is_running() {
        let snapshot = session.snapshot(driver.now());
        if let Some(input) = policy.decide(&snapshot)
            && let Err(err) = driver.push(input)
        {
            warn!("{} policy input dropped: {err}", policy.name());
        }

        driver.clock().advance(config.tick_ms);
        driver.step(&mut session);

        for event in session.drain_events() {
            record.tally(&event);
            hash_json(&mut hasher, &event)?;
        }
        hash_json(&mut hasher, &session.snapshot(driver.now()))?;

        if session.outcome().is_terminal() {
            break;
        }
    }

    record.outcome = session.outcome();
    record.player_health_left = session.player().health();
    record.ticks = driver.frames();
    record.elapsed_ms = driver.now();
    record.rng_draws = session.rng().draws();
    record.trace_digest = hasher.finish();
    debug!(
        "bout seed {} policy {}: {:?} after {}ms",
        record.seed, record.policy, record.outcome, record.elapsed_ms
    );
    Ok(record)
}

fn hash_json<T: Serialize>(hasher: &mut XxHash64, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value).context("serializing trace entry")?;
    hasher.write(&bytes);
    hasher.write_u8(b'\n');
    Ok(())
}

/// Two runs of the same bout disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismFailure {
    pub seed: u64,
    pub policy: PolicyKind,
    pub first_digest: u64,
    pub second_digest: u64,
}

/// Replay `config` and compare against an existing record.
pub fn verify_determinism(
    roster: &BossRoster,
    config: &BoutConfig,
    first: &BoutRecord,
) -> Result<Option<DeterminismFailure>> {
    let second = run_bout(roster, config)?;
    if second.trace_digest == first.trace_digest && second == *first {
        return Ok(None);
    }
    Ok(Some(DeterminismFailure {
        seed: config.seed,
        policy: config.policy,
        first_digest: first.trace_digest,
        second_digest: second.trace_digest,
    }))
}
