use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use ringside_game::MatchOutcome;
use serde::Serialize;

use crate::policy::PolicyKind;
use crate::simulation::{BoutRecord, DeterminismFailure};

/// Per-policy roll-up of bout records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyAggregate {
    pub policy: PolicyKind,
    pub bouts: usize,
    pub victories: usize,
    pub defeats: usize,
    pub timeouts: usize,
    pub win_rate: f64,
    pub mean_bosses_defeated: f64,
    pub mean_health_left: f64,
    pub punches_landed: u64,
    pub hits_taken: u64,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    records: &'a [BoutRecord],
    aggregates: &'a [PolicyAggregate],
    determinism_failures: &'a [DeterminismFailure],
}

#[must_use]
pub fn aggregate_records(records: &[BoutRecord]) -> Vec<PolicyAggregate> {
    let mut order: Vec<PolicyKind> = Vec::new();
    for record in records {
        if !order.contains(&record.policy) {
            order.push(record.policy);
        }
    }

    order
        .into_iter()
        .map(|policy| {
            let bouts: Vec<&BoutRecord> =
                records.iter().filter(|r| r.policy == policy).collect();
            let count = bouts.len();
            let victories = count_outcome(&bouts, MatchOutcome::Victory);
            let defeats = count_outcome(&bouts, MatchOutcome::Defeat);
            #[allow(clippy::cast_precision_loss)]
            let win_rate = victories as f64 / count.max(1) as f64;
            PolicyAggregate {
                policy,
                bouts: count,
                victories,
                defeats,
                timeouts: count - victories - defeats,
                win_rate,
                mean_bosses_defeated: mean_of(&bouts, |r| r.bosses_defeated as u64),
                mean_health_left: mean_of(&bouts, |r| u64::from(r.player_health_left)),
                punches_landed: bouts.iter().map(|r| u64::from(r.punches_landed)).sum(),
                hits_taken: bouts.iter().map(|r| u64::from(r.hits_taken)).sum(),
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn mean_of(bouts: &[&BoutRecord], field: impl Fn(&BoutRecord) -> u64) -> f64 {
    let total: u64 = bouts.iter().map(|r| field(r)).sum();
    total as f64 / bouts.len().max(1) as f64
}

fn count_outcome(bouts: &[&BoutRecord], outcome: MatchOutcome) -> usize {
    bouts.iter().filter(|r| r.outcome == outcome).count()
}

fn outcome_label(outcome: MatchOutcome) -> &'static str {
    match outcome {
        MatchOutcome::Victory => "victory",
        MatchOutcome::Defeat => "defeat",
        MatchOutcome::InProgress => "timeout",
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    records: &[BoutRecord],
    aggregates: &[PolicyAggregate],
    failures: &[DeterminismFailure],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Bout Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=======================".cyan())?;
    writeln!(out, "Total bouts: {}", records.len())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for aggregate in aggregates {
        writeln!(out, "{}", aggregate.policy.label().bold())?;
        writeln!(
            out,
            "   Record: {} won / {} lost / {} timed out",
            aggregate.victories.to_string().green(),
            aggregate.defeats.to_string().red(),
            aggregate.timeouts.to_string().yellow()
        )?;
        writeln!(out, "   Win rate: {:.1}%", aggregate.win_rate * 100.0)?;
        writeln!(
            out,
            "   Bosses defeated (mean): {:.2}",
            aggregate.mean_bosses_defeated
        )?;
        writeln!(out, "   Health left (mean): {:.2}", aggregate.mean_health_left)?;
        writeln!(
            out,
            "   Punches landed: {}  Hits taken: {}",
            aggregate.punches_landed, aggregate.hits_taken
        )?;
        writeln!(out)?;
    }

    writeln!(out, "{}", "🥊 Bouts".bright_yellow().bold())?;
    writeln!(out, "{}", "========".yellow())?;
    for record in records {
        let status = match record.outcome {
            MatchOutcome::Victory => "✅ WIN ".green(),
            MatchOutcome::Defeat => "❌ LOSS".red(),
            MatchOutcome::InProgress => "⏱ TIME".yellow(),
        };
        writeln!(
            out,
            "{status} {:<8} seed {:<10} bosses {} hp {:>2} landed {:>3} blocked {:>3} dodges {:>3} ({} ticks, {} draws, {:#018x})",
            record.policy.label(),
            record.seed,
            record.bosses_defeated,
            record.player_health_left,
            record.punches_landed,
            record.punches_blocked,
            record.dodges,
            record.ticks,
            record.rng_draws,
            record.trace_digest
        )?;
    }

    if !failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Determinism failures".red().bold())?;
        for failure in failures {
            writeln!(
                out,
                "     • {} seed {}: {:#018x} != {:#018x}",
                failure.policy, failure.seed, failure.first_digest, failure.second_digest
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    records: &[BoutRecord],
    aggregates: &[PolicyAggregate],
    failures: &[DeterminismFailure],
) -> Result<()> {
    let report = JsonReport {
        records,
        aggregates,
        determinism_failures: failures,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    records: &[BoutRecord],
    aggregates: &[PolicyAggregate],
    failures: &[DeterminismFailure],
) -> Result<()> {
    writeln!(out, "# Ringside Bout Results\n")?;

    if records.is_empty() {
        writeln!(out, "_No bouts executed._")?;
        return Ok(());
    }

    writeln!(out, "## Summary\n")?;
    writeln!(
        out,
        "| Policy | Bouts | Won | Lost | Timed out | Win rate | Mean bosses | Mean health |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for a in aggregates {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.1}% | {:.2} | {:.2} |",
            a.policy,
            a.bouts,
            a.victories,
            a.defeats,
            a.timeouts,
            a.win_rate * 100.0,
            a.mean_bosses_defeated,
            a.mean_health_left
        )?;
    }

    writeln!(out, "\n## Bouts\n")?;
    writeln!(
        out,
        "| Policy | Seed | Outcome | Bosses | Health | Landed | Blocked | Whiffed | Dodges | Hits taken | Ticks |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|---|---|---|")?;
    for r in records {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            r.policy,
            r.seed,
            outcome_label(r.outcome),
            r.bosses_defeated,
            r.player_health_left,
            r.punches_landed,
            r.punches_blocked,
            r.punches_whiffed,
            r.dodges,
            r.hits_taken,
            r.ticks
        )?;
    }

    if !failures.is_empty() {
        writeln!(out, "\n## Determinism failures\n")?;
        for failure in failures {
            writeln!(
                out,
                "- `{}` seed {}: `{:#018x}` vs `{:#018x}`",
                failure.policy, failure.seed, failure.first_digest, failure.second_digest
            )?;
        }
    }
    Ok(())
}
