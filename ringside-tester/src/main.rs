mod policy;
mod reports;
mod simulation;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use policy::PolicyKind;
use reports::{
    aggregate_records, generate_console_report, generate_json_report, generate_markdown_report,
};
use ringside_game::{BossRoster, Millis};
use simulation::{BoutConfig, BoutRecord, DeterminismFailure, run_bout, verify_determinism};
use util::{load_roster, parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "ringside-tester", version = "0.1.0")]
#[command(about = "Headless bout simulator for Ringside - policies, win rates and determinism checks")]
struct Args {
    /// Seeds to run (comma-separated, decimal or 0x-prefixed hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Player policies (comma-separated: idle, masher, counter, random, all)
    #[arg(long, default_value = "all")]
    policies: String,

    /// Simulated time budget per bout in milliseconds
    #[arg(long, default_value_t = 120_000)]
    duration_ms: Millis,

    /// Simulated milliseconds between frames
    #[arg(long, default_value_t = ringside_game::constants::FRAME_MS)]
    tick_ms: Millis,

    /// Boss roster JSON to use instead of the bundled one
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print each bout as it finishes
    #[arg(short, long)]
    verbose: bool,

    /// Replay every bout and compare trace digests
    #[arg(long)]
    check_determinism: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let roster = load_roster(args.roster.as_deref())?;
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let policies = PolicyKind::parse_list(&split_csv(&args.policies))?;

    let (records, failures) = run_matrix(&args, &roster, &seeds, &policies)?;
    write_reports(&args, &records, &failures, start_time)?;

    if !failures.is_empty() {
        eprintln!(
            "{} {} bout(s) diverged on replay",
            "❌".red(),
            failures.len()
        );
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🥊 Ringside Bout Simulator".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn bout_config(args: &Args, policy: PolicyKind, seed: u64) -> BoutConfig {
    BoutConfig::new(policy, seed)
        .with_duration_ms(args.duration_ms)
        .with_tick_ms(args.tick_ms)
}

fn run_matrix(
    args: &Args,
    roster: &BossRoster,
    seeds: &[u64],
    policies: &[PolicyKind],
) -> Result<(Vec<BoutRecord>, Vec<DeterminismFailure>)> {
    let mut records = Vec::with_capacity(seeds.len() * policies.len());
    let mut failures = Vec::new();

    for &policy in policies {
        for &seed in seeds {
            let config = bout_config(args, policy, seed);
            let record = run_bout(roster, &config)
                .with_context(|| format!("bout {policy} seed {seed} failed"))?;

            if args.verbose {
                println!(
                    "🎯 [{} seed {}] {:?} - {} boss(es) down, {} hp left",
                    policy.label().green(),
                    seed,
                    record.outcome,
                    record.bosses_defeated,
                    record.player_health_left
                );
            }

            if args.check_determinism
                && let Some(failure) = verify_determinism(roster, &config, &record)?
            {
                eprintln!(
                    "❌ [{} seed {}] replay digest {:#018x} != {:#018x}",
                    policy.label().red(),
                    seed,
                    failure.second_digest,
                    failure.first_digest
                );
                failures.push(failure);
            }
            records.push(record);
        }
    }

    Ok((records, failures))
}

fn write_reports(
    args: &Args,
    records: &[BoutRecord],
    failures: &[DeterminismFailure],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let aggregates = aggregate_records(records);

    match args.report.as_str() {
        "json" => generate_json_report(&mut output_target, records, &aggregates, failures)?,
        "markdown" => {
            generate_markdown_report(&mut output_target, records, &aggregates, failures)?;
        }
        _ => {
            if records.is_empty() {
                writeln!(&mut output_target, "No bouts executed.")?;
            } else {
                generate_console_report(
                    &mut output_target,
                    records,
                    &aggregates,
                    failures,
                    start_time.elapsed(),
                )?;
            }
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            seeds: "1".to_string(),
            policies: "idle".to_string(),
            duration_ms: 5_000,
            tick_ms: 33,
            roster: None,
            report: "console".to_string(),
            output: None,
            verbose: false,
            check_determinism: false,
        }
    }

    #[test]
    fn run_matrix_covers_every_pair() {
        let args = Args {
            check_determinism: true,
            ..base_args()
        };
        let roster = BossRoster::default();
        let (records, failures) = run_matrix(
            &args,
            &roster,
            &[1, 2],
            &[PolicyKind::Idle, PolicyKind::Masher],
        )
        .unwrap();
        assert_eq!(records.len(), 4);
        assert!(failures.is_empty());
        assert_eq!(records[0].policy, PolicyKind::Idle);
        assert_eq!(records[3].policy, PolicyKind::Masher);
        assert_eq!(records[3].seed, 2);
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = std::env::temp_dir().join("ringside-test-report.json");
        let args = Args {
            report: "json".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value["records"].as_array().unwrap().is_empty());
    }

    #[test]
    fn write_reports_console_without_bouts() {
        let temp = std::env::temp_dir().join("ringside-test-report.txt");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No bouts executed."));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn write_reports_markdown_includes_bouts() {
        let temp = std::env::temp_dir().join("ringside-test-report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        let roster = BossRoster::default();
        let record = run_bout(&roster, &bout_config(&args, PolicyKind::Counter, 3)).unwrap();
        write_reports(&args, &[record], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("# Ringside Bout Results"));
        assert!(content.contains("| counter | 3 |"));
    }
}
