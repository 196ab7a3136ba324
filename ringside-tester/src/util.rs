use anyhow::{Context, Result, bail};
use ringside_game::BossRoster;
use std::path::Path;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse seed tokens; decimal or `0x`-prefixed hex. Duplicates are dropped.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed {token}"))?
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        seeds.push(1337);
    }
    Ok(seeds)
}

pub fn load_roster(path: Option<&Path>) -> Result<BossRoster> {
    let Some(path) = path else {
        return Ok(BossRoster::load_from_static());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    BossRoster::from_json(&json).with_context(|| format!("invalid roster {}", path.display()))
}
