//! Headless battle simulator.
//!
//! Loads the content directory, recruits a party and fights floor
//! encounters on auto-battle until the party falls or the requested number
//! of battles is done.

mod report;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use battle_content::{ContentFactory, SystemRng, missing_references};
use battle_core::{Battle, BattleConfig, Catalog, EncounterTable, Outcome, Party, Step};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "battle-sim",
    about = "Run auto-battles against floor encounters",
    version
)]
struct Cli {
    /// Content directory (defaults to $CONTENT_DATA_DIR, then the bundled data)
    #[arg(long)]
    data: Option<PathBuf>,

    /// First floor to fight on
    #[arg(long, default_value_t = 1)]
    floor: u32,

    /// Number of consecutive battles, one floor deeper each
    #[arg(long, default_value_t = 1)]
    battles: u32,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Party species, in formation order
    #[arg(long, num_args = 1.., default_values = ["summoner", "pixie", "goblin"])]
    party: Vec<String>,

    /// Starting level of every recruit
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Rounds before a battle is called as a defeat
    #[arg(long, default_value_t = 30)]
    rounds: u32,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let factory = ContentFactory::new(data_dir(cli.data.clone()));
    let catalog = factory.load_catalog()?;
    let config = factory.load_config()?;
    let encounters = factory.load_encounters()?;

    for missing in missing_references(&catalog) {
        tracing::warn!("{missing}");
    }

    let mut party = Party::new();
    for species in &cli.party {
        party
            .add_actor(&catalog, &config, species, cli.level)
            .with_context(|| format!("Failed to recruit '{species}'"))?;
    }

    let mut rng = match cli.seed {
        Some(seed) => SystemRng::seeded(seed),
        None => SystemRng::from_entropy(),
    };

    for floor in cli.floor..cli.floor.saturating_add(cli.battles) {
        let (outcome, next_rng) =
            fight(&cli, &catalog, &config, &encounters, &mut party, floor, rng)?;
        rng = next_rng;
        if outcome == Outcome::Defeat {
            tracing::info!(floor, "party defeated");
            break;
        }
    }

    tracing::info!(gold = party.gold, "run finished");
    for member in party.members() {
        tracing::info!(
            unit = %member.id,
            name = %member.name,
            level = member.level,
            exp = member.exp,
            hp = member.hp(),
            "party member"
        );
    }
    Ok(())
}

/// Fights one encounter and writes the result back onto the party.
fn fight(
    cli: &Cli,
    catalog: &Catalog,
    config: &BattleConfig,
    encounters: &EncounterTable,
    party: &mut Party,
    floor: u32,
    rng: SystemRng,
) -> Result<(Outcome, SystemRng)> {
    let mut battle = Battle::new(catalog, config, rng);
    battle.set_allies(party.deploy());
    if battle.start_encounter(encounters, floor) == Step::NoEncounter {
        bail!("No encounter pool covers floor {floor}");
    }

    let outcome = match battle.run(cli.rounds) {
        Step::Finished(outcome) => outcome,
        _ => {
            tracing::warn!(floor, rounds = cli.rounds, "round limit reached");
            match battle.end(false) {
                Step::Finished(outcome) => outcome,
                _ => Outcome::Defeat,
            }
        }
    };

    for event in battle.take_events() {
        if cli.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            let line = report::describe(&event, |id| {
                battle
                    .battler(id)
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| id.to_string())
            });
            println!("{line}");
        }
    }

    let rewards = battle.rewards().cloned();
    let (allies, rng) = battle.into_parts();
    party.absorb(allies);
    if let Some(rewards) = &rewards {
        party.apply_rewards(rewards);
    }
    Ok((outcome, rng))
}

const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../battle/content/data");

/// `--data`, then `CONTENT_DATA_DIR`, then the bundled content directory.
fn data_dir(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os("CONTENT_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(BUNDLED_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_defaults_to_three_recruits() {
        let cli = Cli::parse_from(["battle-sim"]);
        assert_eq!(cli.party, ["summoner", "pixie", "goblin"]);
        assert_eq!(cli.floor, 1);
        assert!(cli.seed.is_none());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = data_dir(Some(PathBuf::from("/tmp/content")));
        assert_eq!(dir, PathBuf::from("/tmp/content"));
    }

    #[test]
    fn bundled_data_dir_exists() {
        assert!(PathBuf::from(BUNDLED_DATA_DIR).join("species.ron").exists());
    }
}
