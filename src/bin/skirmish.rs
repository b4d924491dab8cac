//! Headless Skirmish Runner
//!
//! Runs a scripted AI-vs-AI squad skirmish and prints the outcome.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use squad_tactics::battle::{CombatService, CombatWorld};
use squad_tactics::combat::EngagementSummary;
use squad_tactics::core::{CombatConfig, FactionId, GridPos, MapDimensions, SquadId};
use squad_tactics::squads::{templates, SquadRoster};

/// Headless Skirmish Runner - greedy AI factions fight to elimination
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a turn-based squad skirmish between AI factions")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of factions taking part
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=3))]
    factions: u8,

    /// Round cap before the skirmish is called
    #[arg(long, default_value_t = 30)]
    max_rounds: u32,

    /// Combat tuning file (TOML)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Print the battle log to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Serialize)]
struct FactionReport {
    id: FactionId,
    name: String,
    squads_remaining: usize,
    units_alive: usize,
}

#[derive(Serialize)]
struct SkirmishResult {
    seed: u64,
    battle_over: bool,
    victor: Option<FactionId>,
    victor_name: String,
    rounds_completed: u32,
    attacks: u32,
    total_damage: u32,
    factions: Vec<FactionReport>,
}

const MAP: MapDimensions = MapDimensions::new(16, 16);

/// Deployment corners per faction: two squads each
const DEPLOYMENTS: [[GridPos; 2]; 3] = [
    [GridPos::new(1, 6), GridPos::new(1, 9)],
    [GridPos::new(14, 6), GridPos::new(14, 9)],
    [GridPos::new(7, 1), GridPos::new(8, 14)],
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("squad_tactics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut roster = SquadRoster::new();
    let names = ["Red", "Blue", "Green"];
    let mut lineup: Vec<(usize, SquadId, GridPos)> = Vec::new();
    for (i, name) in names.iter().take(args.factions as usize).enumerate() {
        let deploy = DEPLOYMENTS[i];
        let squads = [
            templates::line_squad(&mut roster, &format!("{} Line", name)),
            templates::skirmish_squad(&mut roster, &format!("{} Skirmishers", name)),
        ];
        for (squad, pos) in squads.into_iter().zip(deploy) {
            match squad {
                Ok(squad) => lineup.push((i, squad, pos)),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    let mut service = CombatService::new(&config, CombatWorld::new(MAP, roster), seed);
    let faction_ids: Vec<FactionId> = names
        .iter()
        .take(args.factions as usize)
        .map(|name| service.create_faction(name, false))
        .collect();
    for (i, squad, pos) in lineup {
        if let Err(e) = service.add_squad_to_faction(faction_ids[i], squad, pos) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    if let Err(e) = service.initialize_combat(&faction_ids) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let mut attacks = 0;
    let mut total_damage = 0;
    let mut printed = 0;
    let victory = loop {
        let Some(faction) = service.turns().current_faction() else {
            break service.end_combat();
        };
        for squad in service.world().active_squads_for_faction(faction) {
            let (a, d) = take_turn(&mut service, squad);
            attacks += a;
            total_damage += d;
        }

        if args.verbose {
            for event in service.events().since(printed) {
                eprintln!("  [{}] {:?}: {}", event.round, event.event_type, event.description);
            }
            printed = service.events().len();
        }

        if service.check_victory_condition().battle_over {
            break service.end_combat();
        }
        match service.end_turn() {
            Ok(_) if service.turns().current_round() > args.max_rounds => {
                tracing::warn!("Round cap of {} reached", args.max_rounds);
                break service.end_combat();
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not end turn: {}", e);
                break service.end_combat();
            }
        }
    };

    let world = service.world();
    let result = SkirmishResult {
        seed,
        battle_over: victory.battle_over,
        victor: victory.victor_faction,
        victor_name: victory.victor_name.clone(),
        rounds_completed: victory.rounds_completed,
        attacks,
        total_damage,
        factions: faction_ids
            .iter()
            .map(|f| {
                let squads = world.active_squads_for_faction(*f);
                FactionReport {
                    id: *f,
                    name: service.faction_manager().faction_name(world, *f),
                    squads_remaining: squads.len(),
                    units_alive: squads.iter().map(|s| world.roster.alive_units(*s).count()).sum(),
                }
            })
            .collect(),
    };

    match args.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        OutputFormat::Text => {
            println!("Skirmish Result");
            println!("===============");
            if result.battle_over {
                match result.victor {
                    Some(_) => println!("Victor: {}", result.victor_name),
                    None => println!("Outcome: draw"),
                }
            } else {
                println!("Outcome: undecided after round cap");
            }
            println!("Rounds: {}", result.rounds_completed);
            println!("Attacks: {} ({} damage)", result.attacks, result.total_damage);
            println!();
            for report in &result.factions {
                println!(
                    "{}: {} squads, {} units standing",
                    report.name, report.squads_remaining, report.units_alive
                );
            }
            println!("Seed: {}", result.seed);
        }
    }
}

fn load_config(args: &Args) -> squad_tactics::core::Result<CombatConfig> {
    let config = match &args.config {
        Some(path) => CombatConfig::load(path)?,
        None => CombatConfig::default(),
    };
    config
        .validate()
        .map_err(squad_tactics::core::CombatError::Config)?;
    Ok(config)
}

/// Attack the weakest enemy in reach, otherwise close on the nearest one
/// and try again. Returns (attacks, damage).
fn take_turn(service: &mut CombatService, squad: SquadId) -> (u32, u32) {
    if let Some(damage) = attack_weakest(service, squad) {
        return (1, damage);
    }

    let world = service.world();
    let Some(origin) = world.squad_position(squad) else {
        return (0, 0);
    };
    let own = world.squad_faction(squad);
    let nearest = world
        .all_factions()
        .iter()
        .filter(|f| Some(**f) != own)
        .flat_map(|f| world.squads_for_faction(*f).iter().copied())
        .filter_map(|s| world.squad_position(s))
        .min_by_key(|pos| origin.chebyshev_distance(pos));
    let Some(goal) = nearest else {
        return (0, 0);
    };

    let step = service
        .valid_movement_tiles(squad)
        .into_iter()
        .min_by_key(|tile| (tile.chebyshev_distance(&goal), tile.manhattan_distance(&goal)));
    if let Some(tile) = step {
        if tile.chebyshev_distance(&goal) < origin.chebyshev_distance(&goal) {
            let moved = service.move_squad(squad, tile);
            if !moved.success {
                tracing::warn!("{} could not move: {:?}", moved.squad_name, moved.reason);
            }
        }
    }

    match attack_weakest(service, squad) {
        Some(damage) => (1, damage),
        None => (0, 0),
    }
}

fn attack_weakest(service: &mut CombatService, squad: SquadId) -> Option<u32> {
    let world = service.world();
    let target = service
        .squads_in_range(squad)
        .into_iter()
        .min_by_key(|s| world.roster.alive_units(*s).map(|u| u.current_hp).sum::<u32>())?;

    let result = service.execute_squad_attack(squad, target);
    if !result.success {
        tracing::warn!(
            "{} could not attack {}: {:?}",
            result.attacker_name,
            result.target_name,
            result.reason
        );
        return None;
    }
    if let Some(log) = &result.combat_log {
        tracing::debug!("\n{}", log);
        for line in EngagementSummary::from_log(log).lines() {
            tracing::debug!("  {}", line);
        }
    }
    Some(result.damage_dealt)
}
