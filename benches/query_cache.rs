//! Cached lookups against a populated combat world
//!
//! Run with: cargo bench --bench query_cache

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use squad_tactics::battle::{CombatWorld, FactionManager};
use squad_tactics::core::{CombatConfig, GridPos, MapDimensions, SquadId};
use squad_tactics::squads::{templates, SquadRoster};

fn populated_world(squads_per_faction: usize) -> (CombatWorld, Vec<SquadId>) {
    let config = CombatConfig::default();
    let mut roster = SquadRoster::new();
    let mut ids = Vec::new();
    for i in 0..squads_per_faction * 2 {
        if let Ok(squad) = templates::skirmish_squad(&mut roster, &format!("Squad {}", i)) {
            ids.push(squad);
        }
    }

    let mut world = CombatWorld::new(MapDimensions::new(128, 128), roster);
    let mut factions = FactionManager::new(&config);
    let red = factions.create_faction(&mut world, "Red", false);
    let blue = factions.create_faction(&mut world, "Blue", false);
    for (i, squad) in ids.iter().enumerate() {
        let faction = if i % 2 == 0 { red } else { blue };
        let pos = GridPos::new((i % 128) as i32, (i / 128) as i32);
        let _ = factions.add_squad_to_faction(&mut world, faction, *squad, pos);
        world.create_action_state(*squad, 3);
    }
    (world, ids)
}

fn bench_action_state_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("action_state");

    for n in [10, 100, 1000].iter() {
        let (world, ids) = populated_world(*n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}_squads", n * 2)), n, |b, _| {
            b.iter(|| {
                let ready = ids
                    .iter()
                    .filter_map(|s| world.action_state(black_box(*s)))
                    .filter(|s| !s.has_acted)
                    .count();
                black_box(ready)
            });
        });
    }

    group.finish();
}

fn bench_faction_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("faction_queries");

    for n in [10, 100, 1000].iter() {
        let (world, ids) = populated_world(*n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}_squads", n * 2)), n, |b, _| {
            b.iter(|| {
                let owned = ids
                    .iter()
                    .filter_map(|s| world.squad_faction(black_box(*s)))
                    .count();
                let active: usize = world
                    .all_factions()
                    .iter()
                    .map(|f| world.active_squads_for_faction(*f).len())
                    .sum();
                black_box((owned, active))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_action_state_lookup, bench_faction_queries);
criterion_main!(benches);
