//! Threat projection and danger overlay integration tests

use squad_tactics::battle::{CombatService, CombatWorld};
use squad_tactics::core::{CombatConfig, FactionId, GridPos, MapDimensions, SquadId};
use squad_tactics::squads::{templates, SquadRoster};
use squad_tactics::threat::{DangerMetric, DangerVisualizer, ViewMode};

struct Battle {
    service: CombatService,
    factions: [FactionId; 2],
    squads: [SquadId; 2],
}

fn battle(config: &CombatConfig) -> Battle {
    let mut roster = SquadRoster::new();
    let red_squad = templates::line_squad(&mut roster, "Red Line").unwrap();
    let blue_squad = templates::skirmish_squad(&mut roster, "Blue Skirmishers").unwrap();
    let mut service = CombatService::new(config, CombatWorld::new(MapDimensions::new(24, 24), roster), 17);
    let red = service.create_faction("Red", false);
    let blue = service.create_faction("Blue", false);
    service.add_squad_to_faction(red, red_squad, GridPos::new(4, 12)).unwrap();
    service.add_squad_to_faction(blue, blue_squad, GridPos::new(19, 12)).unwrap();
    service.initialize_combat(&[red, blue]).unwrap();
    Battle {
        service,
        factions: [red, blue],
        squads: [red_squad, blue_squad],
    }
}

#[test]
fn test_every_faction_is_projected() {
    let b = battle(&CombatConfig::default());
    for (faction, squad) in b.factions.iter().zip(&b.squads) {
        let threat = b.service.threats().squad_threat(*faction, *squad).unwrap();
        assert!(threat.max_threat_range() > 0);
        assert!(threat.danger_at(1) > 0.0);
        assert!(threat.expected_damage_at(1) > 0.0);
        assert_eq!(threat.danger_at(threat.max_threat_range() + 1), 0.0);
    }
}

#[test]
fn test_moving_shrinks_remaining_reach() {
    let mut b = battle(&CombatConfig::default());
    let current = b.service.turns().current_faction().unwrap();
    let idx = if current == b.factions[0] { 0 } else { 1 };
    let squad = b.squads[idx];

    let before = b.service.threats().squad_threat(current, squad).unwrap().max_threat_range();
    let start = b.service.world().squad_position(squad).unwrap();
    let moved = b.service.move_squad(squad, start.offset(0, 1));
    assert!(moved.success, "{:?}", moved.reason);

    let after = b.service.threats().squad_threat(current, squad).unwrap().max_threat_range();
    assert_eq!(after, before - 1);
}

#[test]
fn test_overlay_tracks_round_and_view() {
    let config = CombatConfig::default();
    let mut b = battle(&config);
    let mut vis = DangerVisualizer::new(b.service.world().dimensions, &config);
    let center = GridPos::new(12, 12);

    // Inactive overlays never repaint
    assert!(!b.service.refresh_visualizer(&mut vis, center));

    vis.toggle();
    assert!(b.service.refresh_visualizer(&mut vis, center));
    assert!(!b.service.refresh_visualizer(&mut vis, center));
    let enemy_tiles = vis.painted_tiles();
    assert!(enemy_tiles > 0);

    vis.switch_view();
    assert_eq!(vis.view_mode(), ViewMode::OwnThreats);
    assert!(b.service.refresh_visualizer(&mut vis, center));

    vis.cycle_metric();
    assert_eq!(vis.metric(), DangerMetric::ExpectedDamage);
    assert!(b.service.refresh_visualizer(&mut vis, center));

    vis.clear_visualization();
    assert_eq!(vis.painted_tiles(), 0);
    assert!(vis.overlay().iter().all(|(_, tint)| tint.is_none()));
    assert!(b.service.refresh_visualizer(&mut vis, center));

    b.service.end_turn().unwrap();
    b.service.end_turn().unwrap();
    assert!(b.service.refresh_visualizer(&mut vis, center));
}

#[test]
fn test_lower_thresholds_raise_tiers() {
    let config = CombatConfig {
        danger_thresholds: [1.0, 2.0, 3.0],
        ..CombatConfig::default()
    };
    let b = battle(&config);
    let mut vis = DangerVisualizer::new(b.service.world().dimensions, &config);
    vis.toggle();
    b.service.refresh_visualizer(&mut vis, GridPos::new(12, 12));

    let highest = vis
        .overlay()
        .iter()
        .filter_map(|(_, tint)| *tint)
        .all(|tint| tint.tier == 3);
    assert!(highest);
    assert!(vis.painted_tiles() > 0);
}

#[test]
fn test_shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/combat.toml");
    let config = CombatConfig::load(path).unwrap();
    assert_eq!(config, CombatConfig::default());
    assert!(config.validate().is_ok());
}
