//! Battle flow integration tests through the combat service

use squad_tactics::battle::*;
use squad_tactics::core::{CombatConfig, FactionId, GridPos, MapDimensions, SquadId};
use squad_tactics::squads::{templates, FormationSlot, SquadRoster};

fn wipe_out(service: &mut CombatService, squad: SquadId) {
    let world = service.world_mut();
    for id in world.roster.unit_ids_in_squad(squad).to_vec() {
        if let Some(unit) = world.roster.unit_mut(id) {
            unit.take_damage(u32::MAX);
        }
    }
    world.roster.update_destroyed_status(squad);
    world.remove_squad_from_map(squad);
}

/// One line squad per faction, spread along the top edge
fn service_with(factions: usize, seed: u64) -> (CombatService, Vec<FactionId>, Vec<SquadId>) {
    let config = CombatConfig::default();
    let mut roster = SquadRoster::new();
    let squads: Vec<SquadId> = (0..factions)
        .map(|i| templates::line_squad(&mut roster, &format!("Line {}", i + 1)).unwrap())
        .collect();
    let world = CombatWorld::new(MapDimensions::new(20, 20), roster);
    let mut service = CombatService::new(&config, world, seed);

    let ids: Vec<FactionId> = (0..factions)
        .map(|i| service.create_faction(&format!("Faction {}", i + 1), i == 0))
        .collect();
    for (i, (faction, squad)) in ids.iter().zip(&squads).enumerate() {
        service
            .add_squad_to_faction(*faction, *squad, GridPos::new(i as i32 * 6, 0))
            .unwrap();
    }
    (service, ids, squads)
}

#[test]
fn test_three_faction_elimination_by_round_five() {
    let (mut service, factions, squads) = service_with(3, 11);
    service.initialize_combat(&factions).unwrap();

    let mut wiped = false;
    while service.turns().current_round() < 5 {
        if service.turns().current_round() == 3 && !wiped {
            wipe_out(&mut service, squads[1]);
            wipe_out(&mut service, squads[2]);
            wiped = true;
        }
        assert!(!service.check_victory_condition().battle_over || wiped);
        service.end_turn().unwrap();
    }

    let result = service.check_victory_condition();
    assert!(result.battle_over);
    assert_eq!(result.victor_faction, Some(factions[0]));
    assert_eq!(result.victor_name, "Faction 1");
    assert_eq!(result.defeated_factions, vec![factions[1], factions[2]]);
    assert_eq!(result.rounds_completed, 5);
}

#[test]
fn test_draw_when_everyone_is_gone() {
    let (mut service, factions, squads) = service_with(2, 3);
    service.initialize_combat(&factions).unwrap();
    for squad in squads {
        wipe_out(&mut service, squad);
    }
    let result = service.check_victory_condition();
    assert!(result.battle_over);
    assert_eq!(result.victor_faction, None);
    assert!(result.victor_name.is_empty());
}

#[test]
fn test_out_of_range_attack_leaves_state_untouched() {
    let config = CombatConfig::default();
    let mut roster = SquadRoster::new();
    let a = roster
        .spawn_squad("A", &[(templates::infantry(), FormationSlot::new(0, 1))])
        .unwrap();
    let b = roster
        .spawn_squad("B", &[(templates::infantry(), FormationSlot::new(0, 1))])
        .unwrap();
    let mut service = CombatService::new(&config, CombatWorld::new(MapDimensions::new(8, 8), roster), 5);
    let red = service.create_faction("Red", false);
    let blue = service.create_faction("Blue", false);
    service.add_squad_to_faction(red, a, GridPos::new(0, 0)).unwrap();
    service.add_squad_to_faction(blue, b, GridPos::new(2, 0)).unwrap();
    service.initialize_combat(&[red, blue]).unwrap();
    if service.turns().current_faction() != Some(red) {
        service.end_turn().unwrap();
    }

    let hp_before: Vec<u32> = service.world().roster.units_in_squad(b).map(|u| u.current_hp).collect();
    let events_before = service.events().len();

    let result = service.execute_squad_attack(a, b);
    assert!(!result.success);
    assert!(result.reason.unwrap().contains("target out of range"));

    let hp_after: Vec<u32> = service.world().roster.units_in_squad(b).map(|u| u.current_hp).collect();
    assert_eq!(hp_before, hp_after);
    assert!(!service.world().action_state(a).unwrap().has_acted);
    assert_eq!(service.events().len(), events_before);
    assert!(service.is_squad_activatable(a));
}

#[test]
fn test_movement_budget_resets_each_turn() {
    let (mut service, factions, squads) = service_with(2, 9);
    service.initialize_combat(&factions).unwrap();
    let current = service.turns().current_faction().unwrap();
    let squad = if current == factions[0] { squads[0] } else { squads[1] };
    let start = service.world().squad_position(squad).unwrap();

    // Line squads move at the knight's and mage's speed of 2
    let step = service.move_squad(squad, start.offset(0, 2));
    assert!(step.success);
    assert_eq!(step.remaining_budget, 0);
    assert!(service.valid_movement_tiles(squad).is_empty());

    let stuck = service.move_squad(squad, start.offset(0, 3));
    assert!(!stuck.success);
    assert_eq!(stuck.reason.as_deref(), Some("squad has no movement remaining"));

    service.end_turn().unwrap();
    service.end_turn().unwrap();
    let state = service.world().action_state(squad).unwrap();
    assert_eq!(state.movement_remaining, 2);
    assert!(!state.has_moved);
}

#[test]
fn test_enemies_block_and_friends_pass() {
    let config = CombatConfig::default();
    let mut roster = SquadRoster::new();
    let scout = roster
        .spawn_squad("Scout", &[(templates::archer(), FormationSlot::new(0, 1))])
        .unwrap();
    let friend = roster
        .spawn_squad("Friend", &[(templates::archer(), FormationSlot::new(0, 1))])
        .unwrap();
    let enemy = roster
        .spawn_squad("Enemy", &[(templates::archer(), FormationSlot::new(0, 1))])
        .unwrap();
    let mut service = CombatService::new(&config, CombatWorld::new(MapDimensions::new(8, 8), roster), 1);
    let red = service.create_faction("Red", false);
    let blue = service.create_faction("Blue", false);
    service.add_squad_to_faction(red, scout, GridPos::new(1, 1)).unwrap();
    service.add_squad_to_faction(red, friend, GridPos::new(2, 1)).unwrap();
    service.add_squad_to_faction(blue, enemy, GridPos::new(1, 2)).unwrap();
    service.initialize_combat(&[red, blue]).unwrap();
    if service.turns().current_faction() != Some(red) {
        service.end_turn().unwrap();
    }

    let tiles = service.valid_movement_tiles(scout);
    assert!(tiles.contains(&GridPos::new(2, 1)));
    assert!(!tiles.contains(&GridPos::new(1, 2)));

    let blocked = service.move_squad(scout, GridPos::new(1, 2));
    assert!(!blocked.success);
    assert_eq!(blocked.reason.as_deref(), Some("cannot move to (1, 2)"));

    let outside = service.move_squad(scout, GridPos::new(-1, 1));
    assert!(!outside.success);

    let shared = service.move_squad(scout, GridPos::new(2, 1));
    assert!(shared.success);
    assert_eq!(service.world().spatial.entities_at(GridPos::new(2, 1)).len(), 2);
}

#[test]
fn test_attack_until_destroyed() {
    let config = CombatConfig::default();
    let mut roster = SquadRoster::new();
    let line = templates::line_squad(&mut roster, "Veterans").unwrap();
    let victim = roster
        .spawn_squad("Recruit", &[(templates::archer(), FormationSlot::new(0, 1))])
        .unwrap();
    let mut service = CombatService::new(&config, CombatWorld::new(MapDimensions::new(8, 8), roster), 21);
    let red = service.create_faction("Red", false);
    let blue = service.create_faction("Blue", false);
    service.add_squad_to_faction(red, line, GridPos::new(3, 3)).unwrap();
    service.add_squad_to_faction(blue, victim, GridPos::new(4, 3)).unwrap();
    service.initialize_combat(&[red, blue]).unwrap();

    let mut destroyed = false;
    for _ in 0..40 {
        if service.turns().current_faction() == Some(red) {
            let result = service.execute_squad_attack(line, victim);
            assert!(result.success, "{:?}", result.reason);
            if result.target_destroyed {
                destroyed = true;
                break;
            }
        }
        service.end_turn().unwrap();
    }
    assert!(destroyed);
    assert_eq!(service.world().squad_position(victim), None);
    assert!(service
        .events()
        .events
        .iter()
        .any(|e| e.event_type == BattleEventType::SquadDestroyed { squad: victim }));

    let result = service.end_combat();
    assert!(result.battle_over);
    assert_eq!(result.victor_faction, Some(red));
    assert!(service.end_turn().is_err());
    assert_eq!(service.turns().current_faction(), None);
}

#[test]
fn test_late_joiner_gets_action_state_on_its_turn() {
    let (mut service, factions, _) = service_with(2, 4);
    service.initialize_combat(&factions).unwrap();

    let squad = templates::skirmish_squad(&mut service.world_mut().roster, "Reinforcements").unwrap();
    let current = service.turns().current_faction().unwrap();
    let other = if current == factions[0] { factions[1] } else { factions[0] };
    service.add_squad_to_faction(other, squad, GridPos::new(10, 10)).unwrap();
    assert!(service.world().action_state(squad).is_none());

    service.end_turn().unwrap();
    let state = service.world().action_state(squad).unwrap();
    assert_eq!(state.movement_remaining, 3);
    assert!(service.is_squad_activatable(squad));
}

#[test]
fn test_player_faction_names_and_mana() {
    let config = CombatConfig::default();
    let mut service = CombatService::new(&config, CombatWorld::new(MapDimensions::new(4, 4), SquadRoster::new()), 0);
    let faction = service.create_faction_with_player("Crimson Host", 1, "Ada");

    let manager = service.faction_manager();
    assert_eq!(manager.faction_name(service.world(), faction), "Crimson Host");
    assert_eq!(manager.faction_mana(service.world(), faction), Some((100, 100)));
    assert_eq!(manager.player_factions(service.world()), vec![faction]);
    assert_eq!(
        service.world().cache.faction(faction).map(|f| f.display_name()),
        Some("Crimson Host (Ada)".to_string())
    );
}
