//! Danger overlay for the tactical map
//!
//! Paints the tiles around a viewport center with the summed threat of
//! either every enemy faction or the faction whose turn it is. Results are
//! cached per round; view or metric changes invalidate the cache.

use crate::battle::world::CombatWorld;
use crate::core::config::CombatConfig;
use crate::core::types::{FactionId, GridPos, MapDimensions, SquadId};
use crate::spatial::TileGrid;

use super::danger::FactionThreatLevelManager;
use super::overlay::{DangerMetric, TierScale, TileTint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Everything the current faction has to fear
    #[default]
    EnemyThreats,
    /// What the current faction projects
    OwnThreats,
}

pub struct DangerVisualizer {
    active: bool,
    view_mode: ViewMode,
    metric: DangerMetric,
    last_update_round: Option<u32>,
    overlay: TileGrid<Option<TileTint>>,
    dimensions: MapDimensions,
    scale: TierScale,
    viewport_size: u32,
}

impl DangerVisualizer {
    pub fn new(dimensions: MapDimensions, config: &CombatConfig) -> Self {
        Self {
            active: false,
            view_mode: ViewMode::default(),
            metric: DangerMetric::default(),
            last_update_round: None,
            overlay: TileGrid::for_map(dimensions),
            dimensions,
            scale: TierScale {
                thresholds: config.danger_thresholds,
                opacities: config.overlay_opacities,
            },
            viewport_size: config.viewport_size,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn metric(&self) -> DangerMetric {
        self.metric
    }

    pub fn last_update_round(&self) -> Option<u32> {
        self.last_update_round
    }

    /// Turning the overlay off clears it
    pub fn toggle(&mut self) {
        self.active = !self.active;
        if !self.active {
            self.clear_visualization();
        }
    }

    pub fn switch_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::EnemyThreats => ViewMode::OwnThreats,
            ViewMode::OwnThreats => ViewMode::EnemyThreats,
        };
        self.invalidate();
    }

    pub fn cycle_metric(&mut self) {
        self.metric = self.metric.next();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.last_update_round = None;
        if self.active {
            self.clear_visualization();
        }
    }

    pub fn clear_visualization(&mut self) {
        self.overlay.reset();
        self.last_update_round = None;
    }

    /// Repaint for `round` if needed; returns whether anything was recomputed
    pub fn update(
        &mut self,
        world: &CombatWorld,
        threats: &FactionThreatLevelManager,
        current_faction: FactionId,
        round: u32,
        center: GridPos,
    ) -> bool {
        if !self.active || self.last_update_round == Some(round) {
            return false;
        }

        let sources = self.relevant_squads(world, threats, current_faction);
        self.overlay.reset();
        self.last_update_round = Some(round);
        if sources.is_empty() {
            return true;
        }

        let half = (self.viewport_size / 2) as i32;
        for y in (center.y - half)..=(center.y + half) {
            for x in (center.x - half)..=(center.x + half) {
                let tile = GridPos::new(x, y);
                if !self.dimensions.contains(tile) {
                    continue;
                }
                let value = self.value_at(threats, &sources, tile);
                self.overlay.set(tile, self.scale.tint(self.metric, value));
            }
        }
        tracing::debug!(
            "Danger overlay painted for round {} ({} sources, {:?})",
            round,
            sources.len(),
            self.metric
        );
        true
    }

    fn relevant_squads(
        &self,
        world: &CombatWorld,
        threats: &FactionThreatLevelManager,
        current_faction: FactionId,
    ) -> Vec<(FactionId, SquadId, GridPos)> {
        let factions: Vec<FactionId> = world
            .all_factions()
            .iter()
            .copied()
            .filter(|f| match self.view_mode {
                ViewMode::EnemyThreats => *f != current_faction,
                ViewMode::OwnThreats => *f == current_faction,
            })
            .collect();

        factions
            .into_iter()
            .flat_map(|f| world.squads_for_faction(f).iter().map(move |s| (f, *s)))
            .filter(|(f, s)| threats.squad_threat(*f, *s).is_some())
            .filter_map(|(f, s)| world.squad_position(s).map(|pos| (f, s, pos)))
            .collect()
    }

    fn value_at(
        &self,
        threats: &FactionThreatLevelManager,
        sources: &[(FactionId, SquadId, GridPos)],
        tile: GridPos,
    ) -> f32 {
        sources
            .iter()
            .filter_map(|(f, s, pos)| {
                let threat = threats.squad_threat(*f, *s)?;
                let distance = tile.chebyshev_distance(pos);
                Some(match self.metric {
                    DangerMetric::Danger => threat.danger_at(distance),
                    DangerMetric::ExpectedDamage => threat.expected_damage_at(distance),
                })
            })
            .sum()
    }

    pub fn tint_at(&self, pos: GridPos) -> Option<TileTint> {
        self.overlay.get(pos).copied().flatten()
    }

    pub fn overlay(&self) -> &TileGrid<Option<TileTint>> {
        &self.overlay
    }

    pub fn painted_tiles(&self) -> usize {
        self.overlay.iter().filter(|(_, t)| t.is_some()).count()
    }
}
