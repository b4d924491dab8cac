//! Per-unit digest of a combat log

use serde::{Deserialize, Serialize};

use crate::combat::events::{CombatLog, HitKind};
use crate::core::types::UnitId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEngagement {
    pub unit: UnitId,
    pub name: String,
    pub attacks: u32,
    pub hits: u32,
    pub criticals: u32,
    pub misses: u32,
    pub dodges: u32,
    pub damage_dealt: u32,
    pub kills: u32,
    pub targets: Vec<UnitId>,
}

impl UnitEngagement {
    fn new(unit: UnitId, name: &str) -> Self {
        Self {
            unit,
            name: name.to_string(),
            attacks: 0,
            hits: 0,
            criticals: 0,
            misses: 0,
            dodges: 0,
            damage_dealt: 0,
            kills: 0,
            targets: Vec::new(),
        }
    }

    /// One-line description, e.g. "Archer: 2 hits (1 crit), 1 dodged -> 14 dmg, 1 kill"
    pub fn describe(&self) -> String {
        if self.attacks == 0 {
            return format!("{}: no attacks", self.name);
        }
        let mut parts = vec![format!("{} hits", self.hits + self.criticals)];
        if self.criticals > 0 {
            parts[0].push_str(&format!(" ({} crit)", self.criticals));
        }
        if self.misses > 0 {
            parts.push(format!("{} missed", self.misses));
        }
        if self.dodges > 0 {
            parts.push(format!("{} dodged", self.dodges));
        }
        let mut line = format!("{}: {} -> {} dmg", self.name, parts.join(", "), self.damage_dealt);
        if self.kills > 0 {
            line.push_str(&format!(", {} kill{}", self.kills, if self.kills == 1 { "" } else { "s" }));
        }
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub units: Vec<UnitEngagement>,
}

impl EngagementSummary {
    /// Aggregate events per attacking unit, in snapshot order
    pub fn from_log(log: &CombatLog) -> Self {
        let mut units: Vec<UnitEngagement> = log
            .attacking_units
            .iter()
            .map(|u| UnitEngagement::new(u.id, &u.name))
            .collect();

        for event in &log.events {
            let idx = match units.iter().position(|u| u.unit == event.attacker) {
                Some(idx) => idx,
                None => {
                    units.push(UnitEngagement::new(event.attacker, &event.attacker_name));
                    units.len() - 1
                }
            };
            let entry = &mut units[idx];
            entry.attacks += 1;
            match event.hit.kind {
                HitKind::Miss => entry.misses += 1,
                HitKind::Dodge => entry.dodges += 1,
                HitKind::Hit => entry.hits += 1,
                HitKind::Critical => entry.criticals += 1,
            }
            entry.damage_dealt += event.final_damage;
            if event.killed {
                entry.kills += 1;
            }
            if !entry.targets.contains(&event.defender) {
                entry.targets.push(event.defender);
            }
        }

        Self { units }
    }

    pub fn total_kills(&self) -> u32 {
        self.units.iter().map(|u| u.kills).sum()
    }

    pub fn lines(&self) -> Vec<String> {
        self.units.iter().map(UnitEngagement::describe).collect()
    }
}
