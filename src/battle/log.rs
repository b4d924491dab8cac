//! Narrative log of what happened during a combat

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, GridPos, SquadId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub round: u32,
    pub event_type: BattleEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    CombatStarted,
    TurnStarted { faction: FactionId },
    SquadMoved { squad: SquadId, to: GridPos },
    SquadAttacked { attacker: SquadId, target: SquadId, damage: u32 },
    SquadDestroyed { squad: SquadId },
    CombatEnded { victor: Option<FactionId> },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: u32, event_type: BattleEventType, description: impl Into<String>) {
        self.events.push(BattleEvent {
            round,
            event_type,
            description: description.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded after the first `n`
    pub fn since(&self, n: usize) -> &[BattleEvent] {
        self.events.get(n..).unwrap_or(&[])
    }
}
