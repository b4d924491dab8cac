use thiserror::Error;

use crate::core::types::{FactionId, GridPos, SquadId};

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("no active combat")]
    NoActiveCombat,

    #[error("cannot initialize combat with no factions")]
    NoFactions,

    #[error("faction {0} not found")]
    FactionNotFound(FactionId),

    #[error("squad {0} not found")]
    SquadNotFound(SquadId),

    #[error("squad {0} is not in combat")]
    SquadNotInCombat(SquadId),

    #[error("squad {squad} does not belong to faction {faction}")]
    SquadNotOwnedByFaction { squad: SquadId, faction: FactionId },

    #[error("it is not the turn of squad {0}'s faction")]
    NotFactionTurn(SquadId),

    #[error("no action state for squad {0}")]
    NoActionState(SquadId),

    #[error("squad has already acted this turn")]
    AlreadyActed,

    #[error("squad has no movement remaining")]
    NoMovementRemaining,

    #[error("insufficient movement: need {need}, have {have}")]
    InsufficientMovement { need: u32, have: u32 },

    #[error("cannot move to {0}")]
    CannotMoveTo(GridPos),

    #[error("target out of range: {distance} tiles away (max range {max_range})")]
    TargetOutOfRange { distance: u32, max_range: u32 },

    #[error("attacker squad not found on map")]
    AttackerNotOnMap,

    #[error("target squad not found on map")]
    TargetNotOnMap,

    #[error("one or both squads have no faction")]
    MissingFaction,

    #[error("cannot attack your own faction")]
    SameFaction,

    #[error("occupant not registered at {0}")]
    NotAtPosition(GridPos),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
