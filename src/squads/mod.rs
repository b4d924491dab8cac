//! Squad and unit registry

pub mod roster;
pub mod squad;
pub mod templates;
pub mod unit;

pub use roster::SquadRoster;
pub use squad::Squad;
pub use unit::{
    AttackPattern, CoverProfile, FormationSlot, Unit, UnitRole, UnitStats, UnitTemplate,
    FORMATION_COLS, FORMATION_ROWS,
};
