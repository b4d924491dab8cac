pub mod config;
pub mod error;
pub mod types;

pub use config::{CombatConfig, ThreatTuning};
pub use error::{CombatError, Result};
pub use types::{FactionId, GridPos, MapDimensions, ObstacleId, SquadId, UnitId};
