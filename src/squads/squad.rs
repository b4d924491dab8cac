use serde::{Deserialize, Serialize};

use crate::core::types::{GridPos, SquadId, UnitId};

/// A group of units sharing one map tile and one action economy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub id: SquadId,
    pub name: String,
    pub units: Vec<UnitId>,
    /// Tile position record; attached the first time the squad is placed
    pub position: Option<GridPos>,
    pub destroyed: bool,
}

impl Squad {
    pub fn new(id: SquadId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            units: Vec::new(),
            position: None,
            destroyed: false,
        }
    }
}
