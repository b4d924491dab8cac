//! Turn-based squad combat: factions, turns, movement, attacks and victory
//!
//! Every system works against an explicit `CombatWorld`; nothing here reads
//! ambient state. `CombatService` bundles the systems for callers that just
//! want the upstream operations.

pub mod actions;
pub mod faction;
pub mod log;
pub mod movement;
pub mod query_cache;
pub mod service;
pub mod turns;
pub mod victory;
pub mod world;

// Re-exports for convenient access
pub use actions::CombatActionSystem;
pub use faction::{Faction, FactionManager};
pub use log::{BattleEvent, BattleEventLog, BattleEventType};
pub use movement::{MoveOutcome, MovementSystem};
pub use query_cache::{ActionState, CombatQueryCache, MapLink};
pub use service::{AttackResult, CombatService, MoveResult};
pub use turns::{TurnManager, TurnState};
pub use victory::{check_victory_condition, VictoryCheckResult};
pub use world::CombatWorld;
