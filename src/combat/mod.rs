//! Attack resolution and combat logging

pub mod adapter;
pub mod cover;
pub mod events;
pub mod resolver;
pub mod summary;
pub mod targeting;

pub use adapter::{CanActGuard, ParticipationFilter, SquadWideResolver};
pub use events::{
    AttackEvent, CombatLog, CoverContribution, HitKind, HitResult, Roll, SquadStatus, UnitSnapshot,
};
pub use resolver::{AttackRequest, AttackResolver, Dice, ResolutionRules, SquadCombatResolver};
pub use summary::{EngagementSummary, UnitEngagement};
pub use targeting::select_targets;
