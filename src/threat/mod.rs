//! Threat projection and the danger overlay

pub mod danger;
pub mod overlay;
pub mod visualizer;

pub use danger::{FactionThreatLevel, FactionThreatLevelManager, SquadThreatLevel};
pub use overlay::{Color, DangerMetric, TierScale, TileTint};
pub use visualizer::{DangerVisualizer, ViewMode};
