//! Squad Tactics - turn-based squad combat engine

pub mod battle;
pub mod combat;
pub mod core;
pub mod spatial;
pub mod squads;
pub mod threat;
