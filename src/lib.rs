//! Hexbugs - evolving gene-tree agents on a toroidal hex world

pub mod core;
pub mod genetics;
pub mod report;
pub mod simulation;
pub mod world;
