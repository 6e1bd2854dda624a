//! # Dialogue Graph
//!
//! The normalized in-memory model of a branching dialogue tree: characters,
//! the lines they speak, the responses a player can pick, the conditions
//! gating those responses and the categories responses are filed under.
//!
//! This crate only holds data and answers questions about it. Mutation rules,
//! renames and persistence live in `dialogue_engine`.

pub mod entities;
pub mod references;
pub mod store;

pub use entities::*;
pub use references::*;
pub use store::*;
