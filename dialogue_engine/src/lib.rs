//! # Dialogue Engine
//!
//! Editing and persistence for a [`dialogue_graph::DialogueStore`].
//!
//! ## Modules
//!
//! - **mutation**: the closed set of edit operations, applied as pure
//!   snapshot transitions
//! - **cascade**: rewrites every reference to a renamed key
//! - **persistence**: the five-file JSON export, its loader and a serialized
//!   export queue
//! - **editor**: a single-writer session with undo
//!
//! The engine logs through `tracing` and never installs a subscriber.

pub mod cascade;
pub mod config;
pub mod editor;
pub mod error;
pub mod mutation;
pub mod persistence;

#[cfg(test)]
mod testing;

pub use cascade::{cascade, cascade_in, CascadeMode};
pub use config::*;
pub use editor::*;
pub use error::*;
pub use mutation::*;
pub use persistence::{
    export, import, load_dir, Artifact, DirectorySink, ExportArtifacts, ExportId, ExportQueue,
    ExportReceipt, ExportSink, ExportTicket, Manifest, FORMAT_VERSION,
};
