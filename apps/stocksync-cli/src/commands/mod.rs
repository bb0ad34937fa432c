//! Subcommand implementations.

pub mod reserve;
pub mod snapshot;
pub mod sync;
