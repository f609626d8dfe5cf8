//! Subcommand implementations.

pub mod completion;
pub mod ipc;
pub mod launch;
pub mod play;
pub mod setup_hash;
pub mod verify;
