//! Shared models for the steam-hosts workspace.
//!
//! * [`config`]: run configuration assembled by the CLI.
//! * [`domains`]: the managed domain list.
//! * [`error`]: fatal error taxonomy.
//! * [`stamp`]: the per-run timestamp shared by backups and block headers.

pub mod config;
pub mod domains;
pub mod error;
pub mod stamp;
