//! # steam-hosts core
//!
//! * [`hosts`]: hosts file model and text transformations.
//! * [`backup`]: timestamped pre-change copies.
//! * [`resolver`]: the [`resolver::DnsResolver`] seam and its UDP implementation.
//! * [`editor`]: the update use case.
//! * [`verify`]: the verification use case.

pub mod backup;
pub mod editor;
pub mod hosts;
pub mod resolver;
pub mod verify;
