//! `rosterctl` library: configuration loading and the command-line and
//! terminal front ends over [`roster_core::Dashboard`].
//!
//! The binary is a thin wrapper around [`cli::run`]; everything else lives
//! here so integration tests and other tools can reuse the pieces.

pub mod cli;
pub mod config;
pub mod util;
