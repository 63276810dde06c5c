//! Skyroute CLI library.
//!
//! Subcommand handlers, output renderers, and terminal styling for the
//! `skyroute` binary.

pub mod commands;
pub mod output;
pub mod terminal;
