//! CLI subcommand handlers. `main.rs` parses arguments and dispatches here.

pub mod airport;
pub mod route;
