//! ekitsunagi CLI library.
//!
//! Subcommand handlers and output formatting for the `ekitsunagi-cli`
//! binary, kept in a library so they can be tested without spawning it.

pub mod commands;
pub mod output;
pub mod terminal;
