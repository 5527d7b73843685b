//! Subcommand handlers. `main.rs` parses arguments and dispatches here.

use std::path::Path;

use anyhow::{Context, Result};

use ekitsunagi_lib::{read_artifact, Graph};

pub mod build;
pub mod hint;
pub mod line;
pub mod route;

/// Load a graph artifact written by the build command.
pub fn load_graph(path: &Path) -> Result<Graph> {
    read_artifact(path)
        .with_context(|| format!("failed to load graph artifact from {}", path.display()))
}
