//! Hint command handler: rank the stations next to a frontier.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use ekitsunagi_lib::closest_candidates;

use crate::commands::load_graph;
use crate::output::{render_hints, OutputFormat};
use crate::terminal::ColorPalette;

#[derive(Debug, Clone)]
pub struct HintCommandArgs {
    pub graph: PathBuf,
    pub goal: String,
    /// Stations already visited.
    pub frontier: Vec<String>,
    /// Maximum number of candidates to show.
    pub count: usize,
}

pub fn handle_hint<W: Write>(
    out: &mut W,
    args: &HintCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let hints = closest_candidates(&graph, &args.frontier, &args.goal, args.count)?;
    render_hints(out, &args.goal, &hints, format, ColorPalette::detect())?;
    Ok(())
}
