//! Line command handler: list one line's stations in travel order.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};

use ekitsunagi_lib::LineCode;

use crate::commands::load_graph;
use crate::output::{render_line, OutputFormat};

#[derive(Debug, Clone)]
pub struct LineCommandArgs {
    pub graph: PathBuf,
    pub line: LineCode,
}

pub fn handle_line<W: Write>(
    out: &mut W,
    args: &LineCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let stations = graph.line_stations(args.line);
    if stations.is_empty() {
        bail!(
            "line {} has no edges in {}",
            args.line,
            args.graph.display()
        );
    }

    render_line(out, &graph, args.line, &stations, format)?;
    Ok(())
}
