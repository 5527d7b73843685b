//! Route command handler for shortest paths between two stations.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use ekitsunagi_lib::shortest_path;

use crate::commands::load_graph;
use crate::output::{render_path, OutputFormat};
use crate::terminal::ColorPalette;

#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Graph artifact to query.
    pub graph: PathBuf,
    pub from: String,
    pub to: String,
}

pub fn handle_route<W: Write>(
    out: &mut W,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let path = shortest_path(&graph, &args.from, &args.to)?;
    debug!(
        from = %args.from,
        to = %args.to,
        stops = path.stop_count,
        "computed route"
    );

    render_path(out, &graph, &path, format, ColorPalette::detect())?;
    Ok(())
}
