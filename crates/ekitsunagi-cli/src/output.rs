//! Output formatting for query and build results.
//!
//! Every renderer writes either a human-readable text view or a JSON
//! document to the supplied writer, so commands can target stdout while tests
//! capture into a buffer.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use ekitsunagi_lib::{BuildReport, Graph, Hint, LineCode, LineTag, PathResult};

use crate::terminal::ColorPalette;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Display label for the connection an edge represents.
pub fn line_label(graph: &Graph, line: LineTag) -> String {
    match line {
        LineTag::Walking => "walking".to_string(),
        LineTag::Line(code) => graph
            .line_name(code)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("line {code}")),
    }
}

#[derive(Serialize)]
struct PathView<'a> {
    start: &'a str,
    goal: &'a str,
    stop_count: usize,
    line_changes: usize,
    steps: Vec<StepView<'a>>,
}

#[derive(Serialize)]
struct StepView<'a> {
    station: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<LineTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_name: Option<String>,
}

/// Render a shortest path.
pub fn render_path<W: Write>(
    out: &mut W,
    graph: &Graph,
    path: &PathResult,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let view = PathView {
                start: path.start(),
                goal: path.goal(),
                stop_count: path.stop_count,
                line_changes: path.line_changes(),
                steps: path
                    .steps
                    .iter()
                    .map(|step| StepView {
                        station: &step.station,
                        line: step.line,
                        line_name: step.line.map(|line| line_label(graph, line)),
                    })
                    .collect(),
            };
            write_json(out, &view)
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "Route from {} to {} ({} {}, {} line {}):",
                path.start(),
                path.goal(),
                path.stop_count,
                plural(path.stop_count, "stop", "stops"),
                path.line_changes(),
                plural(path.line_changes(), "change", "changes"),
            )?;
            for step in &path.steps {
                let (tag, color) = match step.line {
                    None => ("STRT", palette.tag_start),
                    Some(LineTag::Walking) => ("WALK", palette.tag_walk),
                    Some(LineTag::Line(_)) => ("LINE", palette.tag_line),
                };
                write!(
                    out,
                    "  {color}{tag}{reset} {bold}{}{reset}",
                    step.station,
                    reset = palette.reset,
                    bold = palette.white_bold,
                )?;
                match step.line {
                    Some(line) => writeln!(
                        out,
                        " {}({}){}",
                        palette.gray,
                        line_label(graph, line),
                        palette.reset
                    )?,
                    None => writeln!(out)?,
                }
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct HintsView<'a> {
    goal: &'a str,
    hints: &'a [Hint],
}

/// Render ranked hint candidates.
pub fn render_hints<W: Write>(
    out: &mut W,
    goal: &str,
    hints: &[Hint],
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &HintsView { goal, hints }),
        OutputFormat::Text => {
            if hints.is_empty() {
                return writeln!(out, "No candidate stations next to the frontier.");
            }
            writeln!(out, "Closest next stations to {goal}:")?;
            for (rank, hint) in hints.iter().enumerate() {
                writeln!(
                    out,
                    "  {}. {bold}{}{reset} {gray}({} {} to go){reset}",
                    rank + 1,
                    hint.station,
                    hint.distance,
                    plural(hint.distance, "stop", "stops"),
                    bold = palette.white_bold,
                    gray = palette.gray,
                    reset = palette.reset,
                )?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct LineView<'a> {
    line: LineCode,
    name: Option<&'a str>,
    stations: &'a [String],
}

/// Render the stations of one line in travel order.
pub fn render_line<W: Write>(
    out: &mut W,
    graph: &Graph,
    line: LineCode,
    stations: &[String],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &LineView {
                line,
                name: graph.line_name(line),
                stations,
            },
        ),
        OutputFormat::Text => {
            writeln!(
                out,
                "{} ({} {}):",
                line_label(graph, LineTag::Line(line)),
                stations.len(),
                plural(stations.len(), "station", "stations"),
            )?;
            for station in stations {
                writeln!(out, "  {station}")?;
            }
            Ok(())
        }
    }
}

/// Render the summary of a graph build.
pub fn render_build_report<W: Write>(
    out: &mut W,
    report: &BuildReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Text => {
            for (label, summary) in [("base", &report.base), ("walking", &report.walking)] {
                writeln!(
                    out,
                    "{label}: {} ({} stations, {} edges)",
                    summary.path.display(),
                    summary.stations,
                    summary.edges,
                )?;
                writeln!(out, "  sha256 {}", summary.digest)?;
            }
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
