use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ekitsunagi_cli::commands::build::{handle_build, BuildCommandArgs};
use ekitsunagi_cli::commands::hint::{handle_hint, HintCommandArgs};
use ekitsunagi_cli::commands::line::{handle_line, LineCommandArgs};
use ekitsunagi_cli::commands::route::{handle_route, RouteCommandArgs};
use ekitsunagi_cli::output::OutputFormat;
use ekitsunagi_lib::LineCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Station graph builder and route queries")]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the base and walking graph artifacts for one area.
    Build {
        /// Area configuration JSON.
        #[arg(long)]
        config: PathBuf,
        /// Directory holding station.csv, line.csv, and join.csv. Falls back
        /// to EKITSUNAGI_DATA_DIR, then ./data.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Where to write the graph without walking transfers.
        #[arg(long)]
        base_output: Option<PathBuf>,
        /// Where to write the graph with walking transfers.
        #[arg(long)]
        walking_output: Option<PathBuf>,
    },
    /// Shortest path between two stations.
    Route {
        /// Graph artifact to query.
        #[arg(long)]
        graph: PathBuf,
        /// Starting station name.
        #[arg(long = "from")]
        from: String,
        /// Destination station name.
        #[arg(long = "to")]
        to: String,
    },
    /// Rank the stations next to the visited ones by distance to the goal.
    Hint {
        #[arg(long)]
        graph: PathBuf,
        /// Goal station name.
        #[arg(long)]
        goal: String,
        /// Visited station; repeat for several.
        #[arg(long = "frontier", required = true)]
        frontier: Vec<String>,
        /// Maximum number of candidates to show.
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
    /// List the stations of one line in travel order.
    Line {
        #[arg(long)]
        graph: PathBuf,
        /// Numeric line code.
        #[arg(long)]
        line: LineCode,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Build {
            config,
            data_dir,
            base_output,
            walking_output,
        } => handle_build(
            &mut stdout,
            &BuildCommandArgs {
                config,
                data_dir,
                base_output,
                walking_output,
            },
            cli.format,
        ),
        Command::Route { graph, from, to } => handle_route(
            &mut stdout,
            &RouteCommandArgs { graph, from, to },
            cli.format,
        ),
        Command::Hint {
            graph,
            goal,
            frontier,
            count,
        } => handle_hint(
            &mut stdout,
            &HintCommandArgs {
                graph,
                goal,
                frontier,
                count,
            },
            cli.format,
        ),
        Command::Line { graph, line } => {
            handle_line(&mut stdout, &LineCommandArgs { graph, line }, cli.format)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
