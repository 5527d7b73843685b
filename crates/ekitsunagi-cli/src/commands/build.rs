//! Build command handler: input tables and area config in, artifacts out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ekitsunagi_lib::{run_build, BuildRequest};

use crate::output::{render_build_report, OutputFormat};

/// Environment variable naming the input table directory.
pub const DATA_DIR_ENV: &str = "EKITSUNAGI_DATA_DIR";
/// Input table directory used when neither flag nor environment names one.
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BASE_OUTPUT: &str = "output/graph.json";
pub const DEFAULT_WALKING_OUTPUT: &str = "output/graph_walking.json";

#[derive(Debug, Clone)]
pub struct BuildCommandArgs {
    pub config: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub base_output: Option<PathBuf>,
    pub walking_output: Option<PathBuf>,
}

/// Resolve the input table directory: flag, then environment, then `./data`.
pub fn resolve_data_dir(flag: Option<&Path>, env_value: Option<&str>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}

pub fn handle_build<W: Write>(
    out: &mut W,
    args: &BuildCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let env_value = std::env::var(DATA_DIR_ENV).ok();
    let request = BuildRequest {
        data_dir: resolve_data_dir(args.data_dir.as_deref(), env_value.as_deref()),
        config_path: args.config.clone(),
        base_output: args
            .base_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_OUTPUT)),
        walking_output: args
            .walking_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WALKING_OUTPUT)),
    };

    for output in [&request.base_output, &request.walking_output] {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let report = run_build(&request).with_context(|| {
        format!(
            "failed to build graphs from {} with {}",
            request.data_dir.display(),
            request.config_path.display()
        )
    })?;
    render_build_report(out, &report, format)?;
    Ok(())
}
