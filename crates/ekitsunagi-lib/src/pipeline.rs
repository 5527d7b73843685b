//! End-to-end build: input tables and area config in, two graph artifacts out.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::artifact::{artifact_digest, write_artifact};
use crate::config::AreaConfig;
use crate::error::Result;
use crate::graph::{build_graph, Graph};
use crate::normalize::NameNormalizer;
use crate::records::RecordTables;
use crate::walking::augment_walking;

/// Inputs and outputs of one build invocation.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Directory holding `station.csv`, `line.csv`, `join.csv`, and optionally
    /// `pref.csv` / `company.csv`.
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub base_output: PathBuf,
    pub walking_output: PathBuf,
}

/// Graph without walking transfers and the same graph with them merged in.
#[derive(Debug, Clone)]
pub struct AreaGraphs {
    pub base: Graph,
    pub walking: Graph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub path: PathBuf,
    pub stations: usize,
    pub edges: usize,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub base: ArtifactSummary,
    pub walking: ArtifactSummary,
}

/// Build both graphs for an area without touching the filesystem.
///
/// Walking pair endpoints go through the same name normalization as station
/// rows before they are merged.
pub fn build_area_graphs(tables: &RecordTables, config: &AreaConfig) -> Result<AreaGraphs> {
    let normalizer = NameNormalizer::new(config);
    let base = build_graph(tables, config)?;
    let pairs: Vec<(String, String)> = config
        .walking_pairs
        .iter()
        .map(|(from, to)| {
            (
                normalizer.normalize(from).to_string(),
                normalizer.normalize(to).to_string(),
            )
        })
        .collect();
    let walking = augment_walking(&base, &pairs)?;

    Ok(AreaGraphs { base, walking })
}

/// Run a full build. Artifacts are written only after both graphs built.
pub fn run_build(request: &BuildRequest) -> Result<BuildReport> {
    let tables = RecordTables::load_dir(&request.data_dir)?;
    let config = AreaConfig::from_path(&request.config_path)?;
    let graphs = build_area_graphs(&tables, &config)?;

    let base = write_summary(&graphs.base, &request.base_output)?;
    let walking = write_summary(&graphs.walking, &request.walking_output)?;

    info!(
        base = %base.path.display(),
        walking = %walking.path.display(),
        "build complete"
    );
    Ok(BuildReport { base, walking })
}

fn write_summary(graph: &Graph, path: &std::path::Path) -> Result<ArtifactSummary> {
    write_artifact(graph, path)?;
    Ok(ArtifactSummary {
        path: path.to_path_buf(),
        stations: graph.station_count(),
        edges: graph.edge_count(),
        digest: artifact_digest(graph)?,
    })
}
