//! JSON graph artifact: the on-disk form of a built [`Graph`].
//!
//! The artifact is a single JSON object keyed by canonical station name.
//! Keys are written in sorted order and each station's edges keep their
//! stored order, so the same graph always serializes to the same bytes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, LineTag, Station};
use crate::records::{Coordinate, LineCode, StationCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEdge {
    pub to: String,
    pub line: LineTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub lines: Vec<LineCode>,
    #[serde(default)]
    pub codes: Vec<StationCode>,
    pub edges: Vec<ArtifactEdge>,
}

/// Serializable mapping from station name to its coordinate and edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphArtifact {
    pub stations: BTreeMap<String, ArtifactStation>,
}

impl GraphArtifact {
    pub fn from_graph(graph: &Graph) -> Self {
        let stations = graph
            .stations()
            .map(|station| {
                let edges = station
                    .edges()
                    .iter()
                    .map(|edge| ArtifactEdge {
                        to: edge.target.clone(),
                        line: edge.line,
                        line_name: edge
                            .line
                            .line_code()
                            .and_then(|code| graph.line_name(code))
                            .map(str::to_string),
                    })
                    .collect();
                let entry = ArtifactStation {
                    lat: station.position.map(|position| position.lat),
                    lon: station.position.map(|position| position.lon),
                    lines: station.lines.iter().copied().collect(),
                    codes: station.codes.clone(),
                    edges,
                };
                (station.name.clone(), entry)
            })
            .collect();

        Self { stations }
    }

    /// Rebuild a graph, checking the invariants the builder guarantees: every
    /// edge targets a known station, no edge is a self-loop or a repeated
    /// `(to, line)` pair, every station has an edge, and every edge has its
    /// reverse with the same line tag.
    pub fn into_graph(self) -> Result<Graph> {
        let mut line_names: BTreeMap<LineCode, String> = BTreeMap::new();
        let mut stations: BTreeMap<String, Station> = BTreeMap::new();

        for (name, entry) in &self.stations {
            let position = match (entry.lat, entry.lon) {
                (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
                _ => None,
            };
            let mut station = Station::new(name.clone(), position);
            station.lines = entry.lines.iter().copied().collect();
            station.codes = entry.codes.clone();

            if entry.edges.is_empty() {
                return Err(malformed(format!("station {name} has no edges")));
            }

            for edge in &entry.edges {
                if !self.stations.contains_key(&edge.to) {
                    return Err(malformed(format!(
                        "edge {name} -> {} targets an unknown station",
                        edge.to
                    )));
                }
                if edge.to == *name {
                    return Err(malformed(format!("edge {name} -> {name} is a self-loop")));
                }
                if let Some(code) = edge.line.line_code() {
                    station.lines.insert(code);
                    let display = line_names.entry(code).or_default();
                    if display.is_empty() {
                        if let Some(line_name) = &edge.line_name {
                            display.clone_from(line_name);
                        }
                    }
                }
                if !station.push_edge(&edge.to, edge.line) {
                    return Err(malformed(format!(
                        "edge {name} -> {} on {} is listed twice",
                        edge.to, edge.line
                    )));
                }
            }

            stations.insert(name.clone(), station);
        }

        for station in stations.values() {
            for edge in station.edges() {
                let reversed = stations
                    .get(&edge.target)
                    .is_some_and(|target| target.has_edge(&station.name, edge.line));
                if !reversed {
                    return Err(malformed(format!(
                        "edge {} -> {} on {} has no reverse edge",
                        station.name, edge.target, edge.line
                    )));
                }
            }
        }

        Ok(Graph::from_parts(stations, line_names))
    }

    /// Pretty-printed JSON text of the artifact.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write `graph` as a JSON artifact at `path`.
pub fn write_artifact(graph: &Graph, path: &Path) -> Result<()> {
    info!(
        path = %path.display(),
        stations = graph.station_count(),
        edges = graph.edge_count(),
        "writing graph artifact"
    );
    let json = GraphArtifact::from_graph(graph).to_json()?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(json.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Load a graph from a JSON artifact written by [`write_artifact`].
pub fn read_artifact(path: &Path) -> Result<Graph> {
    debug!(path = %path.display(), "loading graph artifact");
    let file = File::open(path)?;
    let artifact: GraphArtifact =
        serde_json::from_reader(BufReader::new(file)).map_err(|err| Error::MalformedArtifact {
            message: err.to_string(),
        })?;
    artifact.into_graph()
}

fn malformed(message: String) -> Error {
    Error::MalformedArtifact { message }
}

/// Lowercase hex SHA-256 of the artifact bytes [`write_artifact`] produces.
pub fn artifact_digest(graph: &Graph) -> Result<String> {
    let json = GraphArtifact::from_graph(graph).to_json()?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}
