//! ekitsunagi library entry points.
//!
//! This crate turns raw station tables into a line-aware station graph for one
//! play area, optionally merges walking transfers into it, and answers the
//! per-move queries of the station-linking game: shortest paths, distance
//! tables, and "closest to the goal" hints. Higher-level consumers (the CLI,
//! a game frontend) should only depend on the functions exported here instead
//! of reimplementing behavior.
//!
//! A built [`Graph`] is immutable and cheap to clone, so one graph per area
//! can be shared read-only by any number of concurrent sessions.

#![deny(warnings)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod game;
pub mod graph;
pub mod hint;
pub mod normalize;
pub mod path;
pub mod pipeline;
pub mod records;
pub mod walking;

pub use artifact::{artifact_digest, read_artifact, write_artifact, GraphArtifact};
pub use config::{AreaConfig, LineReplacement, ReplacementRule};
pub use error::{Error, Result};
pub use game::{
    score_failed_round, score_round, CandidateEdge, GameSession, MoveOutcome, RoundScore,
    ScoreRules,
};
pub use graph::{build_graph, Edge, Graph, LineTag, Station, WALKING_TAG};
pub use hint::{closest_candidates, Hint};
pub use normalize::NameNormalizer;
pub use path::{distances_from, shortest_path, shortest_path_to_any, DistanceMap, PathResult, PathStep};
pub use pipeline::{build_area_graphs, run_build, AreaGraphs, BuildReport, BuildRequest};
pub use records::{
    Coordinate, JoinRecord, LineCode, LineRecord, PrefCode, RecordTables, StationCode,
    StationRecord, TableSources,
};
pub use walking::augment_walking;
