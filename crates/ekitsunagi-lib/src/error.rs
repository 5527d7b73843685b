use thiserror::Error;

use crate::records::LineCode;

/// Convenient result alias for the ekitsunagi library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an input table is missing a required column, holds an
    /// unparsable cell, or references a key absent from its reference table.
    #[error("malformed {table} record at row {row}: {message}")]
    MalformedRecord {
        table: &'static str,
        row: u64,
        message: String,
    },

    /// Raised when the area configuration JSON cannot be decoded.
    #[error("invalid area configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when a normalization map entry points at a name that no station
    /// in the input tables carries.
    #[error("normalization target '{target}' (from '{source_name}') does not name any station")]
    UnresolvedNormalizationTarget { source_name: String, target: String },

    /// Raised when a replacement rule target matched but none of its rules
    /// apply to the lines serving the station.
    #[error("station '{name}' matched a replacement rule but none applies to lines {lines:?}")]
    AmbiguousReplacement { name: String, lines: Vec<LineCode> },

    /// Raised when a configured start/goal station is not part of the built graph.
    #[error("anchor station '{name}' is not part of the filtered graph")]
    UnreachableAnchorStation { name: String },

    /// Raised when a walking pair references a station missing from the graph.
    #[error("walking pair ({from}, {to}) references unknown station '{missing}'")]
    UnknownWalkingEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    /// Raised when a walking pair names the same station on both sides.
    #[error("walking pair names '{name}' on both sides")]
    InvalidWalkingPair { name: String },

    /// Raised when a station name could not be found in the graph.
    #[error("unknown station name: {name}{}", format_suggestions(.suggestions))]
    UnknownStation {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a path query asks for the route from a station to itself.
    #[error("start and goal are both '{station}'")]
    TrivialQuery { station: String },

    /// Raised when no path exists between two stations.
    #[error("no path found between {start} and {goal}")]
    NoPath { start: String, goal: String },

    /// Raised when a hint is requested without any frontier station.
    #[error("hint requested with an empty frontier")]
    EmptyFrontier,

    /// Raised when a graph artifact does not describe a consistent graph.
    #[error("malformed graph artifact: {message}")]
    MalformedArtifact { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV reader errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Trailing "Did you mean" clause for an unknown station, listing names
/// in rank order as `'a'`, `'a' or 'b'`, or `'a', 'b' or 'c'`.
fn format_suggestions(suggestions: &[String]) -> String {
    let Some((last, rest)) = suggestions.split_last() else {
        return String::new();
    };
    let mut clause = String::from(". Did you mean ");
    for (index, name) in rest.iter().enumerate() {
        if index > 0 {
            clause.push_str(", ");
        }
        clause.push('\'');
        clause.push_str(name);
        clause.push('\'');
    }
    if !rest.is_empty() {
        clause.push_str(" or ");
    }
    clause.push('\'');
    clause.push_str(last);
    clause.push_str("'?");
    clause
}
