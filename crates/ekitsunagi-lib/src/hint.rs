use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::path::distances_from;

/// Candidate next station with its stop distance to the goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub station: String,
    pub distance: usize,
}

/// Rank the stations adjacent to `frontier` by how close they are to `goal`.
///
/// Candidates are gathered in frontier order, then edge order, skipping
/// frontier stations and repeats. A single breadth-first search from the goal
/// supplies every candidate's distance. The sort is stable, so candidates at
/// equal distance keep their discovery order; at most `k` hints are returned.
/// Candidates that cannot reach the goal are left out, and if none can the
/// request fails with [`Error::NoPath`].
pub fn closest_candidates<S: AsRef<str>>(
    graph: &Graph,
    frontier: &[S],
    goal: &str,
    k: usize,
) -> Result<Vec<Hint>> {
    if frontier.is_empty() {
        return Err(Error::EmptyFrontier);
    }

    let mut frontier_names: Vec<&str> = Vec::with_capacity(frontier.len());
    for name in frontier {
        frontier_names.push(graph.require_station(name.as_ref())?.name.as_str());
    }
    let frontier_set: HashSet<&str> = frontier_names.iter().copied().collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<&str> = Vec::new();
    for station in &frontier_names {
        for edge in graph.neighbours(station) {
            let target = edge.target.as_str();
            if frontier_set.contains(target) || !seen.insert(target) {
                continue;
            }
            candidates.push(target);
        }
    }

    let distances = distances_from(graph, goal)?;
    let mut ranked: Vec<Hint> = candidates
        .iter()
        .filter_map(|station| {
            distances.get(station).map(|distance| Hint {
                station: station.to_string(),
                distance,
            })
        })
        .collect();

    if ranked.is_empty() && !candidates.is_empty() {
        return Err(Error::NoPath {
            start: frontier_names[0].to_string(),
            goal: distances.root().to_string(),
        });
    }
    if ranked.len() < candidates.len() {
        debug!(
            unreachable = candidates.len() - ranked.len(),
            goal = distances.root(),
            "skipping candidates that cannot reach the goal"
        );
    }

    ranked.sort_by_key(|hint| hint.distance);
    ranked.truncate(k);
    Ok(ranked)
}
