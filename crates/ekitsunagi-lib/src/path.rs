use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Graph, LineTag};

/// One station along a path and the connection used to arrive there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub station: String,
    /// `None` for the first station of the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineTag>,
}

/// Concrete shortest path returned for display and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    pub steps: Vec<PathStep>,
    /// Number of edges traversed.
    pub stop_count: usize,
}

impl PathResult {
    fn from_steps(steps: Vec<PathStep>) -> Self {
        let stop_count = steps.len().saturating_sub(1);
        Self { steps, stop_count }
    }

    pub fn start(&self) -> &str {
        self.steps
            .first()
            .map(|step| step.station.as_str())
            .unwrap_or_default()
    }

    pub fn goal(&self) -> &str {
        self.steps
            .last()
            .map(|step| step.station.as_str())
            .unwrap_or_default()
    }

    pub fn stations(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.station.as_str()).collect()
    }

    /// Number of times consecutive edges use different line tags. A walking
    /// transfer counts as its own tag.
    pub fn line_changes(&self) -> usize {
        let lines: Vec<LineTag> = self.steps.iter().filter_map(|step| step.line).collect();
        lines.windows(2).filter(|pair| pair[0] != pair[1]).count()
    }
}

/// Breadth-first distances (in stops) from a single root station.
#[derive(Debug, Clone)]
pub struct DistanceMap<'g> {
    root: &'g str,
    distances: HashMap<&'g str, usize>,
}

impl<'g> DistanceMap<'g> {
    pub fn root(&self) -> &'g str {
        self.root
    }

    /// Stops between the root and `station`, or `None` when unreachable.
    pub fn get(&self, station: &str) -> Option<usize> {
        self.distances.get(station).copied()
    }

    /// Number of reachable stations, including the root.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'g str, usize)> + '_ {
        self.distances.iter().map(|(name, distance)| (*name, *distance))
    }
}

type Parents<'g> = HashMap<&'g str, Option<(&'g str, LineTag)>>;

/// Find the shortest path between two distinct stations.
///
/// Every edge, walking transfers included, costs one stop. Stations are
/// expanded in FIFO order and each station's edges in stored order, so among
/// equally short paths the one whose edges were discovered first wins and
/// repeated calls on the same graph return the same path.
pub fn shortest_path(graph: &Graph, start: &str, goal: &str) -> Result<PathResult> {
    let start = graph.require_station(start)?.name.as_str();
    let goal = graph.require_station(goal)?.name.as_str();
    if start == goal {
        return Err(Error::TrivialQuery {
            station: start.to_string(),
        });
    }

    let mut parents: Parents<'_> = HashMap::new();
    let mut queue = VecDeque::new();

    parents.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge in graph.neighbours(current) {
            let next = edge.target.as_str();
            if parents.contains_key(next) {
                continue;
            }

            parents.insert(next, Some((current, edge.line)));
            if next == goal {
                return Ok(PathResult::from_steps(reconstruct_forward(&parents, goal)));
            }
            queue.push_back(next);
        }
    }

    Err(Error::NoPath {
        start: start.to_string(),
        goal: goal.to_string(),
    })
}

/// Compute the stop distance from `root` to every reachable station.
pub fn distances_from<'g>(graph: &'g Graph, root: &str) -> Result<DistanceMap<'g>> {
    let root = graph.require_station(root)?.name.as_str();

    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(root, 0usize);
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        let next_distance = distances[current] + 1;
        for edge in graph.neighbours(current) {
            let next = edge.target.as_str();
            if distances.contains_key(next) {
                continue;
            }
            distances.insert(next, next_distance);
            queue.push_back(next);
        }
    }

    Ok(DistanceMap {
        root,
        distances,
    })
}

/// Shortest path from whichever of `visited` is closest to `goal`, ending
/// at `goal`.
///
/// The search runs once from the goal outwards; the first visited station
/// dequeued is the nearest one.
pub fn shortest_path_to_any<S: AsRef<str>>(
    graph: &Graph,
    goal: &str,
    visited: &[S],
) -> Result<PathResult> {
    if visited.is_empty() {
        return Err(Error::EmptyFrontier);
    }
    let goal = graph.require_station(goal)?.name.as_str();
    let mut targets: HashSet<&str> = HashSet::with_capacity(visited.len());
    for name in visited {
        targets.insert(graph.require_station(name.as_ref())?.name.as_str());
    }
    if targets.contains(goal) {
        return Err(Error::TrivialQuery {
            station: goal.to_string(),
        });
    }

    let mut parents: Parents<'_> = HashMap::new();
    let mut queue = VecDeque::new();
    parents.insert(goal, None);
    queue.push_back(goal);

    while let Some(current) = queue.pop_front() {
        if targets.contains(current) {
            return Ok(PathResult::from_steps(reconstruct_toward_root(
                &parents, current,
            )));
        }
        for edge in graph.neighbours(current) {
            let next = edge.target.as_str();
            if parents.contains_key(next) {
                continue;
            }
            parents.insert(next, Some((current, edge.line)));
            queue.push_back(next);
        }
    }

    Err(Error::NoPath {
        start: visited[0].as_ref().to_string(),
        goal: goal.to_string(),
    })
}

/// Walk parents back from `goal` to the search root and return the steps in
/// root-to-goal order.
fn reconstruct_forward(parents: &Parents<'_>, goal: &str) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        let parent = parents.get(node).copied().flatten();
        steps.push(PathStep {
            station: node.to_string(),
            line: parent.map(|(_, line)| line),
        });
        current = parent.map(|(previous, _)| previous);
    }
    steps.reverse();
    steps
}

/// Walk parents from `origin` back to the search root, keeping that order.
fn reconstruct_toward_root(parents: &Parents<'_>, origin: &str) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut arrived_by = None;
    let mut current = Some(origin);
    while let Some(node) = current {
        let parent = parents.get(node).copied().flatten();
        steps.push(PathStep {
            station: node.to_string(),
            line: arrived_by,
        });
        arrived_by = parent.map(|(_, line)| line);
        current = parent.map(|(next, _)| next);
    }
    steps
}
