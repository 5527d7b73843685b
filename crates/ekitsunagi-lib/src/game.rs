//! Per-session game state and round scoring.
//!
//! A [`GameSession`] is owned by one player session and only ever reads the
//! shared [`Graph`]. All scoring is numeric; rendering scores or messages is
//! left to the caller.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Graph, LineTag};
use crate::hint::{closest_candidates, Hint};
use crate::path::{shortest_path_to_any, PathResult};

/// Lives granted at the start of every round.
pub const DEFAULT_LIVES: u32 = 3;

/// Edge from a visited station to a station the player may enter next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateEdge {
    pub from: String,
    pub to: String,
    pub line: LineTag,
}

/// Result of entering a station name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The station was adjacent; `via` lists every edge that reaches it.
    Reached { via: Vec<CandidateEdge> },
    AlreadyVisited,
    /// The station exists but is not adjacent to any visited station.
    NotAdjacent { lives_left: u32 },
    /// The name is not a station in the graph.
    UnknownStation { suggestions: Vec<String> },
}

/// Mutable state of one player's game.
#[derive(Debug, Clone)]
pub struct GameSession {
    visited: Vec<String>,
    candidates: Vec<CandidateEdge>,
    round_moves: Vec<String>,
    lives: u32,
    hints_used: u32,
}

impl GameSession {
    /// Start a session from the given stations, which count as visited.
    pub fn start<S: AsRef<str>>(graph: &Graph, starts: &[S]) -> Result<Self> {
        if starts.is_empty() {
            return Err(Error::EmptyFrontier);
        }

        let mut session = Self {
            visited: Vec::with_capacity(starts.len()),
            candidates: Vec::new(),
            round_moves: Vec::new(),
            lives: DEFAULT_LIVES,
            hints_used: 0,
        };
        for name in starts {
            let station = graph.require_station(name.as_ref())?;
            if !session.has_visited(&station.name) {
                session.visit(graph, &station.name);
            }
        }
        Ok(session)
    }

    /// Stations visited so far; this is the frontier moves are made from.
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn candidates(&self) -> &[CandidateEdge] {
        &self.candidates
    }

    /// Stations entered during the current round.
    pub fn round_moves(&self) -> &[String] {
        &self.round_moves
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }

    pub fn has_visited(&self, station: &str) -> bool {
        self.visited.iter().any(|name| name == station)
    }

    /// Reset per-round counters. Visited stations carry over between rounds.
    pub fn begin_round(&mut self) {
        self.round_moves.clear();
        self.lives = DEFAULT_LIVES;
        self.hints_used = 0;
    }

    /// Try to move to `station`. A wrong guess costs one life.
    pub fn make_move(&mut self, graph: &Graph, station: &str) -> MoveOutcome {
        if self.has_visited(station) {
            return MoveOutcome::AlreadyVisited;
        }
        if !graph.contains(station) {
            return MoveOutcome::UnknownStation {
                suggestions: graph.fuzzy_station_matches(station, 3),
            };
        }

        let via: Vec<CandidateEdge> = self
            .candidates
            .iter()
            .filter(|candidate| candidate.to == station)
            .cloned()
            .collect();
        if via.is_empty() {
            self.lives = self.lives.saturating_sub(1);
            return MoveOutcome::NotAdjacent {
                lives_left: self.lives,
            };
        }

        self.visit(graph, station);
        self.round_moves.push(station.to_string());
        MoveOutcome::Reached { via }
    }

    /// Rank the next moves toward `goal`; each call counts as one hint.
    pub fn hints(&mut self, graph: &Graph, goal: &str, k: usize) -> Result<Vec<Hint>> {
        let hints = closest_candidates(graph, &self.visited, goal, k)?;
        self.hints_used += 1;
        Ok(hints)
    }

    /// Shortest remaining path from any visited station to `goal`.
    pub fn remaining_path(&self, graph: &Graph, goal: &str) -> Result<PathResult> {
        shortest_path_to_any(graph, goal, &self.visited)
    }

    fn visit(&mut self, graph: &Graph, station: &str) {
        self.visited.push(station.to_string());
        self.candidates.retain(|candidate| candidate.to != station);
        for edge in graph.neighbours(station) {
            if self.has_visited(&edge.target) {
                continue;
            }
            self.candidates.push(CandidateEdge {
                from: station.to_string(),
                to: edge.target.clone(),
                line: edge.line,
            });
        }
    }
}

/// Scoring parameters for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRules {
    pub max_score: u32,
    pub min_score: u32,
    pub penalty_per_step: u32,
    /// Upper bound for a failed round's partial score.
    pub failure_cap: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            max_score: 20,
            min_score: 10,
            penalty_per_step: 3,
            failure_cap: 10,
        }
    }
}

/// Breakdown of a cleared round's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundScore {
    /// Stations entered beyond the shortest path.
    pub excess_steps: i64,
    /// Score before the minimum is applied; may be negative.
    pub raw: i64,
    pub score: u32,
}

/// Score a cleared round: the maximum minus the excess-step penalty and one
/// point per lost life and per hint, floored at the minimum.
pub fn score_round(
    rules: &ScoreRules,
    shortest_steps: usize,
    actual_steps: usize,
    lives_lost: u32,
    hints_used: u32,
) -> RoundScore {
    let excess_steps = actual_steps as i64 - shortest_steps as i64;
    let penalty = excess_steps * i64::from(rules.penalty_per_step)
        + i64::from(lives_lost)
        + i64::from(hints_used);
    let raw = i64::from(rules.max_score) - penalty;
    let score = u32::try_from(raw.max(i64::from(rules.min_score))).unwrap_or(u32::MAX);

    RoundScore {
        excess_steps,
        raw,
        score,
    }
}

/// Score a failed round by the stops gained toward the goal, capped.
pub fn score_failed_round(
    rules: &ScoreRules,
    initial_distance: usize,
    remaining_distance: usize,
) -> u32 {
    let progress = initial_distance.saturating_sub(remaining_distance);
    u32::try_from(progress)
        .unwrap_or(u32::MAX)
        .min(rules.failure_cap)
}
