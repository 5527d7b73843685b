use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AreaConfig;
use crate::error::{Error, Result};
use crate::normalize::NameNormalizer;
use crate::records::{Coordinate, JoinRecord, LineCode, RecordTables, StationCode};

/// Serialized tag used for walking transfers.
pub const WALKING_TAG: &str = "walking";

/// Minimum similarity for a station name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Identity of the connection an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LineTag {
    /// Rail adjacency on a specific line.
    Line(LineCode),
    /// Synthetic walking transfer between nearby stations.
    Walking,
}

impl LineTag {
    pub fn line_code(self) -> Option<LineCode> {
        match self {
            LineTag::Line(code) => Some(code),
            LineTag::Walking => None,
        }
    }

    pub fn is_walking(self) -> bool {
        matches!(self, LineTag::Walking)
    }
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineTag::Line(code) => write!(f, "{code}"),
            LineTag::Walking => f.write_str(WALKING_TAG),
        }
    }
}

impl FromStr for LineTag {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        if value == WALKING_TAG {
            return Ok(LineTag::Walking);
        }
        value
            .parse::<LineCode>()
            .map(LineTag::Line)
            .map_err(|_| format!("unknown line tag '{value}'"))
    }
}

impl From<LineTag> for String {
    fn from(tag: LineTag) -> Self {
        tag.to_string()
    }
}

impl TryFrom<String> for LineTag {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Outgoing edge from a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub target: String,
    pub line: LineTag,
}

/// Resolved station node keyed by canonical name.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub position: Option<Coordinate>,
    /// Lines with at least one rail edge at this station.
    pub lines: BTreeSet<LineCode>,
    /// Raw station codes merged into this node, in first-seen order.
    pub codes: Vec<StationCode>,
    edges: Vec<Edge>,
}

impl Station {
    pub(crate) fn new(name: impl Into<String>, position: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            position,
            lines: BTreeSet::new(),
            codes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Outgoing edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_edge(&self, target: &str, line: LineTag) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.target == target && edge.line == line)
    }

    /// Append an edge unless the identical `(target, line)` edge exists.
    pub(crate) fn push_edge(&mut self, target: &str, line: LineTag) -> bool {
        if self.has_edge(target, line) {
            return false;
        }
        self.edges.push(Edge {
            target: target.to_string(),
            line,
        });
        true
    }
}

/// Station connectivity graph shared read-only between sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    stations: Arc<BTreeMap<String, Station>>,
    line_names: Arc<BTreeMap<LineCode, String>>,
}

impl Graph {
    pub(crate) fn from_parts(
        stations: BTreeMap<String, Station>,
        line_names: BTreeMap<LineCode, String>,
    ) -> Self {
        Self {
            stations: Arc::new(stations),
            line_names: Arc::new(line_names),
        }
    }

    /// Owned copies of the node and line tables for producing a derived graph.
    pub(crate) fn to_parts(&self) -> (BTreeMap<String, Station>, BTreeMap<LineCode, String>) {
        (
            self.stations.as_ref().clone(),
            self.line_names.as_ref().clone(),
        )
    }

    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stations.contains_key(name)
    }

    /// Lookup a station, suggesting close names when it is missing.
    pub fn require_station(&self, name: &str) -> Result<&Station> {
        self.station(name).ok_or_else(|| Error::UnknownStation {
            name: name.to_string(),
            suggestions: self.fuzzy_station_matches(name, 3),
        })
    }

    /// Return the outgoing edges for a given station name.
    pub fn neighbours(&self, name: &str) -> &[Edge] {
        self.stations
            .get(name)
            .map(Station::edges)
            .unwrap_or(&[])
    }

    /// Stations in canonical-name order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Number of stored directed edges (each adjacency counts twice).
    pub fn edge_count(&self) -> usize {
        self.stations.values().map(|station| station.edges.len()).sum()
    }

    pub fn line_name(&self, line: LineCode) -> Option<&str> {
        self.line_names.get(&line).map(String::as_str)
    }

    pub fn line_names(&self) -> &BTreeMap<LineCode, String> {
        &self.line_names
    }

    /// Every stored `(from, to, line)` triple.
    pub fn edge_triples(&self) -> impl Iterator<Item = (&str, &str, LineTag)> {
        self.stations.values().flat_map(|station| {
            station
                .edges
                .iter()
                .map(move |edge| (station.name.as_str(), edge.target.as_str(), edge.line))
        })
    }

    /// Connected components, each sorted by name, ordered by their first
    /// station name.
    pub fn connected_components(&self) -> Vec<Vec<String>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut components = Vec::new();

        for name in self.stations.keys() {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let mut component = vec![name.clone()];
            let mut queue = VecDeque::from([name.as_str()]);
            while let Some(current) = queue.pop_front() {
                for edge in self.neighbours(current) {
                    if seen.insert(edge.target.as_str()) {
                        component.push(edge.target.clone());
                        queue.push_back(edge.target.as_str());
                    }
                }
            }
            component.sort();
            components.push(component);
        }

        components
    }

    /// Stations of one line in travel order, starting from a terminus. Loop
    /// lines start from their first station in name order. Branches other
    /// than the first one followed are not included.
    pub fn line_stations(&self, line: LineCode) -> Vec<String> {
        let tag = LineTag::Line(line);
        let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (from, to, edge_line) in self.edge_triples() {
            if edge_line == tag {
                adjacency.entry(from).or_default().push(to);
            }
        }

        let Some(start) = adjacency
            .iter()
            .find(|(_, targets)| targets.len() == 1)
            .or_else(|| adjacency.iter().next())
            .map(|(name, _)| *name)
        else {
            return Vec::new();
        };

        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut ordered = vec![start.to_string()];
        let mut current = start;
        while let Some(next) = adjacency.get(current).and_then(|targets| {
            targets
                .iter()
                .copied()
                .find(|target| !visited.contains(target))
        }) {
            visited.insert(next);
            ordered.push(next.to_string());
            current = next;
        }

        ordered
    }

    /// Find station names similar to `query`, best match first.
    pub fn fuzzy_station_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .stations
            .keys()
            .filter_map(|name| {
                let mut score = strsim::normalized_levenshtein(query, name);
                if !query.is_empty() && (name.contains(query) || query.contains(name.as_str())) {
                    score = score.max(SUGGESTION_THRESHOLD);
                }
                (score >= SUGGESTION_THRESHOLD).then_some((score, name.as_str()))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

/// Build the line-aware station graph for one area.
///
/// Fails before any join is processed if a normalization map entry targets a
/// name no station row carries.
///
/// Joins are kept when their line is configured for the area and both
/// stations lie in an allowed prefecture. Station names are normalized and
/// line-dependent replacement rules applied; rows that resolve to the same
/// canonical name share one node whose coordinate is the first one seen
/// among its rows (in join order). Every join adds an edge in both directions,
/// deduplicated on `(from, to, line)`. Only stations with at least one edge
/// become nodes; configured start/goal stations must be among them.
pub fn build_graph(tables: &RecordTables, config: &AreaConfig) -> Result<Graph> {
    let normalizer = NameNormalizer::new(config);
    normalizer.validate(tables)?;

    let in_area = |code: StationCode| {
        tables
            .station(code)
            .map(|station| config.allows_prefecture(station.pref))
            .unwrap_or(false)
    };

    let area_joins: Vec<&JoinRecord> = tables
        .joins
        .iter()
        .filter(|join| in_area(join.from) && in_area(join.to))
        .collect();

    // Replacement rules see every line serving a station inside the area,
    // including lines that are not configured for play.
    let mut serving_lines: HashMap<StationCode, Vec<LineCode>> = HashMap::new();
    for join in &area_joins {
        for code in [join.from, join.to] {
            let lines = serving_lines.entry(code).or_default();
            if !lines.contains(&join.line) {
                lines.push(join.line);
            }
        }
    }

    let playable: Vec<&JoinRecord> = area_joins
        .into_iter()
        .filter(|join| config.allows_line(join.line))
        .collect();
    debug!(
        total = tables.joins.len(),
        kept = playable.len(),
        "filtered joins by area"
    );

    let mut canonical: HashMap<StationCode, String> = HashMap::new();
    let mut stations: BTreeMap<String, Station> = BTreeMap::new();
    let mut duplicates = 0usize;
    let mut self_loops = 0usize;

    for join in playable {
        let from = resolve_station(tables, &normalizer, &serving_lines, &mut canonical, join.from)?;
        let to = resolve_station(tables, &normalizer, &serving_lines, &mut canonical, join.to)?;

        if from == to {
            self_loops += 1;
            debug!(station = %from, line = join.line, "dropping join between merged stations");
            continue;
        }

        register_station(tables, &mut stations, &from, join.from, join.line);
        register_station(tables, &mut stations, &to, join.to, join.line);

        let tag = LineTag::Line(join.line);
        let mut added = false;
        if let Some(station) = stations.get_mut(&from) {
            added |= station.push_edge(&to, tag);
        }
        if let Some(station) = stations.get_mut(&to) {
            added |= station.push_edge(&from, tag);
        }
        if !added {
            duplicates += 1;
        }
    }

    for anchor in config.anchors() {
        let name = normalizer.normalize(anchor);
        if !stations.contains_key(name) {
            return Err(Error::UnreachableAnchorStation {
                name: name.to_string(),
            });
        }
    }

    let used_lines: BTreeSet<LineCode> = stations
        .values()
        .flat_map(|station| station.lines.iter().copied())
        .collect();
    let mut line_names = BTreeMap::new();
    for line in used_lines {
        let display = match config.lines.get(&line) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => tables
                .line(line)
                .map(|record| record.name.clone())
                .unwrap_or_default(),
        };
        line_names.insert(line, display);
    }
    for line in config.lines.keys() {
        if !line_names.contains_key(line) {
            warn!(line, "configured line contributes no edges");
        }
    }

    let graph = Graph::from_parts(stations, line_names);
    let components = graph.connected_components();
    if components.len() > 1 {
        warn!(
            components = components.len(),
            smallest = components.iter().map(Vec::len).min().unwrap_or(0),
            "station graph is not connected"
        );
    }

    info!(
        stations = graph.station_count(),
        edges = graph.edge_count(),
        duplicates,
        self_loops,
        "built station graph"
    );

    Ok(graph)
}

fn resolve_station(
    tables: &RecordTables,
    normalizer: &NameNormalizer<'_>,
    serving_lines: &HashMap<StationCode, Vec<LineCode>>,
    canonical: &mut HashMap<StationCode, String>,
    code: StationCode,
) -> Result<String> {
    if let Some(name) = canonical.get(&code) {
        return Ok(name.clone());
    }

    let record = tables.station(code).ok_or_else(|| Error::MalformedRecord {
        table: "join",
        row: 0,
        message: format!("station_cd {code} does not resolve to a station"),
    })?;
    let lines = serving_lines
        .get(&code)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let name = normalizer.resolve(&record.name, lines)?;
    canonical.insert(code, name.clone());
    Ok(name)
}

fn register_station(
    tables: &RecordTables,
    stations: &mut BTreeMap<String, Station>,
    name: &str,
    code: StationCode,
    line: LineCode,
) {
    let position = tables.station(code).and_then(|record| record.position);
    let station = stations
        .entry(name.to_string())
        .or_insert_with(|| Station::new(name, None));

    if station.position.is_none() {
        station.position = position;
    }
    if !station.codes.contains(&code) {
        station.codes.push(code);
    }
    station.lines.insert(line);
}
