//! Common test utilities and fixture helpers.
//!
//! The on-disk fixture under `docs/fixtures` is a slice of central Tokyo:
//! four playable lines, one excluded line, and one station outside the
//! allowed prefectures. Small ad-hoc graphs are built from inline CSV.

use std::collections::HashMap;
use std::path::PathBuf;

use ekitsunagi_lib::{
    build_area_graphs, build_graph, AreaConfig, AreaGraphs, Graph, RecordTables, TableSources,
};

/// Path to fixtures directory used by tests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn fixture_tables() -> RecordTables {
    RecordTables::load_dir(&fixtures_dir()).expect("fixture tables load")
}

#[allow(dead_code)]
pub fn fixture_config() -> AreaConfig {
    AreaConfig::from_path(&fixtures_dir().join("area.json")).expect("fixture config loads")
}

#[allow(dead_code)]
pub fn fixture_graphs() -> AreaGraphs {
    build_area_graphs(&fixture_tables(), &fixture_config()).expect("fixture graphs build")
}

/// Parse inline CSV tables without prefecture or company tables.
#[allow(dead_code)]
pub fn tables_from_csv(stations: &str, lines: &str, joins: &str) -> RecordTables {
    RecordTables::from_readers(TableSources {
        stations: stations.as_bytes(),
        lines: lines.as_bytes(),
        joins: joins.as_bytes(),
        prefectures: None,
        companies: None,
    })
    .expect("inline tables parse")
}

/// Build a graph for a single line `1` whose stations are joined in order,
/// all in prefecture 13.
#[allow(dead_code)]
pub fn chain_graph(names: &[&str]) -> Graph {
    let (tables, config) = chain_inputs(names);
    build_graph(&tables, &config).expect("chain graph builds")
}

#[allow(dead_code)]
pub fn chain_inputs(names: &[&str]) -> (RecordTables, AreaConfig) {
    let mut stations = String::from("station_cd,station_name,line_cd,pref_cd,lon,lat\n");
    for (index, name) in names.iter().enumerate() {
        stations.push_str(&format!("{},{name},1,13,139.{index},35.{index}\n", index + 1));
    }
    let mut joins = String::from("line_cd,station_cd1,station_cd2\n");
    for index in 1..names.len() {
        joins.push_str(&format!("1,{},{}\n", index, index + 1));
    }

    let tables = tables_from_csv(&stations, "line_cd,company_cd,line_name\n1,1,L1\n", &joins);
    let config = AreaConfig {
        lines: [(1, "L1".to_string())].into_iter().collect(),
        valid_pref_cds: vec![13],
        ..AreaConfig::default()
    };
    (tables, config)
}

/// Length in stops of the shortest simple path, by exhaustive search.
#[allow(dead_code)]
pub fn brute_force_distance(graph: &Graph, start: &str, goal: &str) -> Option<usize> {
    fn walk<'g>(
        graph: &'g Graph,
        current: &'g str,
        goal: &str,
        depth: usize,
        on_path: &mut HashMap<&'g str, ()>,
        best: &mut Option<usize>,
    ) {
        if current == goal {
            *best = Some(best.map_or(depth, |b| b.min(depth)));
            return;
        }
        if best.is_some_and(|b| depth >= b) {
            return;
        }
        for edge in graph.neighbours(current) {
            let next = edge.target.as_str();
            if on_path.contains_key(next) {
                continue;
            }
            on_path.insert(next, ());
            walk(graph, next, goal, depth + 1, on_path, best);
            on_path.remove(next);
        }
    }

    let start = graph.station(start)?.name.as_str();
    let mut on_path = HashMap::from([(start, ())]);
    let mut best = None;
    walk(graph, start, goal, 0, &mut on_path, &mut best);
    best
}
