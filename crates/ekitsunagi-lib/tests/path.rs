mod common;

use ekitsunagi_lib::{
    build_graph, distances_from, shortest_path, shortest_path_to_any, Error, Graph, LineTag,
    PathResult,
};

fn assert_walkable(graph: &Graph, path: &PathResult) {
    assert_eq!(path.steps[0].line, None);
    for pair in path.steps.windows(2) {
        let line = pair[1].line.expect("every later step records its line");
        let from = graph.station(&pair[0].station).expect("station exists");
        assert!(
            from.has_edge(&pair[1].station, line),
            "no {line} edge {} -> {}",
            pair[0].station,
            pair[1].station
        );
    }
}

#[test]
fn start_equal_to_goal_is_trivial_for_every_station() {
    let graphs = common::fixture_graphs();
    for station in graphs.walking.stations() {
        let err = shortest_path(&graphs.walking, &station.name, &station.name)
            .expect_err("trivial query");
        assert!(matches!(err, Error::TrivialQuery { .. }));
    }
}

#[test]
fn bfs_matches_exhaustive_search_on_fixture() {
    let graphs = common::fixture_graphs();
    for graph in [&graphs.base, &graphs.walking] {
        let names: Vec<&str> = graph.stations().map(|s| s.name.as_str()).collect();
        for start in &names {
            for goal in &names {
                if start == goal {
                    continue;
                }
                let path = shortest_path(graph, start, goal).expect("fixture is connected");
                let expected = common::brute_force_distance(graph, start, goal);
                assert_eq!(Some(path.stop_count), expected, "{start} -> {goal}");
                assert_eq!(path.stop_count, path.steps.len() - 1);
                assert_eq!(path.start(), *start);
                assert_eq!(path.goal(), *goal);
                assert_walkable(graph, &path);
            }
        }
    }
}

#[test]
fn walking_transfer_shortens_tokyo_to_mitsukoshimae() {
    let graphs = common::fixture_graphs();

    let rail = shortest_path(&graphs.base, "東京", "三越前").expect("path");
    assert_eq!(
        rail.stations(),
        vec!["東京", "有楽町", "新橋", "表参道", "永田町", "大手町", "三越前"]
    );
    assert_eq!(rail.stop_count, 6);

    let walking = shortest_path(&graphs.walking, "東京", "三越前").expect("path");
    assert_eq!(walking.stations(), vec!["東京", "大手町", "三越前"]);
    assert_eq!(walking.steps[1].line, Some(LineTag::Walking));
    assert_eq!(walking.steps[2].line, Some(LineTag::Line(28008)));
    assert_eq!(walking.line_changes(), 1);
}

#[test]
fn repeated_queries_return_the_same_path() {
    let graphs = common::fixture_graphs();
    let first = shortest_path(&graphs.walking, "渋谷", "品川").expect("path");
    for _ in 0..10 {
        assert_eq!(
            shortest_path(&graphs.walking, "渋谷", "品川").expect("path"),
            first
        );
    }
}

#[test]
fn disconnected_stations_report_no_path() {
    let stations = "station_cd,station_name,line_cd,pref_cd\n1,A,1,13\n2,B,1,13\n3,C,1,13\n4,D,1,13\n";
    let joins = "line_cd,station_cd1,station_cd2\n1,1,2\n1,3,4\n";
    let tables =
        common::tables_from_csv(stations, "line_cd,company_cd,line_name\n1,1,L1\n", joins);
    let (_, config) = common::chain_inputs(&["A"]);
    let graph = build_graph(&tables, &config).expect("graph builds");

    let err = shortest_path(&graph, "A", "D").expect_err("no route");
    assert!(matches!(
        err,
        Error::NoPath { ref start, ref goal } if start == "A" && goal == "D"
    ));
}

#[test]
fn unknown_station_offers_suggestions() {
    let graphs = common::fixture_graphs();
    let err = shortest_path(&graphs.base, "渋谷駅", "東京").expect_err("raw name");
    match &err {
        Error::UnknownStation { name, suggestions } => {
            assert_eq!(name, "渋谷駅");
            assert_eq!(suggestions.first().map(String::as_str), Some("渋谷"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Did you mean"));
}

#[test]
fn distances_cover_the_connected_graph() {
    let graphs = common::fixture_graphs();
    let distances = distances_from(&graphs.walking, "三越前").expect("goal exists");

    assert_eq!(distances.root(), "三越前");
    assert_eq!(distances.len(), graphs.walking.station_count());
    assert_eq!(distances.get("三越前"), Some(0));
    assert_eq!(distances.get("日本橋"), Some(1));
    assert_eq!(distances.get("有楽町"), Some(3));
    assert_eq!(distances.get("川崎"), None);
}

#[test]
fn path_to_any_starts_from_the_closest_visited_station() {
    let graphs = common::fixture_graphs();
    let path = shortest_path_to_any(&graphs.walking, "三越前", &["渋谷", "有楽町"])
        .expect("path exists");

    assert_eq!(path.stations(), vec!["有楽町", "東京", "大手町", "三越前"]);
    assert_eq!(path.stop_count, 3);
    assert_walkable(&graphs.walking, &path);
}

#[test]
fn path_to_any_rejects_empty_or_finished_frontiers() {
    let graphs = common::fixture_graphs();

    let empty: [&str; 0] = [];
    let err = shortest_path_to_any(&graphs.base, "三越前", &empty).expect_err("empty");
    assert!(matches!(err, Error::EmptyFrontier));

    let err = shortest_path_to_any(&graphs.base, "三越前", &["東京", "三越前"])
        .expect_err("goal already visited");
    assert!(matches!(err, Error::TrivialQuery { .. }));
}
