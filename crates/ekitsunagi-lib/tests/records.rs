mod common;

use ekitsunagi_lib::{Error, RecordTables, TableSources};

fn sources<'a>(
    stations: &'a str,
    lines: &'a str,
    joins: &'a str,
    prefectures: Option<&'a str>,
) -> TableSources<&'a [u8]> {
    TableSources {
        stations: stations.as_bytes(),
        lines: lines.as_bytes(),
        joins: joins.as_bytes(),
        prefectures: prefectures.map(str::as_bytes),
        companies: None,
    }
}

const LINES: &str = "line_cd,company_cd,line_name\n1,1,L1\n";

#[test]
fn fixture_directory_loads_every_table() {
    let tables = common::fixture_tables();

    assert_eq!(tables.stations.len(), 20);
    assert_eq!(tables.lines.len(), 5);
    assert_eq!(tables.joins.len(), 16);
    assert_eq!(tables.prefectures.as_ref().map(Vec::len), Some(3));
    assert_eq!(tables.companies.as_ref().map(Vec::len), Some(3));

    let omotesando = tables.station(2800802).expect("station exists");
    assert_eq!(omotesando.name, "表参道");
    assert!(omotesando.position.is_none());
    assert_eq!(
        tables.line(28001).map(|line| line.name.as_str()),
        Some("東京メトロ銀座線")
    );
}

#[test]
fn join_referencing_unknown_station_is_rejected() {
    let stations = "station_cd,station_name,line_cd,pref_cd\n1,A,1,13\n2,B,1,13\n";
    let joins = "line_cd,station_cd1,station_cd2\n1,1,2\n1,2,9\n";

    let err = RecordTables::from_readers(sources(stations, LINES, joins, None))
        .expect_err("dangling station_cd");
    match err {
        Error::MalformedRecord {
            table,
            row,
            message,
        } => {
            assert_eq!(table, "join");
            assert_eq!(row, 3);
            assert!(message.contains("station_cd 9"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn station_on_unknown_line_is_rejected() {
    let stations = "station_cd,station_name,line_cd,pref_cd\n1,A,7,13\n";
    let joins = "line_cd,station_cd1,station_cd2\n";

    let err = RecordTables::from_readers(sources(stations, LINES, joins, None))
        .expect_err("dangling line_cd");
    assert!(matches!(
        err,
        Error::MalformedRecord {
            table: "station",
            row: 2,
            ..
        }
    ));
}

#[test]
fn prefecture_keys_are_checked_only_when_table_is_present() {
    let stations = "station_cd,station_name,line_cd,pref_cd\n1,A,1,99\n2,B,1,13\n";
    let joins = "line_cd,station_cd1,station_cd2\n1,1,2\n";

    RecordTables::from_readers(sources(stations, LINES, joins, None))
        .expect("no prefecture table, no check");

    let prefectures = "pref_cd,pref_name\n13,東京都\n";
    let err = RecordTables::from_readers(sources(stations, LINES, joins, Some(prefectures)))
        .expect_err("pref 99 is unknown");
    assert!(matches!(
        err,
        Error::MalformedRecord {
            table: "station",
            ..
        }
    ));
}

#[test]
fn missing_required_column_reports_header_row() {
    let stations = "station_cd,line_cd,pref_cd\n1,1,13\n";
    let joins = "line_cd,station_cd1,station_cd2\n";

    let err = RecordTables::from_readers(sources(stations, LINES, joins, None))
        .expect_err("station_name missing");
    match err {
        Error::MalformedRecord { row, message, .. } => {
            assert_eq!(row, 1);
            assert!(message.contains("station_name"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_station_code_is_rejected() {
    let stations = "station_cd,station_name,line_cd,pref_cd\n1,A,1,13\n1,B,1,13\n";
    let joins = "line_cd,station_cd1,station_cd2\n";

    let err = RecordTables::from_readers(sources(stations, LINES, joins, None))
        .expect_err("duplicate code");
    assert!(err.to_string().contains("duplicate station_cd 1"));
}

#[test]
fn missing_directory_surfaces_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = RecordTables::load_dir(&dir.path().join("absent")).expect_err("no files");
    assert!(matches!(err, Error::Io(_)));
}
