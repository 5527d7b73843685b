//! Typed loading of the raw station tables.
//!
//! The loader reads the public station-database CSV layout (`station.csv`,
//! `line.csv`, `join.csv`, and optionally `pref.csv` / `company.csv`) into
//! [`RecordTables`]. Columns are located by header name so extra columns are
//! ignored, and every foreign key is verified against its reference table
//! before the tables are handed to the graph builder.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Numeric identifier for a station row.
pub type StationCode = u32;
/// Numeric identifier for a line.
pub type LineCode = u32;
/// Numeric identifier for a prefecture.
pub type PrefCode = u16;
/// Numeric identifier for an operating company.
pub type CompanyCode = u32;

pub const STATION_FILE: &str = "station.csv";
pub const LINE_FILE: &str = "line.csv";
pub const JOIN_FILE: &str = "join.csv";
pub const PREF_FILE: &str = "pref.csv";
pub const COMPANY_FILE: &str = "company.csv";

/// Geographic coordinate of a station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Raw station row.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub code: StationCode,
    pub name: String,
    pub line: LineCode,
    pub pref: PrefCode,
    pub position: Option<Coordinate>,
}

/// Raw line row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub code: LineCode,
    pub company: CompanyCode,
    pub name: String,
}

/// Direct adjacency of two stations on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinRecord {
    pub line: LineCode,
    pub from: StationCode,
    pub to: StationCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefectureRecord {
    pub code: PrefCode,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub code: CompanyCode,
    pub name: String,
}

/// Readers for each input table. Prefecture and company tables are optional;
/// when present they are used to verify the matching foreign keys.
#[derive(Debug)]
pub struct TableSources<R> {
    pub stations: R,
    pub lines: R,
    pub joins: R,
    pub prefectures: Option<R>,
    pub companies: Option<R>,
}

/// Validated in-memory copy of the input tables.
#[derive(Debug, Clone, Default)]
pub struct RecordTables {
    pub stations: Vec<StationRecord>,
    pub lines: Vec<LineRecord>,
    pub joins: Vec<JoinRecord>,
    pub prefectures: Option<Vec<PrefectureRecord>>,
    pub companies: Option<Vec<CompanyRecord>>,
    station_index: HashMap<StationCode, usize>,
    line_index: HashMap<LineCode, usize>,
}

impl RecordTables {
    /// Assemble tables from already-typed records, verifying keys the same way
    /// the CSV loader does.
    pub fn new(
        stations: Vec<StationRecord>,
        lines: Vec<LineRecord>,
        joins: Vec<JoinRecord>,
        prefectures: Option<Vec<PrefectureRecord>>,
        companies: Option<Vec<CompanyRecord>>,
    ) -> Result<Self> {
        let mut station_index = HashMap::with_capacity(stations.len());
        for (position, station) in stations.iter().enumerate() {
            if station_index.insert(station.code, position).is_some() {
                return Err(malformed(
                    "station",
                    row_of(position),
                    format!("duplicate station_cd {}", station.code),
                ));
            }
        }

        let mut line_index = HashMap::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            if line_index.insert(line.code, position).is_some() {
                return Err(malformed(
                    "line",
                    row_of(position),
                    format!("duplicate line_cd {}", line.code),
                ));
            }
        }

        let tables = Self {
            stations,
            lines,
            joins,
            prefectures,
            companies,
            station_index,
            line_index,
        };
        tables.check_foreign_keys()?;
        Ok(tables)
    }

    /// Load every table from `dir`, using the conventional file names.
    /// `pref.csv` and `company.csv` are read only when they exist.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        debug!(path = %dir.display(), "loading station tables");
        let open_optional = |name: &str| -> Result<Option<fs::File>> {
            let path = dir.join(name);
            if path.exists() {
                Ok(Some(fs::File::open(path)?))
            } else {
                Ok(None)
            }
        };

        let sources = TableSources {
            stations: fs::File::open(dir.join(STATION_FILE))?,
            lines: fs::File::open(dir.join(LINE_FILE))?,
            joins: fs::File::open(dir.join(JOIN_FILE))?,
            prefectures: open_optional(PREF_FILE)?,
            companies: open_optional(COMPANY_FILE)?,
        };
        Self::from_readers(sources)
    }

    /// Parse all tables from the supplied readers.
    pub fn from_readers<R: Read>(sources: TableSources<R>) -> Result<Self> {
        let stations = read_stations(sources.stations)?;
        let lines = read_lines(sources.lines)?;
        let joins = read_joins(sources.joins)?;
        let prefectures = sources.prefectures.map(read_prefectures).transpose()?;
        let companies = sources.companies.map(read_companies).transpose()?;

        debug!(
            stations = stations.len(),
            lines = lines.len(),
            joins = joins.len(),
            "parsed station tables"
        );

        Self::new(stations, lines, joins, prefectures, companies)
    }

    /// Lookup a station row by code.
    pub fn station(&self, code: StationCode) -> Option<&StationRecord> {
        self.station_index
            .get(&code)
            .map(|&position| &self.stations[position])
    }

    /// Lookup a line row by code.
    pub fn line(&self, code: LineCode) -> Option<&LineRecord> {
        self.line_index
            .get(&code)
            .map(|&position| &self.lines[position])
    }

    /// Whether any station row carries exactly this raw name.
    pub fn has_station_named(&self, name: &str) -> bool {
        self.stations.iter().any(|station| station.name == name)
    }

    fn check_foreign_keys(&self) -> Result<()> {
        let prefectures: Option<HashSet<PrefCode>> = self
            .prefectures
            .as_ref()
            .map(|rows| rows.iter().map(|row| row.code).collect());
        let companies: Option<HashSet<CompanyCode>> = self
            .companies
            .as_ref()
            .map(|rows| rows.iter().map(|row| row.code).collect());

        for (position, station) in self.stations.iter().enumerate() {
            if !self.line_index.contains_key(&station.line) {
                return Err(malformed(
                    "station",
                    row_of(position),
                    format!("line_cd {} does not resolve to a line", station.line),
                ));
            }
            if let Some(known) = &prefectures {
                if !known.contains(&station.pref) {
                    return Err(malformed(
                        "station",
                        row_of(position),
                        format!("pref_cd {} does not resolve to a prefecture", station.pref),
                    ));
                }
            }
        }

        if let Some(known) = &companies {
            for (position, line) in self.lines.iter().enumerate() {
                if !known.contains(&line.company) {
                    return Err(malformed(
                        "line",
                        row_of(position),
                        format!("company_cd {} does not resolve to a company", line.company),
                    ));
                }
            }
        }

        for (position, join) in self.joins.iter().enumerate() {
            if !self.line_index.contains_key(&join.line) {
                return Err(malformed(
                    "join",
                    row_of(position),
                    format!("line_cd {} does not resolve to a line", join.line),
                ));
            }
            for code in [join.from, join.to] {
                if !self.station_index.contains_key(&code) {
                    return Err(malformed(
                        "join",
                        row_of(position),
                        format!("station_cd {code} does not resolve to a station"),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn read_stations<R: Read>(reader: R) -> Result<Vec<StationRecord>> {
    let mut table = TableReader::open(
        "station",
        reader,
        &["station_cd", "station_name", "line_cd", "pref_cd"],
        &["lat", "lon"],
    )?;

    let mut stations = Vec::new();
    while let Some((row, record)) = table.next_record()? {
        let lat = table.optional::<f64>(&record, row, "lat")?;
        let lon = table.optional::<f64>(&record, row, "lon")?;
        let position = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
            _ => None,
        };

        stations.push(StationRecord {
            code: table.parse(&record, row, "station_cd")?,
            name: table.text(&record, row, "station_name")?.to_string(),
            line: table.parse(&record, row, "line_cd")?,
            pref: table.parse(&record, row, "pref_cd")?,
            position,
        });
    }
    Ok(stations)
}

fn read_lines<R: Read>(reader: R) -> Result<Vec<LineRecord>> {
    let mut table = TableReader::open(
        "line",
        reader,
        &["line_cd", "company_cd", "line_name"],
        &[],
    )?;

    let mut lines = Vec::new();
    while let Some((row, record)) = table.next_record()? {
        lines.push(LineRecord {
            code: table.parse(&record, row, "line_cd")?,
            company: table.parse(&record, row, "company_cd")?,
            name: table.text(&record, row, "line_name")?.to_string(),
        });
    }
    Ok(lines)
}

fn read_joins<R: Read>(reader: R) -> Result<Vec<JoinRecord>> {
    let mut table = TableReader::open(
        "join",
        reader,
        &["line_cd", "station_cd1", "station_cd2"],
        &[],
    )?;

    let mut joins = Vec::new();
    while let Some((row, record)) = table.next_record()? {
        joins.push(JoinRecord {
            line: table.parse(&record, row, "line_cd")?,
            from: table.parse(&record, row, "station_cd1")?,
            to: table.parse(&record, row, "station_cd2")?,
        });
    }
    Ok(joins)
}

fn read_prefectures<R: Read>(reader: R) -> Result<Vec<PrefectureRecord>> {
    let mut table = TableReader::open("pref", reader, &["pref_cd", "pref_name"], &[])?;

    let mut prefectures = Vec::new();
    while let Some((row, record)) = table.next_record()? {
        prefectures.push(PrefectureRecord {
            code: table.parse(&record, row, "pref_cd")?,
            name: table.text(&record, row, "pref_name")?.to_string(),
        });
    }
    Ok(prefectures)
}

fn read_companies<R: Read>(reader: R) -> Result<Vec<CompanyRecord>> {
    let mut table = TableReader::open(
        "company",
        reader,
        &["company_cd", "company_name"],
        &[],
    )?;

    let mut companies = Vec::new();
    while let Some((row, record)) = table.next_record()? {
        companies.push(CompanyRecord {
            code: table.parse(&record, row, "company_cd")?,
            name: table.text(&record, row, "company_name")?.to_string(),
        });
    }
    Ok(companies)
}

/// CSV reader that resolves column positions from the header row.
struct TableReader<R: Read> {
    table: &'static str,
    reader: csv::Reader<R>,
    columns: HashMap<&'static str, usize>,
    row: u64,
}

impl<R: Read> TableReader<R> {
    fn open(
        table: &'static str,
        reader: R,
        required: &[&'static str],
        optional: &[&'static str],
    ) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|err| malformed(table, 1, format!("failed to read headers: {err}")))?
            .clone();

        let normalized: Vec<String> = headers
            .iter()
            .map(|header| header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();

        let mut columns = HashMap::new();
        for &column in required.iter().chain(optional) {
            if let Some(index) = normalized.iter().position(|header| header == column) {
                columns.insert(column, index);
            }
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|column| !columns.contains_key(column))
            .collect();
        if !missing.is_empty() {
            return Err(malformed(
                table,
                1,
                format!(
                    "missing required columns: {}. Available: {}",
                    missing.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            ));
        }

        Ok(Self {
            table,
            reader,
            columns,
            row: 1,
        })
    }

    fn next_record(&mut self) -> Result<Option<(u64, StringRecord)>> {
        let mut record = StringRecord::new();
        let more = self
            .reader
            .read_record(&mut record)
            .map_err(|err| malformed(self.table, self.row + 1, err.to_string()))?;
        if !more {
            return Ok(None);
        }
        self.row += 1;
        Ok(Some((self.row, record)))
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.columns
            .get(column)
            .and_then(|&index| record.get(index))
            .filter(|value| !value.is_empty())
    }

    fn text<'r>(&self, record: &'r StringRecord, row: u64, column: &str) -> Result<&'r str> {
        self.cell(record, column)
            .ok_or_else(|| malformed(self.table, row, format!("missing value for {column}")))
    }

    fn parse<T>(&self, record: &StringRecord, row: u64, column: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.text(record, row, column)?;
        value.parse::<T>().map_err(|err| {
            malformed(
                self.table,
                row,
                format!("invalid {column} '{value}': {err}"),
            )
        })
    }

    fn optional<T>(&self, record: &StringRecord, row: u64, column: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.cell(record, column) {
            Some(_) => self.parse(record, row, column).map(Some),
            None => Ok(None),
        }
    }
}

fn malformed(table: &'static str, row: u64, message: String) -> Error {
    Error::MalformedRecord {
        table,
        row,
        message,
    }
}

/// CSV row number (the header is row 1) for a zero-based record position.
fn row_of(position: usize) -> u64 {
    position as u64 + 2
}
