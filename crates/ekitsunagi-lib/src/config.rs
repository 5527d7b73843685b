//! Area configuration: which lines and prefectures make up a playable area,
//! how station names are normalized, and which stations are joined on foot.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::records::{LineCode, PrefCode};

/// Line-dependent rename for a homonymous station name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    /// Station name (after map normalization) the rule applies to.
    pub target: String,
    /// Candidate renames, tried in order.
    pub rules: Vec<LineReplacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReplacement {
    /// Lines that select this rename. Codes are kept as strings to match the
    /// configuration files, which key lines by string.
    pub lines: Vec<String>,
    pub dest: String,
}

impl LineReplacement {
    /// Whether any configured line code matches one of `lines`.
    pub fn applies_to(&self, lines: &[LineCode]) -> bool {
        self.lines.iter().any(|code| {
            code.trim()
                .parse::<LineCode>()
                .map(|code| lines.contains(&code))
                .unwrap_or(false)
        })
    }
}

/// Named bundle of filters and rewrites that defines one playable area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaConfig {
    /// Allowed lines and their display names.
    pub lines: BTreeMap<LineCode, String>,
    /// Raw station name to canonical name.
    #[serde(default)]
    pub normalize_name_map: BTreeMap<String, String>,
    pub valid_pref_cds: Vec<PrefCode>,
    /// Station pairs joined by a walking transfer, as canonical names.
    ///
    /// Endpoints pass through `normalize_name_map` only. A homonym split by
    /// `replacement_rules` must be named by the rule's `dest`.
    #[serde(default)]
    pub walking_pairs: Vec<(String, String)>,
    #[serde(default)]
    pub replacement_rules: Vec<ReplacementRule>,
    /// Stations a round may start from. Like `walking_pairs`, these are
    /// mapped through `normalize_name_map` but not `replacement_rules`, so a
    /// split homonym is named by its `dest`.
    #[serde(default)]
    pub start: Vec<String>,
    /// Stations a round may target. Same naming rule as `start`.
    #[serde(default)]
    pub goal: Vec<String>,
}

impl AreaConfig {
    /// Load an area configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading area config");
        let file = fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse an area configuration from JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|err| Error::InvalidConfig {
            message: err.to_string(),
        })
    }

    pub fn allows_line(&self, line: LineCode) -> bool {
        self.lines.contains_key(&line)
    }

    pub fn allows_prefecture(&self, pref: PrefCode) -> bool {
        self.valid_pref_cds.contains(&pref)
    }

    /// Start and goal stations, in configuration order.
    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.start.iter().chain(&self.goal).map(String::as_str)
    }
}
