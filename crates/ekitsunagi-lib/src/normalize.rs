use std::collections::BTreeMap;

use crate::config::{AreaConfig, ReplacementRule};
use crate::error::{Error, Result};
use crate::records::{LineCode, RecordTables};

/// Collapses spelling and notation variants of station names to the
/// canonical name used as graph node identity.
#[derive(Debug, Clone, Copy)]
pub struct NameNormalizer<'a> {
    map: &'a BTreeMap<String, String>,
    replacement_rules: &'a [ReplacementRule],
}

impl<'a> NameNormalizer<'a> {
    pub fn new(config: &'a AreaConfig) -> Self {
        Self {
            map: &config.normalize_name_map,
            replacement_rules: &config.replacement_rules,
        }
    }

    /// Map lookup with fallback to the raw name.
    pub fn normalize<'n>(&self, raw: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.map.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Canonical name for a station served by `lines`: the map lookup
    /// followed by the first line-dependent replacement rule that applies.
    pub fn resolve(&self, raw: &str, lines: &[LineCode]) -> Result<String> {
        let name = self.normalize(raw);
        let Some(rule) = self
            .replacement_rules
            .iter()
            .find(|rule| rule.target == name)
        else {
            return Ok(name.to_string());
        };

        rule.rules
            .iter()
            .find(|replacement| replacement.applies_to(lines))
            .map(|replacement| replacement.dest.clone())
            .ok_or_else(|| Error::AmbiguousReplacement {
                name: name.to_string(),
                lines: lines.to_vec(),
            })
    }

    /// Every map target must be the raw name of some station in `tables`.
    pub fn validate(&self, tables: &RecordTables) -> Result<()> {
        for (source, target) in self.map {
            if !tables.has_station_named(target) {
                return Err(Error::UnresolvedNormalizationTarget {
                    source_name: source.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineReplacement;

    fn config() -> AreaConfig {
        AreaConfig {
            normalize_name_map: BTreeMap::from([(
                "押上（スカイツリー前）".to_string(),
                "押上".to_string(),
            )]),
            replacement_rules: vec![ReplacementRule {
                target: "霞ケ関".to_string(),
                rules: vec![
                    LineReplacement {
                        lines: vec!["21001".to_string()],
                        dest: "霞ケ関(埼玉)".to_string(),
                    },
                    LineReplacement {
                        lines: vec!["28001".to_string(), "28002".to_string()],
                        dest: "霞ケ関".to_string(),
                    },
                ],
            }],
            ..AreaConfig::default()
        }
    }

    #[test]
    fn normalize_falls_back_to_raw_name() {
        let config = config();
        let normalizer = NameNormalizer::new(&config);
        assert_eq!(normalizer.normalize("押上（スカイツリー前）"), "押上");
        assert_eq!(normalizer.normalize("渋谷"), "渋谷");
    }

    #[test]
    fn replacement_rules_pick_by_line() {
        let config = config();
        let normalizer = NameNormalizer::new(&config);
        assert_eq!(
            normalizer.resolve("霞ケ関", &[21001]).unwrap(),
            "霞ケ関(埼玉)"
        );
        assert_eq!(normalizer.resolve("霞ケ関", &[28002]).unwrap(), "霞ケ関");
        assert_eq!(normalizer.resolve("押上（スカイツリー前）", &[]).unwrap(), "押上");
    }

    #[test]
    fn unmatched_replacement_is_an_error() {
        let config = config();
        let normalizer = NameNormalizer::new(&config);
        let err = normalizer.resolve("霞ケ関", &[11302]).unwrap_err();
        assert!(matches!(err, Error::AmbiguousReplacement { .. }));
    }
}
