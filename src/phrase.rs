//! Regex driven rules with fixed keys.
//!
//! pw.x prints a handful of results as prose rather than `label = value`
//! (`the Fermi energy is 6.54 ev`). Each of those gets a [`PhraseRule`]: a
//! regular expression whose named groups feed fixed record keys. The same
//! type backs user supplied rules from the configuration file.

// the "standard" regular expression package
use regex::Regex;
// so regular expressions don't have to be recompiled
use lazy_static::lazy_static;

use tracing::debug;

use crate::error::{PwoutError, Result};
use crate::rule::{NUMBER, parse_number};
use crate::value::Record;

lazy_static! {
    static ref SCF_ITERATIONS: Regex =
        Regex::new(r"convergence has been achieved in\s+(?P<value>\d+)\s+iterations").unwrap();
    static ref FERMI_ENERGY: Regex = Regex::new(&format!(
        r"the Fermi energy is\s+(?P<value>{})\s+(?P<unit>\S+)",
        NUMBER
    ))
    .unwrap();
    static ref HOMO_LUMO: Regex = Regex::new(&format!(
        r"highest occupied, lowest unoccupied level\s*\((?P<unit>[^)]*)\):\s*(?P<value>{})\s+(?P<lumo>{})",
        NUMBER, NUMBER
    ))
    .unwrap();
    static ref HIGHEST_OCCUPIED: Regex = Regex::new(&format!(
        r"highest occupied level\s*\((?P<unit>[^)]*)\):\s*(?P<value>{})",
        NUMBER
    ))
    .unwrap();
    static ref CPU_TIME: Regex = Regex::new(&format!(
        r"total cpu time spent up to now is\s+(?P<value>{})\s+(?P<unit>\S+)",
        NUMBER
    ))
    .unwrap();
}

/// Where the unit of a phrase comes from, if it has one.
#[derive(Debug, Clone)]
enum UnitSource {
    Group,
    Fixed(String),
}

#[derive(Debug, Clone)]
pub struct PhraseRule {
    name: String,
    regex: Regex,
    // (capture group, record key)
    fields: Vec<(String, String)>,
    unit: Option<UnitSource>,
}

impl PhraseRule {
    /// Compiles a single-value rule. `pattern` must have a `value` group and
    /// may have a `unit` group.
    pub fn new(name: &str, pattern: &str, key: &str) -> Result<Self> {
        Self::with_fields(name, pattern, &[("value", key)])
    }

    /// Compiles a rule that maps several capture groups to keys.
    pub fn with_fields(name: &str, pattern: &str, fields: &[(&str, &str)]) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| PwoutError::Pattern {
            rule: name.to_string(),
            message: e.to_string(),
        })?;
        if fields.is_empty() {
            return Err(PwoutError::Pattern {
                rule: name.to_string(),
                message: "no fields to extract".to_string(),
            });
        }
        for (group, _) in fields {
            if !regex.capture_names().flatten().any(|n| n == *group) {
                return Err(PwoutError::Pattern {
                    rule: name.to_string(),
                    message: format!("missing capture group `{}`", group),
                });
            }
        }
        Ok(Self::from_regex(name, regex, fields))
    }

    fn from_regex(name: &str, regex: Regex, fields: &[(&str, &str)]) -> Self {
        let unit = if regex.capture_names().flatten().any(|n| n == "unit") {
            Some(UnitSource::Group)
        } else {
            None
        };
        Self {
            name: name.to_string(),
            regex,
            fields: fields.iter().map(|(g, k)| (g.to_string(), k.to_string())).collect(),
            unit,
        }
    }

    /// Uses a fixed unit for every field, overriding any `unit` group.
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(UnitSource::Fixed(unit.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn try_match(&self, line: &str) -> Option<Record> {
        let caps = self.regex.captures(line)?;
        let unit = match &self.unit {
            Some(UnitSource::Group) => caps.name("unit").map(|m| m.as_str().trim().to_string()),
            Some(UnitSource::Fixed(unit)) => Some(unit.clone()),
            None => None,
        };
        let mut record = Record::new();
        for (group, key) in &self.fields {
            let Some(token) = caps.name(group) else {
                continue;
            };
            let Some(value) = parse_number(token.as_str()) else {
                debug!(rule = %self.name, key = %key, token = token.as_str(), "dropping malformed number");
                continue;
            };
            record.insert(key.as_str(), value);
            if let Some(unit) = unit.as_deref().filter(|u| !u.is_empty()) {
                record.insert(format!("{} units", key), unit);
            }
        }
        Some(record)
    }
}

/// The prose rules of the standard registry, in priority order.
pub fn standard_phrases() -> Vec<PhraseRule> {
    vec![
        PhraseRule::from_regex("scf_iterations", SCF_ITERATIONS.clone(), &[("value", "scf iterations")]),
        PhraseRule::from_regex("fermi_energy", FERMI_ENERGY.clone(), &[("value", "Fermi energy")]),
        PhraseRule::from_regex(
            "homo_lumo",
            HOMO_LUMO.clone(),
            &[("value", "highest occupied level"), ("lumo", "lowest unoccupied level")],
        ),
        PhraseRule::from_regex("highest_occupied_level", HIGHEST_OCCUPIED.clone(), &[("value", "highest occupied level")]),
        PhraseRule::from_regex("cpu_time", CPU_TIME.clone(), &[("value", "total cpu time")]),
    ]
}
