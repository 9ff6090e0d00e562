// the "standard" regular expression package
use regex::Regex;
// so regular expressions don't have to be recompiled
use lazy_static::lazy_static;

use tracing::debug;

use crate::rule::{NUMBER, is_numeric, parse_number};
use crate::value::Record;

lazy_static! {
    // a separator followed by a number that ends at whitespace, a list delimiter or the line end
    static ref ASSIGNMENT: Regex =
        Regex::new(&format!(r"(?P<sep>[=<])\s*(?P<value>{})(?:[\s,;]|$)", NUMBER)).unwrap();
    static ref ENERGY_CONTRIBUTION: Regex = Regex::new(&format!(
        r"^\s*(?P<name>\S+(?:\s\S+)*?)\s+contrib(?:ution|\.)\s*(?:\([^)]*\))?\s*=\s*(?P<value>{})(?:\s+(?P<unit>\S+))?\s*$",
        NUMBER
    ))
    .unwrap();
    static ref COLUMN_GAP: Regex = Regex::new(r"\s{2,}").unwrap();
    // only a spaced qualifier, `celldm(1)` keeps its index
    static ref TRAILING_QUALIFIER: Regex = Regex::new(r"\s+\([^()]*\)$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const DECORATION: &[char] = &['!', '#', '*', '>'];

/// Turns the raw text in front of a separator into a record key.
///
/// Leading decoration (`!` marks the converged total energy) and trailing
/// qualifiers in parentheses (`lattice parameter (alat)`) are dropped and
/// whitespace runs collapse to one space. Only the text after the last `=`,
/// `<` or `,` belongs to the label. Keys need at least one letter.
pub fn clean_label(raw: &str) -> Option<String> {
    let raw = match raw.rfind(['=', '<', ',']) {
        Some(index) => &raw[index + 1..],
        None => raw,
    };
    let mut label = WHITESPACE
        .replace_all(raw.trim().trim_start_matches(DECORATION).trim(), " ")
        .into_owned();
    while TRAILING_QUALIFIER.is_match(&label) {
        label = TRAILING_QUALIFIER.replace(&label, "").into_owned();
    }
    let label = label.trim_end_matches([':', ' ']).to_string();
    if label.chars().any(char::is_alphabetic) {
        Some(label)
    } else {
        None
    }
}

/// Extracts the unit that trails a value: the first column of `rest`, unless it is numeric.
fn trailing_unit(rest: &str) -> Option<&str> {
    let rest = rest.trim();
    let unit = COLUMN_GAP.split(rest).next()?.trim();
    if unit.is_empty() || unit.split_whitespace().next().is_some_and(is_numeric) {
        None
    } else {
        Some(unit)
    }
}

/// Matches `label = value [unit]`, `label < value [unit]` and several
/// assignments on one line.
///
/// Between two assignments pw.x aligns columns with runs of spaces, so the
/// text after a value is split at the first such gap: a single token before
/// the gap is the unit of the previous value, the rest is the next label.
/// `Total force = 0.01 Total SCF correction = 0.00` therefore yields two
/// labels and no units, `ecut= 30.00 Ry     beta= 0.70` yields a unit for
/// `ecut`. Text in front of the first label that is separated by such a gap
/// is not part of it.
///
/// Labels keep the wording as printed. Outside a force block the totals line
/// above gives `Total force` and `Total SCF correction`; inside one the force
/// block reads it and emits the lowercase `total force` and
/// `total SCF correction`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarRule;

impl ScalarRule {
    pub fn try_match(&self, line: &str) -> Option<Record> {
        let assignments: Vec<_> = ASSIGNMENT.captures_iter(line).collect();
        if assignments.is_empty() {
            return None;
        }
        let mut record = Record::new();
        let mut label_start = 0;
        let mut previous: Option<String> = None;
        for (i, caps) in assignments.iter().enumerate() {
            let (sep, value) = match (caps.name("sep"), caps.name("value")) {
                (Some(sep), Some(value)) => (sep, value),
                _ => continue,
            };
            let mut raw_label = line[label_start..sep.start()].trim();
            match &previous {
                // the column in front of the label may be the unit of the previous value
                Some(previous) => {
                    let mut columns = COLUMN_GAP.splitn(raw_label, 2);
                    if let (Some(unit), Some(rest)) = (columns.next(), columns.next()) {
                        if !unit.contains(char::is_whitespace) && !is_numeric(unit) {
                            record.insert(format!("{} units", previous), unit);
                            raw_label = rest;
                        }
                    }
                }
                // `iteration #  1     ecut=`: only the last column labels the value
                None => {
                    if let Some(last) = COLUMN_GAP.split(raw_label).last() {
                        raw_label = last;
                    }
                }
            }
            label_start = value.end();
            previous = None;
            let Some(label) = clean_label(raw_label) else {
                continue;
            };
            let Some(number) = parse_number(value.as_str()) else {
                debug!(label = %label, token = value.as_str(), "dropping malformed number");
                continue;
            };
            record.insert(label.clone(), number);
            if i + 1 == assignments.len() {
                if let Some(unit) = trailing_unit(&line[value.end()..]) {
                    record.insert(format!("{} units", label), unit);
                }
            } else {
                previous = Some(label);
            }
        }
        if record.is_empty() { None } else { Some(record) }
    }
}

/// Energy summary lines such as `one-electron contribution = -13.58 Ry` or
/// `smearing contrib. (-TS) = 0.00 Ry`, keyed `"<name> energy contribution"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnergyContributionRule;

impl EnergyContributionRule {
    pub fn try_match(&self, line: &str) -> Option<Record> {
        let caps = ENERGY_CONTRIBUTION.captures(line)?;
        let name = caps.name("name")?.as_str().trim_start_matches(DECORATION).trim();
        let key = format!("{} energy contribution", WHITESPACE.replace_all(name, " "));
        let mut record = Record::new();
        match parse_number(caps.name("value")?.as_str()) {
            Some(value) => {
                record.insert(key.clone(), value);
                if let Some(unit) = caps.name("unit") {
                    record.insert(format!("{} units", key), unit.as_str());
                }
            }
            None => debug!(key = %key, "dropping malformed number"),
        }
        Some(record)
    }
}
