//! Multi-line table rules: the stress tensor and the per-atom force tables.
//!
//! A block rule matches a header line and hands the engine a [`Block`] that
//! holds the partially accumulated table. The engine offers every following
//! line to the block until it reports [`Step::Done`] (it consumed the closing
//! line) or [`Step::Released`] (the line is not part of the block and goes
//! back to the registry scan).

// the "standard" regular expression package
use regex::Regex;
// so regular expressions don't have to be recompiled
use lazy_static::lazy_static;

use tracing::debug;

use crate::rule::{Activation, NUMBER, parse_float, parse_number};
use crate::value::Record;

pub const STRESS_ROWS: usize = 3;
pub const SPECIES_KEY: &str = "Atomic species index for forces";
pub const FORCES_KEY: &str = "forces";
/// pw.x prints atom numbers in a five digit field.
pub const MAX_ATOMS: usize = 99_999;

lazy_static! {
    static ref STRESS_HEADER: Regex = Regex::new(&format!(
        r"^\s*total\s+stress\s*\((?P<atomic>[^)]*)\)\s*\((?P<unit>[^)]*)\)\s*P\s*=\s*(?P<pressure>{})",
        NUMBER
    ))
    .unwrap();
    // digits, signs, dots, exponents and Fortran overflow stars
    static ref ROW_TOKEN: Regex = Regex::new(r"^[-+0-9.eEdD*]+$").unwrap();
    static ref FORCES_HEADER: Regex =
        Regex::new(r"^\s*Forces acting on atoms\s*(?P<unit>\([^)]*\))\s*:").unwrap();
    static ref ATOM_FORCE: Regex = Regex::new(
        r"^\s*atom\s+(?P<atom>\d+)\s+type\s+(?P<species>\d+)\s+force\s*=\s*(?P<components>.*)$"
    )
    .unwrap();
    static ref CONTRIBUTION: Regex =
        Regex::new(r"^\s*The\s+(?P<name>.+?)\s+(?:contrib(?:ution)?\.?|term)\s+to\s+forces").unwrap();
    static ref TOTAL_FORCE: Regex = Regex::new(&format!(
        r"^\s*Total\s+force\s*=\s*(?P<total>{})(?:\s+Total\s+SCF\s+correction\s*=\s*(?P<scf>{}))?",
        NUMBER, NUMBER
    ))
    .unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// What a block did with a line.
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Part of the block; the block stays active.
    Consumed(Vec<Record>),
    /// The closing line of the block; the block is finished.
    Done(Vec<Record>),
    /// Not part of the block; the block is finished and the line is free for other rules.
    Released(Vec<Record>),
}

/// Partial state of an active block rule.
#[derive(Debug)]
pub enum Block {
    Stress(StressBlock),
    Forces(ForceBlock),
}

impl Block {
    pub fn consume(&mut self, line: &str) -> Step {
        match self {
            Block::Stress(block) => block.consume(line),
            Block::Forces(block) => block.consume(line),
        }
    }
    /// Closes the block at end of input, returning whatever was accumulated.
    pub fn finish(&mut self) -> Vec<Record> {
        match self {
            Block::Stress(block) => block.take_table(),
            Block::Forces(block) => block.take_table(),
        }
    }
}

// ------------- Stress -------------

/// `total stress (Ry/bohr**3) (kbar) P= -77.72` followed by three rows of
/// six numbers: the tensor in atomic units, then in kbar.
#[derive(Debug, Default, Clone, Copy)]
pub struct StressRule;

impl StressRule {
    pub fn try_match(&self, line: &str) -> Option<Activation> {
        let caps = STRESS_HEADER.captures(line)?;
        let unit = caps.name("unit")?.as_str().trim().to_string();
        let mut pressure = Record::new();
        match caps.name("pressure").and_then(|m| parse_number(m.as_str())) {
            Some(value) => {
                pressure.insert("pressure", value);
                pressure.insert("pressure units", unit.as_str());
            }
            None => debug!("dropping malformed pressure"),
        }
        Some(Activation::Block {
            block: Block::Stress(StressBlock::new(unit)),
            records: vec![pressure],
        })
    }
}

#[derive(Debug)]
pub struct StressBlock {
    unit: String,
    rows: Vec<Vec<f64>>,
    seen: usize,
}

impl StressBlock {
    pub fn new(unit: String) -> Self {
        Self { unit, rows: Vec::with_capacity(STRESS_ROWS), seen: 0 }
    }

    pub fn consume(&mut self, line: &str) -> Step {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 6 || !tokens.iter().all(|t| ROW_TOKEN.is_match(t)) {
            debug!(rows = self.rows.len(), "stress table ended early");
            return Step::Released(self.take_table());
        }
        self.seen += 1;
        // only the kbar half of the row is kept
        let row: Option<Vec<f64>> = tokens[3..].iter().map(|t| parse_float(t)).collect();
        match row {
            Some(row) => self.rows.push(row),
            None => debug!(row = self.seen, "dropping malformed stress row"),
        }
        if self.seen == STRESS_ROWS {
            Step::Done(self.take_table())
        } else {
            Step::Consumed(Vec::new())
        }
    }

    fn take_table(&mut self) -> Vec<Record> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        let rows = std::mem::take(&mut self.rows);
        vec![Record::new().with("stress", rows).with("stress units", self.unit.as_str())]
    }
}

// ------------- Forces -------------

/// `Forces acting on atoms (Ry/au):` followed by per-atom rows, optional
/// contribution tables and the closing `Total force = ...` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForceRule;

impl ForceRule {
    pub fn try_match(&self, line: &str) -> Option<Activation> {
        let caps = FORCES_HEADER.captures(line)?;
        let unit = caps.name("unit")?.as_str().trim();
        Some(Activation::Block {
            block: Block::Forces(ForceBlock::new()),
            records: vec![Record::new().with("force units", unit)],
        })
    }
}

/// The table currently being filled plus the key it will be emitted under.
///
/// The first table is the total force on every atom and goes out as
/// `"forces"` together with the species index table. Each
/// `The <name> contribution to forces` line closes the current table and
/// opens one keyed `"<name> contribution to forces"`.
#[derive(Debug)]
pub struct ForceBlock {
    key: String,
    rows: Vec<Vec<f64>>,
    species: Vec<i64>,
}

impl Default for ForceBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceBlock {
    pub fn new() -> Self {
        Self { key: FORCES_KEY.to_string(), rows: Vec::new(), species: Vec::new() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn consume(&mut self, line: &str) -> Step {
        if line.trim().is_empty() {
            return Step::Consumed(Vec::new());
        }
        if let Some(caps) = ATOM_FORCE.captures(line) {
            self.push_atom(&caps);
            return Step::Consumed(Vec::new());
        }
        if let Some(caps) = CONTRIBUTION.captures(line) {
            let records = self.take_table();
            let name = caps.name("name").map_or("", |m| m.as_str());
            self.key = format!("{} contribution to forces", WHITESPACE.replace_all(name.trim(), " "));
            debug!(key = %self.key, "force contribution table");
            return Step::Consumed(records);
        }
        if let Some(caps) = TOTAL_FORCE.captures(line) {
            let mut records = self.take_table();
            let mut totals = Record::new();
            if let Some(total) = caps.name("total").and_then(|m| parse_number(m.as_str())) {
                totals.insert("total force", total);
            }
            if let Some(scf) = caps.name("scf").and_then(|m| parse_number(m.as_str())) {
                totals.insert("total SCF correction", scf);
            }
            records.push(totals);
            return Step::Done(records);
        }
        Step::Released(self.take_table())
    }

    fn push_atom(&mut self, caps: &regex::Captures) {
        let atom = caps.name("atom").and_then(|m| m.as_str().parse::<usize>().ok());
        let species = caps.name("species").and_then(|m| m.as_str().parse::<i64>().ok());
        let components: Option<Vec<f64>> = caps
            .name("components")
            .and_then(|m| m.as_str().split_whitespace().map(parse_float).collect());
        match (atom, species, components) {
            (Some(atom), Some(species), Some(force))
                if (1..=MAX_ATOMS).contains(&atom) && force.len() == 3 =>
            {
                let index = atom - 1;
                if self.rows.len() < atom {
                    self.rows.resize(atom, Vec::new());
                    self.species.resize(atom, 0);
                }
                self.rows[index] = force;
                self.species[index] = species;
            }
            _ => debug!(key = %self.key, "dropping malformed atom force row"),
        }
    }

    fn take_table(&mut self) -> Vec<Record> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        let mut record = Record::new().with(self.key.as_str(), std::mem::take(&mut self.rows));
        let species = std::mem::take(&mut self.species);
        if self.key == FORCES_KEY {
            record.insert(SPECIES_KEY, species);
        }
        vec![record]
    }
}
