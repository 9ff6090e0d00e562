//! Rules and the ordered registry the engine scans.
//!
//! A [`Rule`] is one of a closed set of matchers. Single-line rules answer a
//! line with records straight away; block rules answer with a [`Block`] that
//! the engine keeps feeding subsequent lines until it reports completion.
//! Registry order is priority order: the first rule whose trigger matches a
//! line handles it.

// the "standard" regular expression package
use regex::Regex;
// so regular expressions don't have to be recompiled
use lazy_static::lazy_static;

use tracing::debug;

use crate::block::{Block, ForceRule, StressRule};
use crate::phrase::{self, PhraseRule};
use crate::scalar::{EnergyContributionRule, ScalarRule};
use crate::value::{Record, Value};

/// A numeric token as printed by Fortran: optional sign, optional fraction,
/// optional exponent with `E` or `D`.
pub const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eEdD][-+]?\d+)?";

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^[-+]?\d+$").unwrap();
    static ref NUMERIC: Regex = Regex::new(&format!("^{}$", NUMBER)).unwrap();
}

/// Parses a whole token into an integer or float value.
///
/// Bare integers keep their type; anything with a decimal point or exponent
/// becomes a float. Returns `None` for malformed tokens such as Fortran's
/// `*******` overflow marker.
pub fn parse_number(token: &str) -> Option<Value> {
    let token = token.trim();
    if INTEGER.is_match(token) {
        match token.parse::<i64>() {
            Ok(v) => return Some(Value::Int(v)),
            // too wide for i64, still a perfectly good float
            Err(_) => return token.parse::<f64>().ok().map(Value::Float),
        }
    }
    if NUMERIC.is_match(token) {
        return token.replace(['d', 'D'], "e").parse::<f64>().ok().map(Value::Float);
    }
    None
}

pub fn parse_float(token: &str) -> Option<f64> {
    parse_number(token).and_then(|v| v.as_f64())
}

pub fn is_numeric(token: &str) -> bool {
    NUMERIC.is_match(token.trim())
}

/// What a rule does with a line it matched.
pub enum Activation {
    /// The line was handled on its own; these records are complete.
    Emit(Vec<Record>),
    /// The line opened a block. `records` are emitted right away (header
    /// metadata such as units); the block collects the rest.
    Block { block: Block, records: Vec<Record> },
}

pub enum Rule {
    Stress(StressRule),
    Forces(ForceRule),
    EnergyContribution(EnergyContributionRule),
    Phrase(PhraseRule),
    Scalar(ScalarRule),
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Rule::Stress(_) => "stress",
            Rule::Forces(_) => "forces",
            Rule::EnergyContribution(_) => "energy_contribution",
            Rule::Phrase(rule) => rule.name(),
            Rule::Scalar(_) => "scalar",
        }
    }
    pub fn is_block(&self) -> bool {
        matches!(self, Rule::Stress(_) | Rule::Forces(_))
    }
    pub fn try_match(&self, line: &str) -> Option<Activation> {
        match self {
            Rule::Stress(rule) => rule.try_match(line),
            Rule::Forces(rule) => rule.try_match(line),
            Rule::EnergyContribution(rule) => rule.try_match(line).map(|r| Activation::Emit(vec![r])),
            Rule::Phrase(rule) => rule.try_match(line).map(|r| Activation::Emit(vec![r])),
            Rule::Scalar(rule) => rule.try_match(line).map(|r| Activation::Emit(vec![r])),
        }
    }
}

/// Ordered collection of rules; earlier rules take priority.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules for `pw.x` output: stress and force blocks, the energy
    /// summary, prose phrases and finally the generic `label = value` rule.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(Rule::Stress(StressRule))
            .register(Rule::Forces(ForceRule))
            .register(Rule::EnergyContribution(EnergyContributionRule));
        for phrase in phrase::standard_phrases() {
            registry.register(Rule::Phrase(phrase));
        }
        registry.register(Rule::Scalar(ScalarRule));
        registry
    }

    pub fn register(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Inserts `rule` right before the first rule called `name`, or appends
    /// it when there is none. Custom rules go in front of the catch-all
    /// scalar rule this way.
    pub fn insert_before(&mut self, name: &str, rule: Rule) -> &mut Self {
        match self.rules.iter().position(|r| r.name() == name) {
            Some(index) => self.rules.insert(index, rule),
            None => self.rules.push(rule),
        }
        self
    }

    /// Removes every rule called `name` and returns how many were removed.
    pub fn disable(&mut self, name: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| r.name() != name);
        let removed = before - self.rules.len();
        debug!(rule = name, removed, "disabled rule");
        removed
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(Rule::name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
