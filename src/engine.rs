//! The parser engine: feeds lines through the rule registry and yields records.
//!
//! Parsing is a single pass. Each line goes to the active block first, if
//! there is one; otherwise the registry is scanned in order and the first
//! matching rule handles the line. Lines no rule wants are skipped. A block
//! that gives a line back (it ended without consuming it) leaves the line to
//! the normal scan, so a scalar line right after a stress table is not lost.
//!
//! All per-run state lives in the [`Records`] iterator, which makes a
//! [`Parser`] reusable: every call to [`Parser::parse`] starts from scratch.

use std::collections::VecDeque;
use std::mem;

use tracing::{debug, trace};

use crate::block::{Block, Step};
use crate::rule::{Activation, RuleRegistry};
use crate::value::{Record, flatten};

pub struct Parser {
    registry: RuleRegistry,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(RuleRegistry::standard())
    }
}

impl Parser {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Lazily parses `lines`, yielding one record per rule match in input order.
    pub fn parse<I>(&self, lines: I) -> Records<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Records {
            registry: &self.registry,
            lines: lines.into_iter(),
            state: State::Idle,
            pending: VecDeque::new(),
            line_number: 0,
            exhausted: false,
        }
    }

    /// Parses `lines` and folds the records into one mapping, last write wins.
    pub fn parse_flat<I>(&self, lines: I) -> Record
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        flatten(self.parse(lines))
    }
}

/// Engine state between two lines.
#[derive(Debug)]
enum State {
    Idle,
    /// `rule` is the registry index of the block's rule, kept for logging.
    InBlock { rule: usize, block: Block },
}

/// Iterator over the records of one parse run.
pub struct Records<'p, L> {
    registry: &'p RuleRegistry,
    lines: L,
    state: State,
    pending: VecDeque<Record>,
    line_number: usize,
    exhausted: bool,
}

impl<'p, L> Records<'p, L>
where
    L: Iterator,
    L::Item: AsRef<str>,
{
    fn emit(&mut self, records: Vec<Record>) {
        self.pending.extend(records.into_iter().filter(|r| !r.is_empty()));
    }

    fn rule_name(&self, index: usize) -> &'p str {
        let registry: &'p RuleRegistry = self.registry;
        registry.rules().get(index).map_or("?", |r| r.name())
    }

    fn offer(&mut self, line: &str) {
        let step = match &mut self.state {
            State::InBlock { block, .. } => Some(block.consume(line)),
            State::Idle => None,
        };
        match step {
            None => (),
            Some(Step::Consumed(records)) => {
                self.emit(records);
                return;
            }
            Some(Step::Done(records)) => {
                self.close_block("block complete");
                self.emit(records);
                return;
            }
            Some(Step::Released(records)) => {
                self.close_block("block released line");
                self.emit(records);
            }
        }
        self.scan(line);
    }

    fn close_block(&mut self, reason: &str) {
        if let State::InBlock { rule, .. } = mem::replace(&mut self.state, State::Idle) {
            debug!(rule = self.rule_name(rule), line = self.line_number, "{}", reason);
        }
    }

    fn scan(&mut self, line: &str) {
        let registry: &'p RuleRegistry = self.registry;
        for (index, rule) in registry.rules().iter().enumerate() {
            let Some(activation) = rule.try_match(line) else {
                continue;
            };
            match activation {
                Activation::Emit(records) => {
                    debug!(rule = rule.name(), line = self.line_number, "rule matched");
                    self.emit(records);
                }
                Activation::Block { block, records } => {
                    debug!(rule = rule.name(), line = self.line_number, "block opened");
                    self.emit(records);
                    self.state = State::InBlock { rule: index, block };
                }
            }
            return;
        }
        trace!(line = self.line_number, "no rule matched");
    }

    fn finish(&mut self) {
        if let State::InBlock { rule, mut block } = mem::replace(&mut self.state, State::Idle) {
            debug!(rule = self.rule_name(rule), "block closed at end of input");
            let records = block.finish();
            self.emit(records);
        }
    }
}

impl<'p, L> Iterator for Records<'p, L>
where
    L: Iterator,
    L::Item: AsRef<str>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            if self.exhausted {
                return None;
            }
            match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    self.offer(line.as_ref());
                }
                None => {
                    self.exhausted = true;
                    self.finish();
                }
            }
        }
    }
}
