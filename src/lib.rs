//! pwout – pulls structured results out of `pw.x` standard output.
//!
//! The log of a plane-wave DFT run is a long stream of human-readable lines:
//! prose, aligned tables and `label = value unit` results, printed with
//! little regard for consistency. pwout turns an ordered sequence of those
//! lines into a stream of [`value::Record`]s, each a small mapping from a key
//! (the physics term as printed, e.g. `"unit-cell volume"`) to a typed
//! [`value::Value`].
//!
//! ## Modules
//! * [`rule`] – The [`rule::Rule`] variants and the ordered [`rule::RuleRegistry`].
//! * [`scalar`] – `label = value [unit]` lines, including several assignments
//!   per line, the `<` form and the energy summary.
//! * [`phrase`] – Results printed as prose (`the Fermi energy is ...`) and
//!   user supplied regex rules.
//! * [`block`] – Multi-line tables: the stress tensor and the per-atom force
//!   tables with their named contributions.
//! * [`engine`] – The [`engine::Parser`] and its lazy [`engine::Records`] iterator.
//! * [`value`] – Values, records and [`value::flatten`].
//! * [`settings`] – Configuration through the `config` crate.
//!
//! ## Matching
//! Every line is offered to the rules in registry order and the first match
//! wins. Block rules stay active across lines and see each line before the
//! registry does; a line they do not want is scanned normally. Lines that no
//! rule recognizes are skipped, and a malformed number drops only its own
//! entry. Input data never makes parsing fail.
//!
//! ## Flattening
//! Most callers want one mapping rather than a stream. [`value::flatten`]
//! folds the records in order and the last write wins, so a key printed once
//! per SCF iteration ends up holding the final iteration's value.
//!
//! ## Quick Start
//! ```
//! use pwout::engine::Parser;
//! let log = "
//!      bravais-lattice index     =            0
//!      unit-cell volume          =     919.5821 (a.u.)^3
//! ";
//! let parser = Parser::default();
//! let flat = parser.parse_flat(log.lines());
//! assert_eq!(flat["bravais-lattice index"].as_i64(), Some(0));
//! assert_eq!(flat["unit-cell volume"].as_f64(), Some(919.5821));
//! assert_eq!(flat["unit-cell volume units"].as_str(), Some("(a.u.)^3"));
//! ```
//!
//! Reading the log from disk is left to the caller; the `pwout` binary
//! shows one way of doing it.

pub mod block;
pub mod engine;
pub mod error;
pub mod phrase;
pub mod rule;
pub mod scalar;
pub mod settings;
pub mod value;

pub use engine::{Parser, Records};
pub use error::{PwoutError, Result};
pub use rule::{Rule, RuleRegistry};
pub use value::{Record, Value, flatten};
