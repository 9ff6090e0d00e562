// used to hand records over to JSON and other downstream formats
use serde::Serialize;

// record keys are short labels, so a fast non-cryptographic hasher will do
use seahash::SeaHasher;

use std::collections::HashMap;
use std::collections::hash_map::{IntoIter, Iter};
use std::hash::BuildHasherDefault;
// used to print out readable forms of a value
use std::fmt;
use std::ops;

pub type KeyHasher = BuildHasherDefault<SeaHasher>;

/// A single extracted value.
///
/// Integers stay integers: `bravais-lattice index = 0` yields `Int(0)`, while
/// `number of electrons = 8.00` yields `Float(8.0)`. Serialized untagged, so
/// JSON consumers see plain numbers, strings and nested arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    /// Rows of floats, e.g. a 3x3 stress tensor or one `[fx, fy, fz]` row per atom.
    Table(Vec<Vec<f64>>),
    /// Per-atom integer table, e.g. the species index of every atom.
    Indices(Vec<i64>),
}

impl Value {
    /// Numeric view; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_table(&self) -> Option<&[Vec<f64>]> {
        match self {
            Value::Table(rows) => Some(rows),
            _ => None,
        }
    }
    pub fn as_indices(&self) -> Option<&[i64]> {
        match self {
            Value::Indices(indices) => Some(indices),
            _ => None,
        }
    }
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
            Value::Table(_) => "Table",
            Value::Indices(_) => "Indices",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Text(v.to_string()) }
}
impl From<String> for Value {
    fn from(v: String) -> Self { Value::Text(v) }
}
impl From<Vec<Vec<f64>>> for Value {
    fn from(v: Vec<Vec<f64>>) -> Self { Value::Table(v) }
}
impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self { Value::Indices(v) }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Table(rows) => {
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{:?}", row)?;
                }
                write!(f, "]")
            }
            Value::Indices(indices) => write!(f, "{:?}", indices),
        }
    }
}

/// One structured unit of parser output: the entries produced by a single rule match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    entries: HashMap<String, Value, KeyHasher>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }
    /// Builder flavour of [`Record::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.entries.iter()
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
    /// Folds `other` into `self`; keys already present are overwritten.
    pub fn merge(&mut self, other: Record) {
        self.entries.extend(other.entries);
    }
}

impl ops::Index<&str> for Record {
    type Output = Value;
    fn index(&self, key: &str) -> &Value {
        match self.entries.get(key) {
            Some(value) => value,
            None => panic!("no entry for key `{}` in record", key),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        write!(f, "{{")?;
        for (i, key) in keys.into_iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{}: {}", key, self.entries[key])?;
        }
        write!(f, "}}")
    }
}

/// Folds a record stream into one mapping in emission order.
///
/// Last write wins: when two records carry the same key the later value
/// silently replaces the earlier one. Rules avoid this by deriving distinct
/// keys (e.g. `"local contribution to forces"` rather than `"forces"`), but
/// nothing structurally prevents a collision; the final `total energy` of a
/// run replacing those of earlier SCF iterations relies on exactly this.
pub fn flatten<I>(records: I) -> Record
where
    I: IntoIterator<Item = Record>,
{
    let mut flattened = Record::new();
    for record in records {
        flattened.merge(record);
    }
    flattened
}
