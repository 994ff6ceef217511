use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use log::debug;

use crate::error::{EncodeError, EncodeResult};

/// One step from a parent node to a child: a field name inside a record or a
/// position inside a nested sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a leaf inside a top-level record, from the root down.
///
/// The walker uses a single `KeyPath` as a stack while it descends, so
/// pushing and popping must stay balanced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push_field(&mut self, name: impl Into<String>) {
        self.0.push(Segment::Field(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(Segment::Index(index));
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot-joined name used in the header row. The empty path (a top-level
    /// scalar) yields an empty name.
    pub fn column_name(&self) -> String {
        self.0
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.column_name())
        }
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| Segment::Field(s.into())).collect())
    }
}

/// Maps key-paths to column indexes.
///
/// While the first row is being walked every unseen key-path gets the next
/// free index. Once [`ColumnResolver::freeze`] is called the schema never
/// grows or reorders and unknown key-paths are rejected.
#[derive(Debug, Default)]
pub struct ColumnResolver {
    columns: Vec<KeyPath>,
    lookup: HashMap<KeyPath, usize>,
    frozen: bool,
}

impl ColumnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, key_path: &KeyPath) -> EncodeResult<usize> {
        if let Some(&index) = self.lookup.get(key_path) {
            return Ok(index);
        }

        if self.frozen {
            return Err(EncodeError::SchemaMismatch {
                key_path: key_path.to_string(),
                message: format!(
                    "key-path is not part of the {}-column schema established by the first row",
                    self.columns.len()
                ),
            });
        }

        let index = self.columns.len();
        self.columns.push(key_path.clone());
        self.lookup.insert(key_path.clone(), index);
        Ok(index)
    }

    pub fn freeze(&mut self) {
        if !self.frozen {
            debug!("Schema frozen with {} column(s)", self.columns.len());
            self.frozen = true;
        }
    }

    /// First header name produced by two different key-paths, e.g. a field
    /// literally named `a.b` next to field `b` of record `a`.
    pub fn duplicate_column_name(&self) -> Option<String> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(KeyPath::column_name)
            .find(|name| !seen.insert(name.clone()))
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The ordered schema, in column order.
    pub fn schema(&self) -> &[KeyPath] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(KeyPath::column_name).collect()
    }
}
