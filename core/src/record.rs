//! Structured records produced by the result mapper.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// A mapped record: either a leaf value or an ordered object of named entries.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Value(Value),
    Object(RecordMap),
}

impl Record {
    /// Returns true if this is a null leaf.
    pub fn is_null(&self) -> bool {
        matches!(self, Record::Value(Value::Null))
    }

    /// Get the leaf value.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Record::Value(v) => Some(v),
            Record::Object(_) => None,
        }
    }

    /// Get the nested object.
    pub fn as_object(&self) -> Option<&RecordMap> {
        match self {
            Record::Object(m) => Some(m),
            Record::Value(_) => None,
        }
    }

    /// Look up a nested entry by key path.
    pub fn get_path(&self, path: &[&str]) -> Option<&Record> {
        let mut node = self;
        for key in path {
            node = node.as_object()?.get(key)?;
        }
        Some(node)
    }
}

impl From<Value> for Record {
    fn from(v: Value) -> Self {
        Record::Value(v)
    }
}

impl From<RecordMap> for Record {
    fn from(m: RecordMap) -> Self {
        Record::Object(m)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Record::Value(v) => v.serialize(serializer),
            Record::Object(m) => m.serialize(serializer),
        }
    }
}

/// Insertion-ordered object; keys follow the order of the selected fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMap {
    entries: Vec<(String, Record)>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get a leaf value by key.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(Record::as_value)
    }

    /// Insert or replace an entry, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, record: Record) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = record,
            None => self.entries.push((key, record)),
        }
    }

    /// Insert `record` at a nested `path`, creating intermediate objects.
    ///
    /// A leaf stored where an object is needed is replaced by an empty object.
    /// An empty path inserts nothing.
    pub fn insert_path<S: AsRef<str>>(&mut self, path: &[S], record: Record) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        let head = head.as_ref();
        if rest.is_empty() {
            self.insert(head, record);
            return;
        }

        let idx = match self.entries.iter().position(|(k, _)| k == head) {
            Some(idx) => idx,
            None => {
                self.entries
                    .push((head.to_string(), Record::Object(RecordMap::new())));
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[idx].1;
        match slot {
            Record::Object(map) => map.insert_path(rest, record),
            Record::Value(_) => {
                let mut map = RecordMap::new();
                map.insert_path(rest, record);
                *slot = Record::Object(map);
            }
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for RecordMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
