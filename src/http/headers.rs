use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Well-known header names used by the engine and the routes.
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const CONNECTION: &str = "Connection";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_AGENT: &str = "User-Agent";

/// An ordered collection of HTTP headers.
///
/// Names keep the casing they were inserted with, which is what gets
/// serialized, but every lookup compares names ASCII-case-insensitively.
/// There is at most one entry per name: inserting a name that is already
/// present (in any casing) replaces both the stored casing and the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any existing entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value stored under `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order, with names in
    /// their original casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    /// Same result as inserting each pair in turn, in linear time.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (k, v) in iter {
            let name = k.into();
            let value = v.into();

            match index.entry(name.to_ascii_lowercase()) {
                Entry::Occupied(slot) => entries[*slot.get()] = (name, value),
                Entry::Vacant(slot) => {
                    slot.insert(entries.len());
                    entries.push((name, value));
                }
            }
        }

        Self { entries }
    }
}
