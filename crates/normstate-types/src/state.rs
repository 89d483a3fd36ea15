//! Flat, collection-keyed state.
//!
//! A [`State`] maps collection names (`"offers"`, `"venues"`, ...) to ordered
//! record lists. A merge produces a [`PartialState`] holding only the
//! collections it touched; [`State::apply`] folds it back in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Full application state: collection name to ordered records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(BTreeMap<String, Vec<Record>>);

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of a collection, or `None` if the collection is absent.
    pub fn collection(&self, key: &str) -> Option<&[Record]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: impl Into<String>, records: Vec<Record>) -> Option<Vec<Record>> {
        self.0.insert(key.into(), records)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Shallow merge: every collection in `partial` replaces the one here.
    ///
    /// Collections not mentioned in `partial` are left untouched.
    pub fn apply(&mut self, partial: PartialState) {
        for (key, records) in partial {
            self.0.insert(key, records);
        }
    }

    /// Consuming variant of [`State::apply`].
    pub fn with_applied(mut self, partial: PartialState) -> Self {
        self.apply(partial);
        self
    }

    pub fn collections(&self) -> impl Iterator<Item = (&String, &Vec<Record>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<Record>> {
        &self.0
    }
}

impl FromIterator<(String, Vec<Record>)> for State {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Record>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The collections a single merge produced.
///
/// Writing a collection twice keeps the later list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialState(BTreeMap<String, Vec<Record>>);

impl PartialState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[Record]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: impl Into<String>, records: Vec<Record>) -> Option<Vec<Record>> {
        self.0.insert(key.into(), records)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for PartialState {
    type Item = (String, Vec<Record>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
