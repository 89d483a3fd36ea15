//! Which collections a merge touched, once it has been applied.
//!
//! Records are compared as whole lists: a collection whose list differs in
//! any way counts as modified, without a per-record breakdown.

use normstate_types::State;
use serde::Serialize;

/// Changes between two states, sorted by collection name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectionDiff {
    pub changes: Vec<CollectionChange>,
}

impl CollectionDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn additions(&self) -> usize {
        self.count(|c| matches!(c, CollectionChange::Added { .. }))
    }

    pub fn removals(&self) -> usize {
        self.count(|c| matches!(c, CollectionChange::Removed { .. }))
    }

    /// Collections present on both sides whose record lists differ.
    pub fn modifications(&self) -> usize {
        self.count(|c| matches!(c, CollectionChange::Modified { .. }))
    }

    fn count(&self, pred: impl Fn(&CollectionChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(*c)).count()
    }
}

/// Serialized with a `"change"` tag for `--format json` output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum CollectionChange {
    Added { collection: String, len: usize },
    Removed { collection: String, len: usize },
    Modified {
        collection: String,
        old_len: usize,
        new_len: usize,
    },
}

impl CollectionChange {
    pub fn collection(&self) -> &str {
        match self {
            Self::Added { collection, .. }
            | Self::Removed { collection, .. }
            | Self::Modified { collection, .. } => collection,
        }
    }
}

/// Compare `old` and `new` collection by collection.
pub fn diff_collections(old: &State, new: &State) -> CollectionDiff {
    let mut changes = Vec::new();

    for (name, old_records) in old.collections() {
        match new.collection(name) {
            Some(new_records) => {
                if old_records.as_slice() != new_records {
                    changes.push(CollectionChange::Modified {
                        collection: name.clone(),
                        old_len: old_records.len(),
                        new_len: new_records.len(),
                    });
                }
            }
            None => changes.push(CollectionChange::Removed {
                collection: name.clone(),
                len: old_records.len(),
            }),
        }
    }

    for (name, new_records) in new.collections() {
        if !old.contains(name) {
            changes.push(CollectionChange::Added {
                collection: name.clone(),
                len: new_records.len(),
            });
        }
    }

    changes.sort_by(|a, b| a.collection().cmp(b.collection()));
    CollectionDiff { changes }
}
