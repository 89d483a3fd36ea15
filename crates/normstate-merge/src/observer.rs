//! Merge observers.
//!
//! The merger reports what it does through a [`MergeObserver`]. The default
//! [`TracingObserver`] turns events into `tracing` records;
//! [`RecordingObserver`] keeps them for inspection in tests.

use std::sync::Mutex;

use tracing::{debug, warn};

/// Which branch of the merge produced a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvePath {
    /// No previous collection; the incoming batch is used verbatim.
    Fresh,
    Delete,
    Append,
    Prepend,
    Replace,
    MergeById,
}

impl ResolvePath {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Delete => "delete",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Replace => "replace",
            Self::MergeById => "merge-by-id",
        }
    }
}

/// Something the merger did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeEvent {
    /// A normalizer field yielded `count` child records for `collection`.
    FieldNormalized {
        field: String,
        collection: String,
        count: usize,
        depth: usize,
    },
    /// A collection's next list was decided.
    CollectionResolved {
        collection: String,
        path: ResolvePath,
        len: usize,
        depth: usize,
    },
    /// Legacy output returned the incoming batch instead of the computed list.
    LegacyDiscard {
        collection: String,
        computed_len: usize,
        returned_len: usize,
    },
    /// Legacy prepend without array copy cleared the collection.
    LegacyCleared { collection: String },
    /// A normalized field held a non-object value, which was dropped.
    ChildSkipped {
        field: String,
        kind: &'static str,
        depth: usize,
    },
}

/// Receives merge events. Implementations must not fail.
pub trait MergeObserver: Send + Sync {
    fn observe(&self, event: &MergeEvent);
}

impl<O: MergeObserver + ?Sized> MergeObserver for &O {
    fn observe(&self, event: &MergeEvent) {
        (**self).observe(event)
    }
}

/// Ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl MergeObserver for NoopObserver {
    fn observe(&self, _event: &MergeEvent) {}
}

/// Emits every event as a `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn observe(&self, event: &MergeEvent) {
        match event {
            MergeEvent::FieldNormalized {
                field,
                collection,
                count,
                depth,
            } => {
                debug!(%field, %collection, count, depth, "normalized field");
            }
            MergeEvent::CollectionResolved {
                collection,
                path,
                len,
                depth,
            } => {
                debug!(%collection, path = path.as_str(), len, depth, "collection resolved");
            }
            MergeEvent::LegacyDiscard {
                collection,
                computed_len,
                returned_len,
            } => {
                debug!(
                    %collection,
                    computed_len,
                    returned_len,
                    "legacy output: returning incoming batch"
                );
            }
            MergeEvent::LegacyCleared { collection } => {
                warn!(%collection, "legacy prepend without array copy cleared the collection");
            }
            MergeEvent::ChildSkipped { field, kind, depth } => {
                warn!(%field, kind, depth, "dropped non-object child");
            }
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<MergeEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<MergeEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl MergeObserver for RecordingObserver {
    fn observe(&self, event: &MergeEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
