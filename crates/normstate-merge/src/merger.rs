//! The normalizing state merger.
//!
//! A merge takes the current [`State`], a target collection and a batch of
//! incoming records, and produces the [`PartialState`] the caller folds back
//! in with [`State::apply`]. Fields named by the config's normalizer are
//! moved out of the incoming records first, recursively, so one payload can
//! update several collections at once.
//!
//! The previous state is only borrowed. Nothing reachable from it is
//! modified, whatever the `isMutating*` flags say.

use normstate_types::{
    DatumMerge, MergeConfig, MergeStrategy, Method, OutputMode, PartialState, Position, Record,
    State,
};
use serde_json::Value;
use tracing::debug_span;

use crate::error::MergeResult;
use crate::normalize::{extract_field, records_from_value, Extracted};
use crate::observer::{MergeEvent, MergeObserver, ResolvePath, TracingObserver};

/// Merge `incoming` into collection `key`, logging through `tracing`.
///
/// Shorthand for [`StateMerger::new`] followed by [`StateMerger::merge`].
pub fn merge(
    state: &State,
    method: Method,
    key: &str,
    incoming: Vec<Record>,
    config: &MergeConfig,
) -> MergeResult<PartialState> {
    StateMerger::new().merge(state, method, key, incoming, config)
}

/// Runs merges and reports each step to an observer.
#[derive(Debug, Default)]
pub struct StateMerger<O = TracingObserver> {
    observer: O,
}

impl StateMerger<TracingObserver> {
    pub fn new() -> Self {
        Self {
            observer: TracingObserver,
        }
    }
}

impl<O: MergeObserver> StateMerger<O> {
    pub fn with_observer(observer: O) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Normalize `incoming` and merge it into collection `key`.
    ///
    /// The result holds `key` plus every collection a normalizer wrote to.
    pub fn merge(
        &self,
        state: &State,
        method: Method,
        key: &str,
        incoming: Vec<Record>,
        config: &MergeConfig,
    ) -> MergeResult<PartialState> {
        let span = debug_span!("merge", collection = key, method = method.as_str());
        let _enter = span.enter();

        let mut next = PartialState::new();
        self.merge_into(&mut next, state, method, key, incoming, config, 0)?;
        Ok(next)
    }

    /// Merge a raw JSON payload tagged with a method string.
    ///
    /// The payload may be a single object or an array of objects. Unknown
    /// method tags take the default merge path.
    pub fn merge_json(
        &self,
        state: &State,
        method_tag: &str,
        key: &str,
        payload: Value,
        config: &MergeConfig,
    ) -> MergeResult<PartialState> {
        let incoming = records_from_value(payload)?;
        self.merge(state, Method::from_tag_lenient(method_tag), key, incoming, config)
    }

    #[allow(clippy::too_many_arguments)]
    fn merge_into(
        &self,
        next: &mut PartialState,
        state: &State,
        method: Method,
        key: &str,
        mut incoming: Vec<Record>,
        config: &MergeConfig,
        depth: usize,
    ) -> MergeResult<()> {
        if let Some(normalizer) = &config.normalizer {
            for (field, target) in normalizer.iter() {
                let Extracted { children, skipped } = extract_field(&mut incoming, field);
                for kind in skipped {
                    self.observer.observe(&MergeEvent::ChildSkipped {
                        field: field.to_string(),
                        kind,
                        depth,
                    });
                }
                if children.is_empty() {
                    continue;
                }
                self.observer.observe(&MergeEvent::FieldNormalized {
                    field: field.to_string(),
                    collection: target.collection().to_string(),
                    count: children.len(),
                    depth,
                });
                let child_config = config.child(target.child_normalizer());
                self.merge_into(
                    next,
                    state,
                    config.nested_method,
                    target.collection(),
                    children,
                    &child_config,
                    depth + 1,
                )?;
            }
        }

        let (path, records) = self.resolve(state.collection(key), method, key, incoming, config);
        self.observer.observe(&MergeEvent::CollectionResolved {
            collection: key.to_string(),
            path,
            len: records.len(),
            depth,
        });
        next.insert(key, records);
        Ok(())
    }

    fn resolve(
        &self,
        previous: Option<&[Record]>,
        method: Method,
        key: &str,
        incoming: Vec<Record>,
        config: &MergeConfig,
    ) -> (ResolvePath, Vec<Record>) {
        let Some(previous) = previous else {
            return (ResolvePath::Fresh, incoming);
        };
        let legacy = config.output == OutputMode::Legacy;

        if method.is_delete() {
            if legacy {
                return (ResolvePath::Delete, incoming);
            }
            return (ResolvePath::Delete, remove_matching(previous, &incoming));
        }

        match config.strategy() {
            MergeStrategy::AppendNew { position, in_place } => {
                let path = match position {
                    Position::Back => ResolvePath::Append,
                    Position::Front => ResolvePath::Prepend,
                };
                if legacy && in_place {
                    return (path, self.legacy_in_place_add(key, position, previous, incoming));
                }
                let records = match position {
                    Position::Back => previous.iter().cloned().chain(incoming).collect(),
                    Position::Front => incoming.into_iter().chain(previous.iter().cloned()).collect(),
                };
                (path, records)
            }
            MergeStrategy::Replace => (ResolvePath::Replace, incoming),
            MergeStrategy::MergeById { datum, in_place } => {
                if legacy {
                    self.observer.observe(&MergeEvent::LegacyDiscard {
                        collection: key.to_string(),
                        computed_len: previous.len() + count_unmatched(previous, &incoming, in_place),
                        returned_len: incoming.len(),
                    });
                    return (ResolvePath::MergeById, incoming);
                }
                (ResolvePath::MergeById, merge_by_id(previous, incoming, datum, in_place))
            }
        }
    }

    /// Legacy handling of `add` with `isMutatingArray: false`.
    ///
    /// Append falls through to the array paths, which hand back the incoming
    /// batch. Prepend leaves the collection undefined, modelled as empty.
    fn legacy_in_place_add(
        &self,
        key: &str,
        position: Position,
        previous: &[Record],
        incoming: Vec<Record>,
    ) -> Vec<Record> {
        match position {
            Position::Back => {
                self.observer.observe(&MergeEvent::LegacyDiscard {
                    collection: key.to_string(),
                    computed_len: previous.len() + incoming.len(),
                    returned_len: incoming.len(),
                });
                incoming
            }
            Position::Front => {
                self.observer.observe(&MergeEvent::LegacyCleared {
                    collection: key.to_string(),
                });
                Vec::new()
            }
        }
    }
}

/// Place each incoming record at the slot of the record sharing its id, or
/// append it when there is none.
///
/// Without `in_place`, lookups only consult `previous`, so two new records
/// with the same id are both appended. With it, lookups consult the list
/// being built and the second one lands on the first one's slot.
fn merge_by_id(
    previous: &[Record],
    incoming: Vec<Record>,
    datum: DatumMerge,
    in_place: bool,
) -> Vec<Record> {
    let mut resolved = previous.to_vec();
    for record in incoming {
        let lookup = if in_place { resolved.as_slice() } else { previous };
        let Some(index) = lookup.iter().position(|r| r.same_id(&record)) else {
            resolved.push(record);
            continue;
        };
        let merged = match datum {
            DatumMerge::Overwrite => record,
            DatumMerge::ShallowFresh => previous
                .get(index)
                .unwrap_or(&resolved[index])
                .merged_with(&record),
            DatumMerge::ShallowAccumulate => resolved[index].merged_with(&record),
        };
        resolved[index] = merged;
    }
    resolved
}

/// Remove, for each marker, the first previous record sharing its id.
fn remove_matching(previous: &[Record], markers: &[Record]) -> Vec<Record> {
    let mut remaining = previous.to_vec();
    for marker in markers {
        if let Some(index) = remaining.iter().position(|r| r.same_id(marker)) {
            remaining.remove(index);
        }
    }
    remaining
}

/// Number of records [`merge_by_id`] would append.
fn count_unmatched(previous: &[Record], incoming: &[Record], in_place: bool) -> usize {
    let mut added: Vec<&Record> = Vec::new();
    for record in incoming {
        let known = previous.iter().any(|p| p.same_id(record))
            || (in_place && added.iter().any(|a| a.same_id(record)));
        if !known {
            added.push(record);
        }
    }
    added.len()
}
