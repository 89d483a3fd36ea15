//! Normalizing state merger for normstate.
//!
//! Folds a batch of API records into a flat, collection-keyed [`State`].
//! Embedded child records named by a [`NormalizerSpec`] are moved into their
//! own collections first, at any depth, and every touched collection comes
//! back in one [`PartialState`].
//!
//! # Key Types
//!
//! - [`StateMerger`] / [`merge`] -- Run a merge and report it to an observer
//! - [`MergeObserver`] / [`MergeEvent`] -- Structured record of each merge step
//! - [`CollectionDiff`] / [`CollectionChange`] -- What applying a merge changed
//!
//! [`State`]: normstate_types::State
//! [`PartialState`]: normstate_types::PartialState
//! [`NormalizerSpec`]: normstate_types::NormalizerSpec

pub mod collection_diff;
pub mod error;
pub mod merger;
pub mod normalize;
pub mod observer;

#[cfg(test)]
mod properties;

pub use collection_diff::{diff_collections, CollectionChange, CollectionDiff};
pub use error::{MergeError, MergeResult};
pub use merger::{merge, StateMerger};
pub use normalize::{extract_field, records_from_value, Extracted};
pub use observer::{
    MergeEvent, MergeObserver, NoopObserver, RecordingObserver, ResolvePath, TracingObserver,
};
