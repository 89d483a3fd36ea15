//! Foundation types for normstate.
//!
//! normstate folds batches of nested API records into a flat state made of
//! named collections. This crate holds the data model shared by the merger
//! and its front ends.
//!
//! # Key Types
//!
//! - [`Record`] -- An ordered JSON object identified by its `id` field
//! - [`State`] / [`PartialState`] -- Collection name to ordered records
//! - [`Method`] -- HTTP-style verb of the request that produced a batch
//! - [`NormalizerSpec`] -- Which embedded fields move to which collections
//! - [`MergeConfig`] -- Per-call flags, resolved into a [`MergeStrategy`]

pub mod config;
pub mod error;
pub mod method;
pub mod normalizer;
pub mod record;
pub mod state;

pub use config::{AddMode, DatumMerge, MergeConfig, MergeStrategy, OutputMode, Position};
pub use error::TypeError;
pub use method::Method;
pub use normalizer::{NormalizerSpec, NormalizerTarget};
pub use record::{is_truthy, kind_of, Record, ID_FIELD};
pub use state::{PartialState, State};
