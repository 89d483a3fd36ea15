use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::method::Method;
use crate::normalizer::NormalizerSpec;

/// Where new records go when a merge adds instead of matching by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddMode {
    Append,
    Prepend,
}

impl FromStr for AddMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            other => Err(TypeError::UnknownAddMode(other.to_string())),
        }
    }
}

/// Which list a merge hands back for the target collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Historical behavior. DELETE and merge-by-id return the incoming
    /// batch as-is, and prepend without array copy clears the collection.
    #[default]
    Legacy,
    /// Return the list the merge actually computed.
    Resolved,
}

impl FromStr for OutputMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::Legacy),
            "resolved" => Ok(Self::Resolved),
            other => Err(TypeError::UnknownOutputMode(other.to_string())),
        }
    }
}

/// Side of the existing list that added records land on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    Back,
    Front,
}

impl From<AddMode> for Position {
    fn from(mode: AddMode) -> Self {
        match mode {
            AddMode::Append => Self::Back,
            AddMode::Prepend => Self::Front,
        }
    }
}

/// How a matched record is combined with its predecessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatumMerge {
    /// The incoming record replaces the existing one.
    Overwrite,
    /// Incoming fields laid over the record as it was before this merge.
    /// Two incoming records with the same id do not see each other's fields.
    ShallowFresh,
    /// Incoming fields laid over the record as merged so far in this batch.
    ShallowAccumulate,
}

/// Collection-level merge behavior, resolved from a [`MergeConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MergeStrategy {
    /// Drop the existing list and keep the incoming batch.
    Replace,
    /// Concatenate without matching ids.
    ///
    /// `in_place` is set when the config asked not to copy the array; only
    /// legacy output treats that differently.
    AppendNew { position: Position, in_place: bool },
    /// Match incoming records to existing ones by `id`.
    ///
    /// With `in_place`, lookups also see records appended earlier in the
    /// same batch, so a repeated new id lands on one slot.
    MergeById { datum: DatumMerge, in_place: bool },
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::AppendNew { position: Position::Back, .. } => f.write_str("append"),
            Self::AppendNew { position: Position::Front, .. } => f.write_str("prepend"),
            Self::MergeById { datum, in_place } => {
                f.write_str("merge-by-id")?;
                match datum {
                    DatumMerge::Overwrite => {}
                    DatumMerge::ShallowFresh => f.write_str(" (shallow, from previous)")?,
                    DatumMerge::ShallowAccumulate => f.write_str(" (shallow)")?,
                }
                if *in_place {
                    f.write_str(" in place")?;
                }
                Ok(())
            }
        }
    }
}

/// Per-call merge configuration, in the shape the view layer sends it.
///
/// The boolean flags are kept for wire compatibility. Use
/// [`MergeConfig::strategy`] to get the behavior they select.
/// `is_mutating_array` and `is_mutating_datum` never cause the previous state
/// to be mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add: Option<AddMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<NormalizerSpec>,
    pub is_merging_array: bool,
    pub is_mutating_array: bool,
    pub is_merging_datum: bool,
    pub is_mutating_datum: bool,
    pub output: OutputMode,
    /// Method used for the recursive merges of normalized children.
    pub nested_method: Method,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            add: None,
            normalizer: None,
            is_merging_array: true,
            is_mutating_array: true,
            is_merging_datum: false,
            is_mutating_datum: false,
            output: OutputMode::Legacy,
            nested_method: Method::Get,
        }
    }
}

impl MergeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_add(mut self, add: AddMode) -> Self {
        self.add = Some(add);
        self
    }

    pub fn with_normalizer(mut self, normalizer: NormalizerSpec) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn merging_array(mut self, on: bool) -> Self {
        self.is_merging_array = on;
        self
    }

    pub fn mutating_array(mut self, on: bool) -> Self {
        self.is_mutating_array = on;
        self
    }

    pub fn merging_datum(mut self, on: bool) -> Self {
        self.is_merging_datum = on;
        self
    }

    pub fn mutating_datum(mut self, on: bool) -> Self {
        self.is_mutating_datum = on;
        self
    }

    /// Resolve the flag combination into an explicit strategy.
    ///
    /// `add` takes precedence over `is_merging_array`.
    pub fn strategy(&self) -> MergeStrategy {
        if let Some(add) = self.add {
            return MergeStrategy::AppendNew {
                position: add.into(),
                in_place: !self.is_mutating_array,
            };
        }
        if !self.is_merging_array {
            return MergeStrategy::Replace;
        }
        let in_place = !self.is_mutating_array;
        // A fresh base needs both a copied record and a copied array: an
        // in-place array makes the "previous" record the one already merged.
        let datum = match (self.is_merging_datum, self.is_mutating_datum) {
            (false, _) => DatumMerge::Overwrite,
            (true, true) if !in_place => DatumMerge::ShallowFresh,
            (true, _) => DatumMerge::ShallowAccumulate,
        };
        MergeStrategy::MergeById { datum, in_place }
    }

    /// Configuration for merging children moved out by a normalizer.
    ///
    /// Children get default array and datum flags, the parent's output mode,
    /// and the given normalizer for the next level down.
    pub fn child(&self, normalizer: Option<&NormalizerSpec>) -> MergeConfig {
        MergeConfig {
            normalizer: normalizer.cloned(),
            output: self.output,
            nested_method: self.nested_method,
            ..MergeConfig::default()
        }
    }
}
