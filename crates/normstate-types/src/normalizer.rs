//! Normalizer specifications.
//!
//! A normalizer names the fields of incoming records that hold embedded
//! child records, and the top-level collection each field is moved to.
//! Targets can nest, so grandchildren are flattened in the same pass.
//!
//! ```json
//! {
//!   "venue": "venues",
//!   "stocks": { "key": "stocks", "normalizer": { "bookings": "bookings" } }
//! }
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where a normalized field's records go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizerTarget {
    /// Move the records straight into the named collection.
    Collection(String),
    /// Move the records into `key`, normalizing them with `normalizer` first.
    Nested {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        normalizer: Option<NormalizerSpec>,
    },
}

impl NormalizerTarget {
    /// Destination collection name.
    pub fn collection(&self) -> &str {
        match self {
            Self::Collection(name) => name,
            Self::Nested { key, .. } => key,
        }
    }

    /// Normalizer to run on the moved records, if any.
    pub fn child_normalizer(&self) -> Option<&NormalizerSpec> {
        match self {
            Self::Collection(_) => None,
            Self::Nested { normalizer, .. } => normalizer.as_ref(),
        }
    }
}

impl From<&str> for NormalizerTarget {
    fn from(collection: &str) -> Self {
        Self::Collection(collection.to_string())
    }
}

/// Ordered field → target declarations.
///
/// Declaration order is kept: fields are normalized in the order they were
/// declared, and a later field writing the same collection wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizerSpec {
    entries: Vec<(String, NormalizerTarget)>,
}

impl NormalizerSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `field` to be moved into `collection`.
    pub fn field(self, field: impl Into<String>, collection: impl Into<String>) -> Self {
        self.with(field, NormalizerTarget::Collection(collection.into()))
    }

    /// Declare `field` to be moved into `collection` after normalizing it
    /// with `normalizer`.
    pub fn nested(
        self,
        field: impl Into<String>,
        collection: impl Into<String>,
        normalizer: NormalizerSpec,
    ) -> Self {
        self.with(
            field,
            NormalizerTarget::Nested {
                key: collection.into(),
                normalizer: Some(normalizer),
            },
        )
    }

    /// Declare a field, replacing an earlier declaration of the same field
    /// in place.
    pub fn with(mut self, field: impl Into<String>, target: NormalizerTarget) -> Self {
        let field = field.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((field, target)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&NormalizerTarget> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, target)| target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizerTarget)> {
        self.entries.iter().map(|(f, t)| (f.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every collection this spec can write, at any depth, in visit order.
    pub fn collections(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for (_, target) in &self.entries {
            if !out.contains(&target.collection()) {
                out.push(target.collection());
            }
            if let Some(child) = target.child_normalizer() {
                for name in child.collections() {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
            }
        }
        out
    }
}

impl Serialize for NormalizerSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, target) in &self.entries {
            map.serialize_entry(field, target)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NormalizerSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = NormalizerSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to collection names or {key, normalizer} tables")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut spec = NormalizerSpec::new();
                while let Some((field, target)) =
                    access.next_entry::<String, NormalizerTarget>()?
                {
                    spec = spec.with(field, target);
                }
                Ok(spec)
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}
