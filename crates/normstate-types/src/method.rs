use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// HTTP-style verb of the request that produced an incoming batch.
///
/// Only [`Method::Delete`] takes a distinct path through the merger; the
/// other verbs share the default merge path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Parse a method tag, treating anything unrecognized as [`Method::Get`].
    ///
    /// Tags are matched exactly, so `"delete"` is not DELETE. Unknown tags
    /// land on the default merge path, same as GET.
    pub fn from_tag_lenient(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    pub fn is_delete(self) -> bool {
        matches!(self, Self::Delete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for Method {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(TypeError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
