use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use normstate_types::{MergeConfig, State};
use serde::Deserialize;
use serde_json::Value;

/// Named merge configs, one per `[presets.<name>]` table.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MergePresets {
    #[serde(default)]
    pub presets: BTreeMap<String, MergeConfig>,
}

impl MergePresets {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid presets file")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = read(path)?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn get(&self, name: &str) -> anyhow::Result<&MergeConfig> {
        self.presets
            .get(name)
            .ok_or_else(|| anyhow!("no preset named {name:?}"))
    }
}

/// Load a state file, or start from an empty state.
pub fn load_state(path: Option<&Path>) -> anyhow::Result<State> {
    match path {
        Some(path) => {
            let text = read(path)?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid state file {}", path.display()))
        }
        None => Ok(State::new()),
    }
}

pub fn load_payload(path: &Path) -> anyhow::Result<Value> {
    let text = read(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid payload file {}", path.display()))
}

/// Load a merge config; `.toml` files are read as TOML, anything else as JSON.
pub fn load_config(path: &Path) -> anyhow::Result<MergeConfig> {
    let text = read(path)?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let parsed = if is_toml {
        toml::from_str(&text).map_err(anyhow::Error::from)
    } else {
        serde_json::from_str(&text).map_err(anyhow::Error::from)
    };
    parsed.with_context(|| format!("invalid merge config {}", path.display()))
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
