use std::path::Path;

use anyhow::Context;
use roadworld_kernel::WorldConfig;
use roadworld_stream::StreamConfig;
use serde::{Deserialize, Serialize};

/// Settings file for a session: one section per subsystem.
///
/// ```json
/// { "world": { "seed": 7 }, "stream": { "radius": 3, "max_resident_cells": 200 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub world: WorldConfig,
    pub stream: StreamConfig,
}

impl SessionConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.world.validate()?;
        self.stream.validate()?;
        Ok(())
    }

    /// Load from `path` if given, then apply the seed override.
    pub fn resolve(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        if let Some(seed) = seed {
            config.world.seed = seed;
        }
        Ok(config)
    }
}
