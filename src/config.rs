// Pattern configuration loaded from TOML
//
// Lets the owning application choose active patterns without recompiling.
// Kinds are validated when the engine is built, so a config naming a kind
// without a built-in pattern fails loudly instead of being ignored.

use crate::engine::ConsolidationEngine;
use crate::error::{ConsolidationError, Result};
use crate::operation::OperationKind;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../tracefold-default.toml");

/// Top-level configuration file
///
/// # Example TOML
/// ```toml
/// [consolidation]
/// patterns = ["swap"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracefoldConfig {
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsolidationConfig {
    /// Pattern kinds to activate, in trial order
    #[serde(default)]
    pub patterns: Vec<OperationKind>,
}

impl Default for TracefoldConfig {
    fn default() -> Self {
        Self {
            consolidation: ConsolidationConfig {
                patterns: vec![OperationKind::Swap],
            },
        }
    }
}

impl TracefoldConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid configuration.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConsolidationError::Config(e.to_string()))
    }

    /// Configuration compiled into the binary (`tracefold-default.toml`)
    pub fn embedded_default() -> Result<Self> {
        Self::from_toml_str(DEFAULT_TOML)
    }

    /// Build an engine with every configured pattern active
    ///
    /// # Errors
    /// Returns [`ConsolidationError::UnsupportedPattern`] for the first kind
    /// without a built-in pattern.
    pub fn build_engine(&self) -> Result<ConsolidationEngine> {
        let mut engine = ConsolidationEngine::new();
        for &kind in &self.consolidation.patterns {
            engine.add_pattern(kind)?;
        }
        Ok(engine)
    }
}
