//! Pipeline and report configuration.
//!
//! Defaults mirror the static tables in [`crate::columns`]. A YAML file can
//! override any key:
//!
//! ```yaml
//! aliases:
//!   "booking_value": "Booking Value"
//! impute_columns: ["Booking Value"]
//! currency_symbol: "$"
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::columns::{COLUMN_ALIASES, IMPUTED_COLUMNS, NOT_CANCELLED_TOKENS, NUMERIC_COLUMNS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Extra lower-case aliases merged over the built-in alias table.
    pub aliases: BTreeMap<String, String>,
    pub numeric_columns: Vec<String>,
    pub impute_columns: Vec<String>,
    pub cancellation_tokens: Vec<String>,
    pub top_categories: usize,
    pub top_entities: usize,
    pub missing_top: usize,
    pub preview_rows: usize,
    pub currency_symbol: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            numeric_columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            impute_columns: IMPUTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            cancellation_tokens: NOT_CANCELLED_TOKENS.iter().map(|t| t.to_string()).collect(),
            top_categories: 20,
            top_entities: 10,
            missing_top: 10,
            preview_rows: 6,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let mut config: PipelineConfig = serde_yaml::from_str(raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.top_categories == 0 || self.top_entities == 0 || self.missing_top == 0 {
            bail!("top_categories, top_entities and missing_top must be greater than zero");
        }
        self.aliases = std::mem::take(&mut self.aliases)
            .into_iter()
            .map(|(alias, canonical)| (alias.trim().to_lowercase(), canonical.trim().to_string()))
            .collect();
        for token in &mut self.cancellation_tokens {
            *token = token.trim().to_lowercase();
        }
        Ok(())
    }

    /// Built-in aliases followed by configured ones, in application order.
    pub fn alias_table(&self) -> Vec<(String, String)> {
        let mut table: Vec<(String, String)> = COLUMN_ALIASES
            .iter()
            .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
            .collect();
        for (alias, canonical) in &self.aliases {
            if let Some(existing) = table.iter_mut().find(|(a, _)| a == alias) {
                existing.1 = canonical.clone();
            } else {
                table.push((alias.clone(), canonical.clone()));
            }
        }
        table
    }

    pub fn is_not_cancelled_token(&self, normalized: &str) -> bool {
        self.cancellation_tokens.iter().any(|t| t == normalized)
    }
}
