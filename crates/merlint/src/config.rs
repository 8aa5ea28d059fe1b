use crate::rules::Catalog;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid validate options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Selects the rule catalog and switches individual rules off by name.
///
/// Reads from JSON shaped like `{"strict": true, "disabledRules": ["no-duplicate-node-ids"]}`;
/// every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidateOptions {
    pub strict: bool,
    pub disabled_rules: Vec<String>,
}

impl ValidateOptions {
    /// The strict catalog with every rule enabled.
    pub fn strict() -> Self {
        Self {
            strict: true,
            disabled_rules: Vec::new(),
        }
    }

    pub fn disable(mut self, rule: impl Into<String>) -> Self {
        self.disabled_rules.push(rule.into());
        self
    }

    pub fn is_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|name| name == rule)
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::from_strict(self.strict)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
