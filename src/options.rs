//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How `{{@if}}` expressions are searched for a comparison operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorDetection {
    /// Operator characters anywhere in the expression, quoted or not,
    /// select the comparison grammar. Matches templates written against
    /// earlier releases bit for bit.
    #[default]
    Legacy,
    /// Operators inside single-quoted literals are ignored.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Upper bound on block expansions per render, nested renders included.
    pub max_passes: usize,
    /// Key a top-level JSON array is stored under by `render_json`.
    pub array_root_key: String,
    pub operator_detection: OperatorDetection,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_passes: 10_000,
            array_root_key: "items".to_string(),
            operator_detection: OperatorDetection::Legacy,
        }
    }
}

impl RenderOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Options)
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_array_root_key(mut self, key: impl Into<String>) -> Self {
        self.array_root_key = key.into();
        self
    }

    pub fn with_operator_detection(mut self, detection: OperatorDetection) -> Self {
        self.operator_detection = detection;
        self
    }
}
