//! Host-tunable settings.

use serde::Deserialize;

use crate::error::{FormatError, Result};
use crate::operations::creation::TemplateParams;
use crate::operations::edit::MergeParams;
use crate::tessellation::TessellationParams;

/// Every tunable parameter of the editor core in one place.
///
/// Missing fields fall back to their defaults, so a host can supply a partial
/// JSON document such as `{"merge": {"epsilon": 0.01}}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub merge: MergeParams,
    pub tessellation: TessellationParams,
    pub template: TemplateParams,
}

impl EditorConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Json`] if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json).map_err(FormatError::from)?)
    }
}
