//! The SDK content handed from analysis to generation.

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;
use crate::extractor::TypesExtractorContent;
use crate::modules::SdkModules;

/// Everything the generator needs: controllers per module and the extracted
/// types per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkContent {
    /// Module name -> controller name -> controller.
    pub modules: SdkModules,
    /// File -> type name -> extracted type.
    pub types: TypesExtractorContent,
}

impl SdkContent {
    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String, AnalyzerError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Reload content written by [`SdkContent::to_json`].
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of extracted types across all files.
    pub fn type_count(&self) -> usize {
        self.types.values().map(|types| types.len()).sum()
    }

    /// Number of controllers across all modules.
    pub fn controller_count(&self) -> usize {
        self.modules.values().map(|controllers| controllers.len()).sum()
    }
}
