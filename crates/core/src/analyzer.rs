//! Whole-project analysis.

use std::path::PathBuf;

use nsdk_common::{Config, MagicType};
use tracing::{debug, info};

use crate::content::SdkContent;
use crate::diagnostics::Warnings;
use crate::error::AnalyzerError;
use crate::extractor::{
    TypesExtractor, flatten_sdk_resolved_types, flatten_sdk_resolved_types_mut, locate_types_file,
};
use crate::modules::{analyze_controllers, is_controller_file};
use crate::source::SourceProject;

/// Inputs of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Root directory of the API sources.
    pub input: PathBuf,
    /// Configured magic types.
    pub magic_types: Vec<MagicType>,
}

impl AnalyzerOptions {
    /// Options for the sources at `input`, without magic types.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            magic_types: Vec::new(),
        }
    }

    /// Options taken from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            input: config.api_input_path.clone(),
            magic_types: config.magic_types.clone(),
        }
    }
}

/// Result of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutput {
    /// SDK content.
    pub content: SdkContent,
    /// Warnings raised along the way, in order.
    pub warnings: Vec<String>,
}

/// Analyze every controller below `options.input` and extract the types
/// they depend on.
pub fn analyze_project(options: &AnalyzerOptions) -> Result<AnalysisOutput, AnalyzerError> {
    let project = SourceProject::open(&options.input)?;
    let mut warnings = Warnings::new();

    let files = project.list_source_files()?;
    debug!(
        "Found {} source files in {}",
        files.len(),
        options.input.display()
    );

    let controllers: Vec<String> = files.into_iter().filter(|f| is_controller_file(f)).collect();
    if controllers.is_empty() {
        warnings.push(format!(
            "No controller file was found in {}",
            options.input.display()
        ));
    }

    let mut modules = analyze_controllers(&project, &controllers, &mut warnings)?;

    let locations = locate_types_file(flatten_sdk_resolved_types(&modules));
    debug!("Extracting {} root types...", locations.len());

    let mut extractor = TypesExtractor::new(&project, &options.magic_types);
    for location in &locations {
        extractor.extract(location)?;
    }
    for deps in flatten_sdk_resolved_types_mut(&mut modules) {
        extractor.relocate(deps);
    }
    let (types, extractor_warnings) = extractor.into_content();
    warnings.merge(extractor_warnings);

    let content = SdkContent { modules, types };
    info!(
        modules = content.modules.len(),
        controllers = content.controller_count(),
        types = content.type_count(),
        warnings = warnings.len(),
        "Analysis complete"
    );

    Ok(AnalysisOutput {
        content,
        warnings: warnings.into_vec(),
    })
}
