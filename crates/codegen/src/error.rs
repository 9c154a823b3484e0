//! Generator errors.

use std::path::PathBuf;

use nsdk_core::AnalyzerError;
use thiserror::Error;

/// Failure while generating or writing an SDK.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The output directory exists and replacing it was not requested.
    #[error("Please provide an output directory that doesn't exist yet (found {})", .0.display())]
    OutputExists(PathBuf),

    /// The output directory exists but does not hold a generated SDK.
    #[error(
        "Provided output path {} exists but does not seem to contain an SDK output. Please check the output directory.",
        .0.display()
    )]
    NotAnSdkOutput(PathBuf),

    /// The parent of the output directory is missing.
    #[error("Output directory's parent {} does not exist.", .0.display())]
    MissingOutputParent(PathBuf),

    /// The central config script cannot be imported from the output directory.
    #[error("Cannot import config script {} from output directory {}", .script.display(), .output.display())]
    UnreachableConfigScript {
        /// Configured script.
        script: PathBuf,
        /// Output directory.
        output: PathBuf,
    },

    /// Writing or removing a file failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The SDK content could not be analyzed or serialized.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// A broken invariant of the generator.
    #[error("Internal error: {0}")]
    Internal(String),
}
