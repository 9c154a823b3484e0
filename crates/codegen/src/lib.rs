//! TypeScript SDK generation from analyzed SDK content.
//!
//! The pipeline is:
//! 1. Build the IR of every output file (`types`, `modules`, `central`)
//! 2. Emit it to strings via the `Emit` trait
//! 3. Write the files below the output directory (`writer`)

pub mod central;
pub mod emit;
pub mod error;
pub mod ir;
pub mod modules;
pub mod types;
pub mod writer;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use nsdk_common::Config;
use nsdk_core::SdkContent;
use tracing::info;

pub use emit::Emit;
pub use error::CodegenError;

/// Name of the serialized SDK content in the output directory.
pub const SDK_JSON_FILE: &str = "nsdk.json";

/// Name of the request dispatcher in the output directory.
pub const CENTRAL_FILE: &str = "central.ts";

/// Inputs of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Output directory.
    pub output: PathBuf,
    /// Script providing the central config.
    pub config_script_path: PathBuf,
    /// Named export of the script; the default export when unset.
    pub config_name_to_import: Option<String>,
    /// Replace an existing SDK at `output`.
    pub remove_old_output_dir: bool,
    /// Pretty-print `nsdk.json`.
    pub pretty_json: bool,
}

impl GeneratorOptions {
    /// Options taken from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            output: config.sdk_output.clone(),
            config_script_path: config.config_script_path.clone(),
            config_name_to_import: config.config_name_to_import.clone(),
            remove_old_output_dir: config.remove_old_output_dir,
            pretty_json: config.json_pretty_output,
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, CodegenError> {
    std::path::absolute(path).map_err(|source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Every file of the SDK, keyed by path relative to the output directory.
pub fn generate_files(
    content: &SdkContent,
    options: &GeneratorOptions,
) -> Result<IndexMap<String, String>, CodegenError> {
    let mut files = IndexMap::new();

    for (file, text) in types::generate_type_files(&content.types) {
        files.insert(format!("{}/{file}", types::TYPES_DIR), text);
    }

    files.extend(modules::generate_sdk_modules(&content.modules)?);

    let specifier = central::config_script_specifier(
        &absolute(&options.output)?,
        &absolute(&options.config_script_path)?,
    )?;
    files.insert(
        CENTRAL_FILE.to_string(),
        central::central_file(&specifier, options.config_name_to_import.as_deref()),
    );

    files.insert(SDK_JSON_FILE.to_string(), content.to_json(options.pretty_json)?);

    Ok(files)
}

/// Generate the SDK and write it to `options.output`.
///
/// Returns the number of files written.
pub fn write_sdk(content: &SdkContent, options: &GeneratorOptions) -> Result<usize, CodegenError> {
    let files = generate_files(content, options)?;

    writer::prepare_output_dir(&options.output, options.remove_old_output_dir)?;
    writer::write_files(&options.output, &files)?;

    info!(
        files = files.len(),
        output = %options.output.display(),
        "SDK generated"
    );
    Ok(files.len())
}
