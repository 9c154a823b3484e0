//! Writing a generated SDK to disk.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::CodegenError;

/// Files whose presence marks a directory as a generated SDK.
pub const SDK_MARKERS: [&str; 2] = ["nsdk.json", "central.ts"];

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CodegenError + '_ {
    move |source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Make sure `output` can be written to, removing a previous SDK there when
/// `remove_old` is set.
pub fn prepare_output_dir(output: &Path, remove_old: bool) -> Result<(), CodegenError> {
    if output.exists() {
        if !remove_old {
            return Err(CodegenError::OutputExists(output.to_path_buf()));
        }
        if !SDK_MARKERS.iter().all(|marker| output.join(marker).is_file()) {
            return Err(CodegenError::NotAnSdkOutput(output.to_path_buf()));
        }
        debug!("Removing previous SDK at {}", output.display());
        fs::remove_dir_all(output).map_err(io_error(output))?;
    }

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        return Err(CodegenError::MissingOutputParent(parent.to_path_buf()));
    }

    fs::create_dir(output).map_err(io_error(output))
}

/// Write `files` (relative path -> content) below `output`.
pub fn write_files(output: &Path, files: &IndexMap<String, String>) -> Result<(), CodegenError> {
    for (relative, content) in files {
        let path = output.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        debug!("Writing {}", path.display());
        fs::write(&path, content).map_err(io_error(&path))?;
    }
    Ok(())
}
