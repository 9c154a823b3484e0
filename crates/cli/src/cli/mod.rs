pub mod analyze;
pub mod generate;

use std::path::Path;
use std::time::Instant;

use console::style;
use nsdk_common::{Config, init_tracing};

/// Run a command body, printing its error and mapping the outcome to an exit code.
pub fn run_cli<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", style(format!("ERROR: {err}")).red());
            1
        }
    }
}

/// Load and validate the configuration, then install logging.
///
/// `--verbose` wins over a `verbose: false` in the file.
pub fn load_config(path: &Path, verbose: bool) -> Result<Config, String> {
    let config = Config::load_validated(path).map_err(|err| err.to_string())?;
    init_tracing(verbose || config.verbose);
    Ok(config)
}

pub fn format_elapsed_ms(start: Instant) -> String {
    let elapsed = start.elapsed();
    if elapsed.as_secs() == 0 {
        return format!("{}ms", elapsed.as_millis());
    }
    format!("{}s {}ms", elapsed.as_secs(), elapsed.subsec_millis())
}

/// Print a warning summary after a run.
pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!(
        "{}",
        style(format!("{} warning(s) emitted during analysis", warnings.len())).yellow()
    );
}
