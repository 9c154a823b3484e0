use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use nsdk_codegen::{GeneratorOptions, write_sdk};

use crate::cli::analyze::run_analysis;
use crate::cli::{format_elapsed_ms, load_config, run_cli};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(value_name = "CONFIG", help = "Path to the nsdk configuration file (.json or .toml)")]
    pub config: PathBuf,
}

pub fn run(args: GenerateArgs, verbose: bool) -> i32 {
    run_cli(|| run_inner(&args, verbose))
}

fn run_inner(args: &GenerateArgs, verbose: bool) -> Result<(), String> {
    let config = load_config(&args.config, verbose)?;
    let analysis = run_analysis(&config)?;

    let start = Instant::now();
    let written = write_sdk(&analysis.content, &GeneratorOptions::from_config(&config))
        .map_err(|err| err.to_string())?;

    println!(
        "{} Generated {written} file(s) in {} ({})",
        style("✓").green(),
        config.sdk_output.display(),
        format_elapsed_ms(start)
    );
    Ok(())
}
