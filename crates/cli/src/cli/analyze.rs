use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use nsdk_common::Config;
use nsdk_core::{AnalysisOutput, AnalyzerOptions, analyze_project};
use tracing::debug;

use crate::cli::{format_elapsed_ms, load_config, print_warnings, run_cli};

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "CONFIG", help = "Path to the nsdk configuration file (.json or .toml)")]
    pub config: PathBuf,
}

pub fn run(args: AnalyzeArgs, verbose: bool) -> i32 {
    run_cli(|| run_inner(&args, verbose))
}

fn run_inner(args: &AnalyzeArgs, verbose: bool) -> Result<(), String> {
    let config = load_config(&args.config, verbose)?;
    run_analysis(&config)?;
    Ok(())
}

/// Analyze the configured API, writing the JSON dump when `jsonOutput` is set.
pub fn run_analysis(config: &Config) -> Result<AnalysisOutput, String> {
    let start = Instant::now();
    println!("Analyzing {}...", config.api_input_path.display());

    let output =
        analyze_project(&AnalyzerOptions::from_config(config)).map_err(|err| err.to_string())?;

    if let Some(json_output) = &config.json_output {
        let json = output
            .content
            .to_json(config.json_pretty_output)
            .map_err(|err| err.to_string())?;
        fs::write(json_output, json)
            .map_err(|err| format!("Failed to write {}: {err}", json_output.display()))?;
        debug!("SDK content written to {}", json_output.display());
    }

    print_warnings(&output.warnings);
    println!(
        "{} Analyzed {} controller(s) and {} type(s) ({})",
        style("✓").green(),
        output.content.controller_count(),
        output.content.type_count(),
        format_elapsed_ms(start)
    );
    Ok(output)
}
