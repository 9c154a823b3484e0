//! `nsdk`: generate a typed TypeScript SDK from a NestJS API.

mod cli;

use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "nsdk",
    version,
    about = "Generate a typed TypeScript SDK from NestJS controllers"
)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze the API and optionally dump the SDK content as JSON
    Analyze(cli::analyze::AnalyzeArgs),
    /// Analyze the API and generate the SDK
    Generate(cli::generate::GenerateArgs),
}

fn run(args: impl IntoIterator<Item = String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Analyze(args)) => cli::analyze::run(args, cli.verbose),
            Some(Commands::Generate(args)) => cli::generate::run(args, cli.verbose),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn main() {
    std::process::exit(run(std::env::args()));
}
