//! Capstan CLI - command-line interface to the capstan control plane.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "capstan")]
#[command(version = capstan::VERSION)]
#[command(about = "Cluster-automation control plane", long_about = None)]
struct Args {
    /// Path to the configuration file (defaults to ~/.capstan/capstan.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the control plane and run until ctrl-c
    Run,
    /// Show the effective configuration
    Config,
}

fn main() {
    let args = Args::parse();

    let result = match args.command {
        Command::Run => commands::run::execute(args.config),
        Command::Config => commands::config::execute(args.config),
    };

    if let Err(error) = result {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
