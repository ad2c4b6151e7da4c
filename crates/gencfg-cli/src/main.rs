//! gencfg CLI - Main entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod generate;

#[derive(Parser, Debug)]
#[command(name = "gencfg")]
#[command(version)]
#[command(about = "Generate a configuration file from a YAML template", long_about = None)]
struct Cli {
    /// Template file to expand
    template: PathBuf,

    /// Where to write the result (default: stdout)
    output: Option<PathBuf>,

    /// Project directory exposed as ProjectDir (default: current directory)
    #[arg(short = 'd', long)]
    project_dir: Option<PathBuf>,

    /// Name of a field whose value is never treated as a template
    #[arg(short = 'l', long = "literal", value_name = "NAME")]
    literals: Vec<String>,

    /// Template argument, available as Arguments.NAME
    #[arg(short = 'a', long = "arg", value_name = "NAME=VALUE", value_parser = parse_argument)]
    arguments: Vec<(String, String)>,

    /// Log what is being expanded (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_argument(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "gencfg=debug,gencfg_cli=debug"
    } else {
        "gencfg=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    generate::execute(generate::GenerateArgs {
        template: cli.template,
        output: cli.output,
        project_dir: cli.project_dir,
        literals: cli.literals,
        arguments: cli.arguments,
    })
}
