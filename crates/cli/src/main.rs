//! clientgen CLI
//!
//! Command-line interface for generating Swift API clients from an OpenAPI
//! description and a behavior model.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clientgen_common::GeneratorConfig;
use clientgen_generator::ClientGenerator;
use clientgen_parser::{BehaviorModel, OpenApiParser};
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(version, about = "Generate Swift API clients from OpenAPI descriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an API description and display the operations by service
    #[command(after_help = "EXAMPLES:\n  \
        clientgen parse --openapi openapi.json\n  \
        clientgen parse --openapi openapi.json --config clientgen.yaml -v")]
    Parse {
        /// Path to the OpenAPI document
        #[arg(long)]
        openapi: PathBuf,

        /// Generator configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate the Swift client tree
    #[command(after_help = "EXAMPLES:\n  \
        clientgen generate \\\n    \
        --openapi openapi.json \\\n    \
        --behavior behavior-model.json \\\n    \
        --output Sources/Client/Generated")]
    Generate(GenerateArgs),

    /// Fail when the checked-in client tree is out of date
    #[command(after_help = "EXAMPLES:\n  \
        clientgen check \\\n    \
        --openapi openapi.json \\\n    \
        --behavior behavior-model.json \\\n    \
        --output Sources/Client/Generated")]
    Check(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Path to the OpenAPI document
    #[arg(long)]
    openapi: PathBuf,

    /// Path to the behavior model; missing or malformed files use the baseline retry policy
    #[arg(short, long)]
    behavior: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "./Generated")]
    output: PathBuf,

    /// Generator configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Parse { openapi, config } => {
            parse_command(&openapi, config.as_deref(), cli.verbose)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate(args) => {
            generate_command(&args, cli.verbose)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => check_command(&args, cli.verbose),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` applies unless `--verbose` is set
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => {
            println!("{} Loading config: {}", "→".cyan(), path.display());
            GeneratorConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(GeneratorConfig::default()),
    }
}

fn parse_command(openapi: &Path, config: Option<&Path>, verbose: bool) -> Result<()> {
    let config = load_config(config)?;

    println!("{} Parsing API description: {}", "→".cyan(), openapi.display());
    let api = OpenApiParser::from_file(openapi, config)
        .context("Failed to load OpenAPI document")?
        .parse()
        .context("Failed to parse OpenAPI document")?;

    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "API Definition:".bold());
    println!("  Title: {}", api.title.yellow());
    println!("  Version: {}", api.version.yellow());
    println!("  Operations: {}", api.operations.len());
    println!("  Services: {}", api.groups.len());
    println!(
        "  Models: {} entities, {} requests",
        api.models.entities.len(),
        api.models.requests.len()
    );

    println!("\n{}", "Services:".bold());
    for group in &api.groups {
        println!(
            "  • {} ({} operations)",
            group.name.cyan(),
            group.operations.len()
        );
        for op in &group.operations {
            let mut flags = Vec::new();
            if op.is_mutation {
                flags.push("mutation");
            }
            if op.is_paginated_list() {
                flags.push("paginated");
            }
            if op.returns_void {
                flags.push("void");
            }
            println!(
                "    {} {} {} {}",
                op.method_name.yellow(),
                op.http_method.as_str(),
                op.path,
                if flags.is_empty() {
                    String::new()
                } else {
                    format!("[{}]", flags.join(", "))
                }
            );
            if verbose {
                println!("      Operation: {}", op.operation_id);
                println!("      Resource: {}", op.resource_type);
            }
        }
    }

    Ok(())
}

fn build_generator(args: &GenerateArgs, verbose: bool) -> Result<ClientGenerator> {
    let config = load_config(args.config.as_deref())?;

    if verbose {
        println!("  OpenAPI: {}", args.openapi.display());
        match &args.behavior {
            Some(path) => println!("  Behavior: {}", path.display()),
            None => println!("  Behavior: (baseline retry policy)"),
        }
        println!("  Output: {}", args.output.display());
    }

    println!("{} Parsing API description...", "→".cyan());
    let api = OpenApiParser::from_file(&args.openapi, config.clone())
        .context("Failed to load OpenAPI document")?
        .parse()
        .context("Failed to parse OpenAPI document")?;
    println!(
        "{} Parsed {} operations in {} services",
        "✓".green(),
        api.operations.len(),
        api.groups.len()
    );

    let behaviors = match &args.behavior {
        Some(path) => BehaviorModel::from_file(path),
        None => BehaviorModel::default(),
    };
    println!(
        "{} Loaded {} retry policies",
        "✓".green(),
        behaviors.operations.len()
    );

    ClientGenerator::new(api, behaviors, config).context("Failed to create generator")
}

fn generate_command(args: &GenerateArgs, verbose: bool) -> Result<()> {
    let generator = build_generator(args, verbose)?;

    println!("{} Generating client files...", "→".cyan());
    let output = generator
        .write_to(&args.output)
        .context("Failed to generate client")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!(
        "  {} files written to {}",
        output.files.len(),
        args.output.display()
    );
    if verbose {
        println!("\n{}", "Generated files:".bold());
        for path in output.paths() {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

fn check_command(args: &GenerateArgs, verbose: bool) -> Result<ExitCode> {
    let generator = build_generator(args, verbose)?;

    println!("{} Comparing with {}...", "→".cyan(), args.output.display());
    let stale = generator
        .check(&args.output)
        .context("Failed to check generated client")?;

    if stale.is_empty() {
        println!("\n{}", "✓ Generated client is up to date".green().bold());
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "\n{}",
        format!("✗ {} files are out of date:", stale.len()).red().bold()
    );
    for path in &stale {
        println!("  {}", path.display());
    }
    println!("\nRun `clientgen generate` with the same arguments to update them.");

    Ok(ExitCode::FAILURE)
}
