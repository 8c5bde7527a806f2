//! Proto Service Generator CLI
//!
//! Command-line interface for extracting gRPC service descriptors from a
//! directory of `.proto` files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use proto_service_generator_common::{GenerationSettings, ServiceDescriptor};
use proto_service_generator_generator::{JsonEmitter, ServiceGenerator};
use proto_service_generator_parser::SearchPathLoader;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proto-service-generator")]
#[command(version, about = "Extract gRPC service descriptors from .proto files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a proto directory and display the extracted services
    #[command(after_help = "EXAMPLES:\n  \
        # Show services declared under src/main/proto\n  \
        proto-service-generator parse --proto-dir src/main/proto\n\n  \
        # Resolve imports from extra include directories and print JSON\n  \
        proto-service-generator parse --proto-dir proto -I vendor/proto --json")]
    Parse {
        /// Directory holding the top-level proto files
        #[arg(short, long)]
        proto_dir: PathBuf,

        /// Include directory searched for imports (repeatable)
        #[arg(short = 'I', long = "include")]
        include_dirs: Vec<PathBuf>,

        /// Print the descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract services and write them to the output directory
    #[command(after_help = "EXAMPLES:\n  \
        # Generate from flags\n  \
        proto-service-generator generate \\\n    \
        --proto-dir src/main/proto \\\n    \
        --out-dir build/generated\n\n  \
        # Generate from a settings file, overriding the output directory\n  \
        proto-service-generator generate \\\n    \
        --config settings.yaml \\\n    \
        --out-dir build/other")]
    Generate {
        /// Settings file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the top-level proto files
        #[arg(short, long)]
        proto_dir: Option<PathBuf>,

        /// Directory the generated output is written to
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Include directory searched for imports (repeatable)
        #[arg(short = 'I', long = "include")]
        include_dirs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Parse {
            proto_dir,
            include_dirs,
            json,
        } => {
            parse_command(&proto_dir, include_dirs, json, cli.verbose)?;
        }
        Commands::Generate {
            config,
            proto_dir,
            out_dir,
            include_dirs,
        } => {
            let settings =
                resolve_settings(config.as_deref(), proto_dir, out_dir, include_dirs)?;
            generate_command(&settings, cli.verbose)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Settings from the optional config file, with flags taking precedence
fn resolve_settings(
    config: Option<&Path>,
    proto_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    include_dirs: Vec<PathBuf>,
) -> Result<GenerationSettings> {
    let mut settings = match config {
        Some(path) => GenerationSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => GenerationSettings::default(),
    };

    if let Some(proto_dir) = proto_dir {
        settings.proto_dir = proto_dir;
    }
    if let Some(out_dir) = out_dir {
        settings.out_dir = out_dir;
    }
    if !include_dirs.is_empty() {
        settings.include_dirs = include_dirs;
    }

    debug!("Effective settings: {:?}", settings);
    Ok(settings)
}

fn parse_command(
    proto_dir: &Path,
    include_dirs: Vec<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    if !json {
        println!("{} Parsing proto directory: {}", "→".cyan(), proto_dir.display());
    }

    // Parsing never writes, so the output directory only has to be non-empty
    let settings = GenerationSettings {
        proto_dir: proto_dir.to_path_buf(),
        out_dir: PathBuf::from("."),
        include_dirs,
    };
    let loader = SearchPathLoader::new(&settings.include_dirs);

    let services = ServiceGenerator::new(&settings, &loader)
        .services()
        .context("Failed to extract services")?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&services).context("Failed to serialize services")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("\n{}", "✓ Parse successful!".green().bold());
    print_services(&services, verbose);

    Ok(())
}

fn generate_command(settings: &GenerationSettings, verbose: bool) -> Result<()> {
    println!(
        "{} Generating services from: {}",
        "→".cyan(),
        settings.proto_dir.display()
    );

    if verbose {
        println!("  Output: {}", settings.out_dir.display());
        for include in &settings.include_dirs {
            println!("  Include: {}", include.display());
        }
    }

    let loader = SearchPathLoader::new(&settings.include_dirs);
    let services = ServiceGenerator::new(settings, &loader)
        .generate(&JsonEmitter)
        .context("Failed to generate services")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    print_services(&services, verbose);

    println!("\n{}", "Generated files:".bold());
    println!("  📄 {}", JsonEmitter::output_path(&settings.out_dir).display());

    Ok(())
}

fn print_services(services: &[ServiceDescriptor], verbose: bool) {
    // Each sync service is followed by its async variant
    println!("\n{}", "Services:".bold());
    println!("  Total: {} ({} sync)", services.len(), services.len() / 2);

    for service in services {
        println!("  • {}", service.full_name().cyan());
        if !verbose {
            continue;
        }

        for method in &service.methods {
            let requests: Vec<String> = method.request_types.iter().map(|t| t.to_string()).collect();
            println!(
                "    {}({}) -> {}",
                method.name.yellow(),
                requests.join(", "),
                method.response_type
            );
        }
        for annotation in &service.annotations {
            println!("    @{}({})", annotation.name, annotation.value);
        }
    }
}
