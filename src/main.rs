//! locustgen CLI entry point.
//!
//! Two commands: `validate-configuration` checks a YAML test configuration
//! and reports valid/invalid; `generate` runs the full pipeline and writes
//! one LocustTest manifest per configured test.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;

use locustgen::config::LoggingConfig;
use locustgen::locust::pipeline;

#[derive(Parser)]
#[command(name = "locustgen")]
#[command(about = "Generate LocustTest custom resources from YAML test configurations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a YAML test configuration
    #[command(name = "validate-configuration")]
    ValidateConfiguration {
        /// Configuration file path
        #[arg(short = 'f', long = "configuration-file")]
        configuration_file: PathBuf,
    },

    /// Generate LocustTest custom resources from a YAML test configuration
    Generate {
        /// Configuration file path
        #[arg(short = 'f', long = "configuration-file")]
        configuration_file: PathBuf,

        /// Output directory for the generated manifests
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    locustgen::config::init_logging(&LoggingConfig::from_env());

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfiguration { configuration_file } => {
            match pipeline::validate(&configuration_file) {
                Ok(_) => println!("{}", "Provided configuration is valid.".green()),
                Err(err) => {
                    eprintln!("{err}");
                    eprintln!("{}", "Provided configuration is invalid.".red());
                    process::exit(1);
                }
            }
        }
        Commands::Generate {
            configuration_file,
            output,
        } => {
            let written = pipeline::generate(&configuration_file, &output).with_context(|| {
                format!(
                    "failed to generate custom resources from {}",
                    configuration_file.display()
                )
            })?;

            for path in &written {
                println!("{} {}", "Generated".green(), path.display());
            }
            println!(
                "{} resource file(s) written to {}",
                written.len(),
                output.display()
            );
        }
    }

    Ok(())
}
