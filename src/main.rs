mod cli;
mod config;
mod generate;
mod logging;
mod macros;
mod template;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::OutputMode;
use generate::GenerateOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "llama-swap-config")]
#[command(about = "Generate and validate llama-swap proxy configurations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output (for validate: print only errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter generator config
    Init {
        /// Model directory (repeatable)
        #[arg(long = "model", required = true, value_parser = cli::parse_model_dir)]
        models: Vec<PathBuf>,

        /// Path to the llama-server binary
        #[arg(long, value_parser = cli::parse_binary_file)]
        binary: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a proxy config from a generator config
    Generate {
        /// Generator config (defaults to ./config.yaml, then the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit fully expanded commands without a macros section
        #[arg(long)]
        inline_macros: bool,
    },

    /// Validate a proxy config
    Validate {
        /// YAML file to validate
        file: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputMode::Console)]
        format: OutputMode,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(cli.debug, cli.quiet, cli.log_file.as_deref())?;

    let progress_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Console
    };

    let code = match cli.command {
        Commands::Init {
            models,
            binary,
            output,
        } => {
            let handler = cli::create_handler(progress_mode);
            cli::init(&models, &binary, output.as_deref(), &*handler)?
        }

        Commands::Generate {
            config,
            output,
            inline_macros,
        } => {
            let handler = cli::create_handler(progress_mode);
            let options = GenerateOptions { inline_macros };
            cli::generate(config.as_deref(), output.as_deref(), options, &*handler)?
        }

        Commands::Validate { file, format } => {
            let mode = if cli.quiet { OutputMode::Quiet } else { format };
            let handler = cli::create_handler(mode);
            cli::validate(&file, &*handler)
        }
    };

    Ok(ExitCode::from(code))
}
