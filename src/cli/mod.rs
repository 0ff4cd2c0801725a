//! CLI module for llama-swap-config
//!
//! This module provides:
//! - Command implementations (init, generate, validate)
//! - Output handlers (console, JSON, quiet)

pub mod commands;
pub mod output;

pub use commands::{generate, init, parse_binary_file, parse_model_dir, validate};
pub use output::{OutputMode, create_handler};
