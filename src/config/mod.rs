//! Configuration types and loading for the generator

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{GeneratorConfig, VariantConfig};
