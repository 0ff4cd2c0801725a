//! Macro expansion for proxy launch commands
//!
//! A macro is a named text fragment, usually a handful of CLI flags, referenced
//! elsewhere as `${name}`. This module provides:
//! - `expand` / `expand_text`: recursive substitution with cycle detection
//! - flag deduplication: rightmost-wins collapsing of repeated flags
//! - `extract_used`: the subset of a table a set of commands depends on
//! - `NameMap`: legacy `dotted.name` normalization
//!
//! # Example
//!
//! ```ignore
//! let mut table = MacroTable::new();
//! table.insert("first".into(), "--ctx-size 32768".into());
//! table.insert("second".into(), "--ctx-size 65536".into());
//! table.insert("combined".into(), "${first} ${second}".into());
//!
//! assert_eq!(expand("combined", &table)?, "--ctx-size 65536");
//! ```

mod dedup;
mod error;
mod expander;
mod normalize;
pub mod tokens;
mod usage;

use indexmap::IndexMap;

/// Macro name -> raw expression, in declaration order
pub type MacroTable = IndexMap<String, String>;

pub use error::MacroError;
pub use expander::{expand, expand_text};
pub use normalize::NameMap;
pub use usage::extract_used;
