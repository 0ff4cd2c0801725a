//! Macro expansion errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    /// A resolution path revisited a name already on that path
    #[error("Circular macro reference detected: {}", .chain.join(" -> "))]
    CircularReference {
        /// The name that was revisited
        name: String,
        /// Resolution path from the root name to the revisit, inclusive
        chain: Vec<String>,
    },
}

impl MacroError {
    pub fn circular(name: impl Into<String>, path: &[String]) -> Self {
        let name = name.into();
        let mut chain = path.to_vec();
        chain.push(name.clone());
        Self::CircularReference { name, chain }
    }

    /// The macro name the error is about
    pub fn name(&self) -> &str {
        match self {
            Self::CircularReference { name, .. } => name,
        }
    }
}
