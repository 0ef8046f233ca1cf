// Error taxonomy for a generation run. Every variant here aborts the
// whole batch; the depth cutoff is a logged warning, not an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A requested target type does not exist in the unit. `hint` is
    /// either empty or a "did you mean" suggestion.
    #[error("type {name:?} not found in unit {unit:?}{hint}")]
    NotFound {
        name: String,
        unit: String,
        hint: String,
    },

    /// Receiver-name inference has nothing to scan. Never silently
    /// degraded to an empty table.
    #[error("unit {unit:?} has no source syntax to scan for receiver names")]
    MissingSyntax { unit: String },

    /// A configured skip path matches no selector of its target's type
    /// graph.
    #[error("skip path {path:?} does not match any selector of {target}")]
    UnknownSkipPath { path: String, target: String },

    /// The external formatter rejected the assembled text. The raw text
    /// is carried for debuggability.
    #[error("formatter rejected generated source: {reason}\nsource:\n{source_text}")]
    InvalidOutput {
        reason: String,
        source_text: String,
    },
}
