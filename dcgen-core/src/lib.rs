// dcgen-core - Deep-copy method synthesis engine
// Walks a type graph and emits Go methods that clone values recursively,
// reusing existing copy operations and bounding recursion by depth.

pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod imports;
pub mod recv;
pub mod reuse;
pub mod skips;
pub mod walker;

pub use config::{Config, SkipLists, SkipSet};
pub use error::{Error, Result};
pub use format::{GofmtFormatter, PassthroughFormatter, SourceFormatter};
pub use generator::Generator;

pub use dcgen_model::{Model, TypeId, UnitId};

/// Generate copy methods for `targets` and run the result through the
/// given formatter.
pub fn generate_source<S: AsRef<str>>(
    model: &Model,
    unit: UnitId,
    targets: &[S],
    config: &Config,
    formatter: &dyn SourceFormatter,
) -> Result<String> {
    Generator::new(model, config.clone()).generate(unit, targets, formatter)
}

/// Generate copy methods without external formatting.
pub fn generate_unformatted<S: AsRef<str>>(
    model: &Model,
    unit: UnitId,
    targets: &[S],
    config: &Config,
) -> Result<String> {
    generate_source(model, unit, targets, config, &PassthroughFormatter)
}
