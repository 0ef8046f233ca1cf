// Receiver-name inference: scan the unit's hand-written methods and
// remember the first receiver variable name seen per type, so generated
// signatures look like the surrounding code.

use crate::error::{Error, Result};
use dcgen_model::{Model, UnitId};
use std::collections::HashMap;

/// Build the type-name to receiver-variable-name table for a unit.
/// Generated files are excluded so prior generator output never feeds
/// back into naming. The first name seen for a type wins.
pub fn receiver_names(model: &Model, unit: UnitId) -> Result<HashMap<String, String>> {
    let u = model.unit(unit);
    if u.files.is_empty() {
        return Err(Error::MissingSyntax {
            unit: u.name.clone(),
        });
    }

    let mut names = HashMap::new();
    for file in &u.files {
        if file.is_generated() {
            continue;
        }
        for decl in &file.funcs {
            if let Some(recv) = &decl.receiver {
                names
                    .entry(recv.type_name.clone())
                    .or_insert_with(|| recv.var_name.clone());
            }
        }
    }
    Ok(names)
}
