// Import and identifier bookkeeping: Go type rendering with cross-unit
// qualification, alias collision handling, and sink-derived temporary
// identifiers.

use crate::generator::Generator;
use dcgen_model::{TypeId, TypeKind, UnitId};
use regex::Regex;
use std::sync::OnceLock;

static SANITIZER: OnceLock<Regex> = OnceLock::new();

fn sanitizer() -> &'static Regex {
    SANITIZER.get_or_init(|| Regex::new(r"\W").expect("static regex"))
}

/// Rewrite a unit path into a collision-free identifier, replacing every
/// non-identifier character with an underscore.
pub(crate) fn sanitize_path(path: &str) -> String {
    sanitizer().replace_all(path, "_").into_owned()
}

/// Derive an identifier base from a sink path: `cp.Index[i]` becomes
/// `cp_Index_i`. Distinct selector names keep sibling temporaries apart.
pub(crate) fn sel_to_ident(sel: &str) -> String {
    sel.replace(']', "")
        .chars()
        .map(|c| match c {
            '[' | '.' => '_',
            c => c,
        })
        .collect()
}

impl Generator<'_> {
    /// Render a type as Go source relative to the context unit, recording
    /// imports for every foreign named type referenced.
    pub(crate) fn type_string(&mut self, ty: TypeId, unit: UnitId) -> String {
        let model = self.model;
        match model.kind(ty) {
            TypeKind::Basic { name } => name.clone(),
            TypeKind::Named {
                name, unit: declared, ..
            } => {
                if *declared == unit {
                    name.clone()
                } else {
                    let alias = self.qualify(*declared);
                    format!("{alias}.{name}")
                }
            }
            TypeKind::Pointer { elem } => format!("*{}", self.type_string(*elem, unit)),
            TypeKind::Slice { elem } => format!("[]{}", self.type_string(*elem, unit)),
            TypeKind::Chan { elem } => format!("chan {}", self.type_string(*elem, unit)),
            TypeKind::Map { key, elem } => {
                let k = self.type_string(*key, unit);
                let v = self.type_string(*elem, unit);
                format!("map[{k}]{v}")
            }
            TypeKind::Struct { fields } => {
                let mut parts = Vec::with_capacity(fields.len());
                for f in fields {
                    parts.push(format!("{} {}", f.name, self.type_string(f.ty, unit)));
                }
                format!("struct{{ {} }}", parts.join("; "))
            }
        }
    }

    /// Register an import for a foreign unit and return its alias.
    /// When the unit's name is already bound to a different path, the
    /// alias is rewritten to the sanitized full path, so each alias maps
    /// to exactly one path per run.
    fn qualify(&mut self, declared: UnitId) -> String {
        let u = self.model.unit(declared);
        let mut alias = u.name.clone();
        if let Some(existing) = self.imports.get(&alias) {
            if existing != &u.path {
                alias = sanitize_path(&u.path);
            }
        }
        self.imports.insert(alias.clone(), u.path.clone());
        alias
    }
}
