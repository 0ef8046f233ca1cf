// JSON unit descriptions - the serialized form of a compilation unit fed
// to the generator. Plays the role of the type-resolution side of the
// pipeline: declarations come in as Go type expressions and are lowered
// into the arena model.

use crate::{is_exported, Field, Model, SourceFile, TypeId, UnitId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while lowering a unit description into a model.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing unit description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown unit {0:?} in type expression")]
    UnknownUnit(String),

    #[error("unknown type {name:?} in unit {unit:?}")]
    UnknownType { name: String, unit: String },

    #[error("duplicate declaration of type {0:?}")]
    DuplicateType(String),

    #[error("type {0:?} declares both fields and an underlying expression")]
    ConflictingDefinition(String),

    #[error("cannot parse type expression {expr:?}: {reason}")]
    Parse { expr: String, reason: String },
}

/// Top-level unit description.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    pub unit: UnitDecl,

    /// Units referenced across the boundary; their exported declarations
    /// may appear qualified in type expressions.
    #[serde(default)]
    pub foreign_units: Vec<UnitDecl>,

    #[serde(default)]
    pub types: Vec<TypeDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    /// Declaration-level syntax for receiver-name inference.
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitDecl {
    pub name: String,
    pub path: String,
}

/// A named type declaration. Structs list `fields`; other named types
/// (`type Tags []string`) give `underlying`; neither makes the name opaque
/// (resolvable, but with no shape to recurse into).
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    pub name: String,

    /// Declaring unit; defaults to the context unit.
    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub fields: Option<Vec<FieldDecl>>,

    #[serde(default)]
    pub underlying: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    /// Defaults to the Go capitalization rule.
    #[serde(default)]
    pub exported: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    /// Owner type, `Name` in the context unit or `pkg.Name`.
    pub on: String,
    pub name: String,

    #[serde(default)]
    pub pointer_receiver: bool,

    #[serde(default)]
    pub params: usize,

    #[serde(default)]
    pub results: Vec<String>,
}

/// Load a unit description from a JSON file.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<(Model, UnitId), SchemaError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_model_from_str(&text)
}

/// Load a unit description from JSON text.
pub fn load_model_from_str(text: &str) -> Result<(Model, UnitId), SchemaError> {
    let spec: ModelSpec = serde_json::from_str(text)?;
    spec.lower()
}

const GO_BASICS: &[&str] = &[
    "bool", "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "byte", "rune", "float32", "float64", "complex64",
    "complex128", "error", "any",
];

impl ModelSpec {
    /// Lower the description into an arena model. Declarations are
    /// two-phased so mutually recursive types resolve.
    pub fn lower(self) -> Result<(Model, UnitId), SchemaError> {
        let mut model = Model::new();
        let context = model.add_unit(&self.unit.name, &self.unit.path);

        let mut units_by_name: HashMap<String, UnitId> = HashMap::new();
        units_by_name.insert(self.unit.name.clone(), context);
        for u in &self.foreign_units {
            let id = model.add_unit(&u.name, &u.path);
            units_by_name.insert(u.name.clone(), id);
        }

        // Declare pass.
        for decl in &self.types {
            let unit = resolve_unit(&units_by_name, decl.unit.as_deref(), context)?;
            if model.lookup(unit, &decl.name).is_some() {
                return Err(SchemaError::DuplicateType(decl.name.clone()));
            }
            model.declare(unit, &decl.name);
        }

        // Define pass.
        let mut lowerer = Lowerer {
            model: &mut model,
            units_by_name: &units_by_name,
            context,
        };
        for decl in &self.types {
            let unit = resolve_unit(lowerer.units_by_name, decl.unit.as_deref(), context)?;
            let named = lowerer
                .model
                .lookup(unit, &decl.name)
                .ok_or_else(|| SchemaError::UnknownType {
                    name: decl.name.clone(),
                    unit: lowerer.model.unit(unit).name.clone(),
                })?;

            match (&decl.fields, &decl.underlying) {
                (Some(_), Some(_)) => {
                    return Err(SchemaError::ConflictingDefinition(decl.name.clone()))
                }
                (Some(fields), None) => {
                    let mut lowered = Vec::with_capacity(fields.len());
                    for f in fields {
                        let ty = lowerer.parse_type(&f.ty)?;
                        lowered.push(Field {
                            name: f.name.clone(),
                            ty,
                            exported: f.exported.unwrap_or_else(|| is_exported(&f.name)),
                        });
                    }
                    let under = lowerer.model.struct_of(lowered);
                    lowerer.model.define(named, under);
                }
                (None, Some(expr)) => {
                    let under = lowerer.parse_type(expr)?;
                    lowerer.model.define(named, under);
                }
                (None, None) => {} // opaque
            }
        }

        // Methods.
        for m in &self.methods {
            let owner = lowerer.resolve_named(&m.on)?;
            let mut results = Vec::with_capacity(m.results.len());
            for r in &m.results {
                results.push(lowerer.parse_type(r)?);
            }
            lowerer
                .model
                .add_method(owner, &m.name, m.pointer_receiver, m.params, results);
        }

        // Source files.
        for f in self.files {
            model.add_file(context, f);
        }

        Ok((model, context))
    }
}

fn resolve_unit(
    units: &HashMap<String, UnitId>,
    name: Option<&str>,
    context: UnitId,
) -> Result<UnitId, SchemaError> {
    match name {
        None => Ok(context),
        Some(n) => units
            .get(n)
            .copied()
            .ok_or_else(|| SchemaError::UnknownUnit(n.to_string())),
    }
}

struct Lowerer<'a> {
    model: &'a mut Model,
    units_by_name: &'a HashMap<String, UnitId>,
    context: UnitId,
}

impl Lowerer<'_> {
    /// Recursive descent over Go type-expression syntax:
    /// `*T`, `[]T`, `map[K]V`, `chan T`, `Name`, `pkg.Name`, basics.
    fn parse_type(&mut self, expr: &str) -> Result<TypeId, SchemaError> {
        let s = expr.trim();
        if s.is_empty() {
            return Err(parse_err(expr, "empty expression"));
        }

        if let Some(rest) = s.strip_prefix('*') {
            let elem = self.parse_type(rest)?;
            return Ok(self.model.pointer_to(elem));
        }
        if let Some(rest) = s.strip_prefix("[]") {
            let elem = self.parse_type(rest)?;
            return Ok(self.model.slice_of(elem));
        }
        if let Some(rest) = s.strip_prefix("chan ") {
            let elem = self.parse_type(rest)?;
            return Ok(self.model.chan_of(elem));
        }
        if let Some(rest) = s.strip_prefix("map[") {
            let close = matching_bracket(rest)
                .ok_or_else(|| parse_err(expr, "unterminated map key"))?;
            let (key_expr, val_expr) = rest.split_at(close);
            let val_expr = &val_expr[1..]; // skip ']'
            if val_expr.is_empty() {
                return Err(parse_err(expr, "missing map value type"));
            }
            let key = self.parse_type(key_expr)?;
            let elem = self.parse_type(val_expr)?;
            return Ok(self.model.map_of(key, elem));
        }

        self.resolve_named(s)
    }

    /// `Name` in the context unit, `pkg.Name` in a foreign one, or a Go
    /// basic type. Anything else is an unknown-type error.
    fn resolve_named(&mut self, s: &str) -> Result<TypeId, SchemaError> {
        if let Some((pkg, name)) = s.split_once('.') {
            check_ident(s, pkg)?;
            check_ident(s, name)?;
            let unit = self
                .units_by_name
                .get(pkg)
                .copied()
                .ok_or_else(|| SchemaError::UnknownUnit(pkg.to_string()))?;
            return self
                .model
                .lookup(unit, name)
                .ok_or_else(|| SchemaError::UnknownType {
                    name: name.to_string(),
                    unit: pkg.to_string(),
                });
        }

        check_ident(s, s)?;
        if let Some(id) = self.model.lookup(self.context, s) {
            return Ok(id);
        }
        if GO_BASICS.contains(&s) {
            return Ok(self.model.basic(s));
        }
        Err(SchemaError::UnknownType {
            name: s.to_string(),
            unit: self.model.unit(self.context).name.clone(),
        })
    }
}

/// Index of the `]` closing the bracket opened just before `rest`,
/// accounting for nested `map[...]` keys.
fn matching_bracket(rest: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn check_ident(expr: &str, s: &str) -> Result<(), SchemaError> {
    let ok = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(parse_err(expr, "not a valid identifier"))
    }
}

fn parse_err(expr: &str, reason: &str) -> SchemaError {
    SchemaError::Parse {
        expr: expr.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeKind;

    const SAMPLE: &str = r#"{
        "unit": { "name": "pkg", "path": "example.com/pkg" },
        "foreign_units": [ { "name": "other", "path": "example.com/other" } ],
        "types": [
            { "name": "Foo", "fields": [
                { "name": "Name", "type": "string" },
                { "name": "Tags", "type": "[]string" },
                { "name": "Index", "type": "map[string]*Bar" },
                { "name": "Ref", "type": "other.Thing" }
            ]},
            { "name": "Bar", "fields": [ { "name": "N", "type": "int" } ] },
            { "name": "Thing", "unit": "other" }
        ],
        "methods": [
            { "on": "Bar", "name": "DeepCopy", "pointer_receiver": true, "results": ["*Bar"] }
        ],
        "files": [
            { "name": "foo.go", "funcs": [
                { "name": "String", "receiver": { "type": "Foo", "var": "f" } }
            ]}
        ]
    }"#;

    #[test]
    fn lowers_sample_unit() {
        let (model, unit) = load_model_from_str(SAMPLE).unwrap();
        let foo = model.lookup(unit, "Foo").unwrap();
        match model.kind(model.underlying(foo)) {
            TypeKind::Struct { fields } => {
                assert_eq!(fields.len(), 4);
                assert_eq!(fields[1].name, "Tags");
                assert!(matches!(
                    model.kind(fields[1].ty),
                    TypeKind::Slice { .. }
                ));
                assert!(matches!(model.kind(fields[2].ty), TypeKind::Map { .. }));
            }
            other => panic!("unexpected kind: {other:?}"),
        }

        let bar = model.lookup(unit, "Bar").unwrap();
        assert_eq!(model.methods(bar).len(), 1);

        assert_eq!(model.unit(unit).files.len(), 1);
    }

    #[test]
    fn nested_map_keys_parse() {
        let (model, unit) = load_model_from_str(
            r#"{
                "unit": { "name": "pkg", "path": "p" },
                "types": [ { "name": "T", "underlying": "map[string]map[int][]byte" } ]
            }"#,
        )
        .unwrap();
        let t = model.lookup(unit, "T").unwrap();
        match model.kind(model.underlying(t)) {
            TypeKind::Map { elem, .. } => {
                assert!(matches!(model.kind(*elem), TypeKind::Map { .. }));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = load_model_from_str(
            r#"{
                "unit": { "name": "pkg", "path": "p" },
                "types": [ { "name": "T", "fields": [ { "name": "X", "type": "Missng" } ] } ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let err = load_model_from_str(
            r#"{
                "unit": { "name": "pkg", "path": "p" },
                "types": [ { "name": "T" }, { "name": "T" } ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let (model, unit) = load_model(&path).unwrap();
        assert!(model.lookup(unit, "Foo").is_some());
    }
}
