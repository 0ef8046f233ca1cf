// dcgen-model - Compilation-unit and type model for the dcgen generator
// Arena-backed type graph with a closed structural-shape sum

pub mod schema;
pub mod syntax;

pub use schema::{load_model, load_model_from_str, ModelSpec, SchemaError};
pub use syntax::{FuncDecl, Receiver, SourceFile};

use std::collections::HashMap;

/// Handle into the model's type arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

/// Handle to a compilation unit (a Go package in the emitted code's terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(u32);

/// A compilation unit: mutually visible declarations plus the source files
/// scanned for receiver names.
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: String,
    pub path: String,
    pub files: Vec<SourceFile>,
}

/// A struct field, in declaration order within its parent.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
    pub exported: bool,
}

/// A method on a named type. Only the parts of the signature the reuse
/// detector inspects are modeled.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub param_count: usize,
    pub results: Vec<TypeId>,
    pub recv: TypeId,
}

/// Structural shape of a type. Closed sum; every traversal dispatches by
/// exhaustive matching on this.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Basic {
        name: String,
    },
    Struct {
        fields: Vec<Field>,
    },
    Slice {
        elem: TypeId,
    },
    Map {
        key: TypeId,
        elem: TypeId,
    },
    Pointer {
        elem: TypeId,
    },
    Chan {
        elem: TypeId,
    },
    /// A declared name. `underlying` is `None` between `declare` and
    /// `define`, which is what makes cyclic graphs expressible.
    Named {
        name: String,
        unit: UnitId,
        underlying: Option<TypeId>,
        methods: Vec<Method>,
    },
}

/// The whole type graph for one generation batch.
#[derive(Debug, Default)]
pub struct Model {
    units: Vec<Unit>,
    types: Vec<TypeKind>,
    basics: HashMap<String, TypeId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, name: &str, path: &str) -> UnitId {
        self.units.push(Unit {
            name: name.to_string(),
            path: path.to_string(),
            files: Vec::new(),
        });
        UnitId(self.units.len() as u32 - 1)
    }

    pub fn add_file(&mut self, unit: UnitId, file: SourceFile) {
        self.units[unit.0 as usize].files.push(file);
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0 as usize]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        self.types.push(kind);
        TypeId(self.types.len() as u32 - 1)
    }

    /// Basic types are interned by name so identity is id equality.
    pub fn basic(&mut self, name: &str) -> TypeId {
        if let Some(&id) = self.basics.get(name) {
            return id;
        }
        let id = self.push(TypeKind::Basic {
            name: name.to_string(),
        });
        self.basics.insert(name.to_string(), id);
        id
    }

    pub fn slice_of(&mut self, elem: TypeId) -> TypeId {
        self.push(TypeKind::Slice { elem })
    }

    pub fn map_of(&mut self, key: TypeId, elem: TypeId) -> TypeId {
        self.push(TypeKind::Map { key, elem })
    }

    pub fn pointer_to(&mut self, elem: TypeId) -> TypeId {
        self.push(TypeKind::Pointer { elem })
    }

    pub fn chan_of(&mut self, elem: TypeId) -> TypeId {
        self.push(TypeKind::Chan { elem })
    }

    pub fn struct_of(&mut self, fields: Vec<Field>) -> TypeId {
        self.push(TypeKind::Struct { fields })
    }

    /// Declare a named type without defining it yet. Mutually recursive
    /// types declare everything first, then define.
    pub fn declare(&mut self, unit: UnitId, name: &str) -> TypeId {
        self.push(TypeKind::Named {
            name: name.to_string(),
            unit,
            underlying: None,
            methods: Vec::new(),
        })
    }

    /// Attach the underlying type to a previously declared name.
    pub fn define(&mut self, named: TypeId, underlying: TypeId) {
        match &mut self.types[named.0 as usize] {
            TypeKind::Named {
                underlying: slot, ..
            } => *slot = Some(underlying),
            other => unreachable!("define on non-named type {other:?}"),
        }
    }

    /// Declare and define a named struct in one step.
    pub fn named_struct(&mut self, unit: UnitId, name: &str, fields: Vec<Field>) -> TypeId {
        let id = self.declare(unit, name);
        let under = self.struct_of(fields);
        self.define(id, under);
        id
    }

    /// Add a method to a named type. The receiver type is synthesized from
    /// the owner, pointer-wrapped when `pointer_receiver` is set.
    pub fn add_method(
        &mut self,
        owner: TypeId,
        name: &str,
        pointer_receiver: bool,
        param_count: usize,
        results: Vec<TypeId>,
    ) {
        let recv = if pointer_receiver {
            self.pointer_to(owner)
        } else {
            owner
        };
        match &mut self.types[owner.0 as usize] {
            TypeKind::Named { methods, .. } => methods.push(Method {
                name: name.to_string(),
                param_count,
                results,
                recv,
            }),
            other => unreachable!("add_method on non-named type {other:?}"),
        }
    }

    /// Find a declared type by name within a unit.
    pub fn lookup(&self, unit: UnitId, name: &str) -> Option<TypeId> {
        self.types.iter().enumerate().find_map(|(i, t)| match t {
            TypeKind::Named {
                name: n, unit: u, ..
            } if *u == unit && n == name => Some(TypeId(i as u32)),
            _ => None,
        })
    }

    /// All declared type names in a unit, in declaration order.
    pub fn declared_names(&self, unit: UnitId) -> Vec<String> {
        self.types
            .iter()
            .filter_map(|t| match t {
                TypeKind::Named { name, unit: u, .. } if *u == unit => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Resolve through named wrappers to the structural shape underneath.
    /// An undefined name resolves to itself (no shape, so traversal stops).
    pub fn underlying(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        loop {
            match self.kind(cur) {
                TypeKind::Named {
                    underlying: Some(u),
                    ..
                } => cur = *u,
                _ => return cur,
            }
        }
    }

    /// The method set of a type. Only named types carry methods.
    pub fn methods(&self, id: TypeId) -> &[Method] {
        match self.kind(id) {
            TypeKind::Named { methods, .. } => methods,
            _ => &[],
        }
    }

    /// Name and declaring unit of a named type.
    pub fn named_info(&self, id: TypeId) -> Option<(&str, UnitId)> {
        match self.kind(id) {
            TypeKind::Named { name, unit, .. } => Some((name.as_str(), *unit)),
            _ => None,
        }
    }

    /// Strip at most one pointer indirection, reporting whether one was
    /// stripped.
    pub fn reduce_pointer(&self, id: TypeId) -> (TypeId, bool) {
        match self.kind(id) {
            TypeKind::Pointer { elem } => (*elem, true),
            _ => (id, false),
        }
    }

    /// Structural identity. Named types are interned once by construction,
    /// so two named ids are identical only when they are the same
    /// declaration; composites compare structurally.
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.kind(a), self.kind(b)) {
            (TypeKind::Basic { name: x }, TypeKind::Basic { name: y }) => x == y,
            (TypeKind::Slice { elem: x }, TypeKind::Slice { elem: y })
            | (TypeKind::Pointer { elem: x }, TypeKind::Pointer { elem: y })
            | (TypeKind::Chan { elem: x }, TypeKind::Chan { elem: y }) => self.identical(*x, *y),
            (
                TypeKind::Map { key: xk, elem: xe },
                TypeKind::Map { key: yk, elem: ye },
            ) => self.identical(*xk, *yk) && self.identical(*xe, *ye),
            (TypeKind::Struct { fields: xs }, TypeKind::Struct { fields: ys }) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(f, g)| {
                        f.name == g.name
                            && f.exported == g.exported
                            && self.identical(f.ty, g.ty)
                    })
            }
            (
                TypeKind::Named {
                    name: xn, unit: xu, ..
                },
                TypeKind::Named {
                    name: yn, unit: yu, ..
                },
            ) => xn == yn && xu == yu,
            _ => false,
        }
    }

    /// Plain Go rendering with every foreign name package-qualified.
    /// Diagnostic use only; generated output goes through the import
    /// bookkeeper instead.
    pub fn display(&self, id: TypeId) -> String {
        match self.kind(id) {
            TypeKind::Basic { name } => name.clone(),
            TypeKind::Named { name, unit, .. } => {
                format!("{}.{}", self.unit(*unit).name, name)
            }
            TypeKind::Slice { elem } => format!("[]{}", self.display(*elem)),
            TypeKind::Pointer { elem } => format!("*{}", self.display(*elem)),
            TypeKind::Chan { elem } => format!("chan {}", self.display(*elem)),
            TypeKind::Map { key, elem } => {
                format!("map[{}]{}", self.display(*key), self.display(*elem))
            }
            TypeKind::Struct { fields } => {
                let fs: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{} {}", f.name, self.display(f.ty)))
                    .collect();
                format!("struct{{ {} }}", fs.join("; "))
            }
        }
    }
}

/// Go export rule: an identifier is exported when its first character is
/// uppercase.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Convenience constructor for fields with the export flag derived from
/// the name.
pub fn field(name: &str, ty: TypeId) -> Field {
    Field {
        name: name.to_string(),
        ty,
        exported: is_exported(name),
    }
}
