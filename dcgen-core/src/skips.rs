// Skip-path enumeration and validation. Configured paths are checked
// against the set of selectors a target's type graph can actually
// produce, so a misspelled path fails the run instead of silently doing
// nothing.

use crate::config::Config;
use crate::error::{Error, Result};
use dcgen_model::{Model, TypeId, TypeKind};
use std::collections::BTreeSet;

/// Join a root-relative path with a field selector.
pub(crate) fn join_path(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{rel}.{name}")
    }
}

/// Check every configured skip path against its target's selector set.
pub fn validate_skip_lists(model: &Model, targets: &[TypeId], config: &Config) -> Result<()> {
    for (i, &target) in targets.iter().enumerate() {
        let skips = config.skip_lists.get(i);
        if skips.is_empty() {
            continue;
        }
        let valid = collect_selectors(model, target, config.max_depth);
        for path in skips.iter() {
            if !valid.contains(path) {
                return Err(Error::UnknownSkipPath {
                    path: path.clone(),
                    target: model.display(target),
                });
            }
        }
    }
    Ok(())
}

/// Every root-relative selector the walker can consult from `root`:
/// field paths, slice-element `[i]`, map-key `[k]` and map-value `[v]`
/// suffixes. Recursion mirrors the walker's depth counter, so bounded
/// runs enumerate exactly the paths reachable before the cutoff. On
/// unbounded runs each named type on the descent path is re-entered
/// once, which covers the paths a skip entry can use to break a cycle
/// that does not pass through a requested target.
pub fn collect_selectors(model: &Model, root: TypeId, max_depth: usize) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut descending = Vec::new();
    collect(model, root, "", 0, max_depth, &mut out, &mut descending);
    out
}

fn collect(
    model: &Model,
    ty: TypeId,
    rel: &str,
    depth: usize,
    max_depth: usize,
    out: &mut BTreeSet<String>,
    descending: &mut Vec<TypeId>,
) {
    if max_depth > 0 && depth >= max_depth {
        return;
    }

    let named = matches!(model.kind(ty), TypeKind::Named { .. });
    if named {
        if max_depth == 0 && descending.iter().filter(|&&t| t == ty).count() >= 2 {
            return;
        }
        descending.push(ty);
    }

    let depth = depth + 1;
    match model.kind(model.underlying(ty)) {
        TypeKind::Struct { fields } => {
            for f in fields {
                let p = join_path(rel, &f.name);
                out.insert(p.clone());
                collect(model, f.ty, &p, depth, max_depth, out, descending);
            }
        }
        TypeKind::Slice { elem } => {
            let p = format!("{rel}[i]");
            out.insert(p.clone());
            collect(model, *elem, &p, depth, max_depth, out, descending);
        }
        TypeKind::Map { key, elem } => {
            let pk = format!("{rel}[k]");
            let pv = format!("{rel}[v]");
            out.insert(pk.clone());
            out.insert(pv.clone());
            collect(model, *key, &pk, depth, max_depth, out, descending);
            collect(model, *elem, &pv, depth, max_depth, out, descending);
        }
        // Pointers are transparent in skip paths but count as a descent,
        // exactly as in the walker.
        TypeKind::Pointer { elem } => collect(model, *elem, rel, depth, max_depth, out, descending),
        TypeKind::Chan { .. } | TypeKind::Basic { .. } | TypeKind::Named { .. } => {}
    }

    if named {
        descending.pop();
    }
}
