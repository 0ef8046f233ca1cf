// The recursive walker: per field, element, key and value, decide
// between emitting an allocation, a reuse call, or a structural descent.
// The walker never fails; the depth cutoff and shapeless types degrade
// to leaving the enclosing shallow copy in place.

use crate::config::SkipSet;
use crate::generator::Generator;
use crate::imports::sel_to_ident;
use crate::reuse;
use crate::skips::join_path;
use dcgen_model::{TypeId, TypeKind, UnitId};

impl Generator<'_> {
    /// Emit the deep-copy fixups for `ty` into `buf`.
    ///
    /// `source` and `sink` are the Go expressions to read from and write
    /// to; `rel` is the root-relative path used for skip-set matching
    /// and diagnostics. `depth` counts structural descents from the
    /// target's root.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn walk_type(
        &mut self,
        source: &str,
        sink: &str,
        rel: &str,
        unit: UnitId,
        ty: TypeId,
        buf: &mut String,
        skip_set: &SkipSet,
        generating: &[TypeId],
        depth: usize,
    ) {
        let initial = depth == 0;
        let max_depth = self.config.max_depth;

        if max_depth > 0 && depth >= max_depth {
            // Everything below stays aliased with the source; the
            // shallow copy from the enclosing frame is the fallback.
            log::warn!(
                "reached max depth {max_depth}: stopping recursion at {}",
                join_path(&self.current_target, rel)
            );
            return;
        }

        let model = self.model;
        let need_exported =
            matches!(model.kind(ty), TypeKind::Named { unit: declared, .. } if *declared != unit);

        if !initial
            && matches!(model.kind(ty), TypeKind::Named { .. })
            && self.reuse_copy_method(source, sink, ty, false, generating, buf)
        {
            return;
        }

        let depth = depth + 1;
        match model.kind(model.underlying(ty)) {
            TypeKind::Struct { fields } => {
                for f in fields {
                    if need_exported && !f.exported {
                        continue;
                    }
                    let frel = join_path(rel, &f.name);
                    if skip_set.contains(&frel) {
                        continue;
                    }
                    let fsource = format!("{source}.{}", f.name);
                    let fsink = format!("{sink}.{}", f.name);
                    self.walk_type(
                        &fsource, &fsink, &frel, unit, f.ty, buf, skip_set, generating, depth,
                    );
                }
            }

            TypeKind::Slice { elem } => {
                let elem = *elem;
                let kind = self.type_string(elem, unit);
                let idx = if depth > 1 {
                    format!("i{depth}")
                } else {
                    "i".to_string()
                };
                let erel = format!("{rel}[i]");

                buf.push_str(&format!(
                    "if {source} != nil {{\n{sink} = make([]{kind}, len({source}))\n"
                ));
                buf.push_str(&format!("copy({sink}, {source})\n"));

                let mut body = String::new();
                if !skip_set.contains(&erel) {
                    let esource = format!("{source}[{idx}]");
                    let esink = format!("{sink}[{idx}]");
                    self.walk_type(
                        &esource, &esink, &erel, unit, elem, &mut body, skip_set, generating,
                        depth,
                    );
                }
                if !body.is_empty() {
                    buf.push_str(&format!("for {idx} := range {source} {{\n"));
                    buf.push_str(&body);
                    buf.push_str("}\n");
                }
                buf.push_str("}\n");
            }

            TypeKind::Pointer { elem } => {
                let elem = *elem;
                buf.push_str(&format!("if {source} != nil {{\n"));

                let reused = !initial
                    && matches!(model.kind(elem), TypeKind::Named { .. })
                    && self.reuse_copy_method(source, sink, elem, true, generating, buf);
                if !reused {
                    let kind = self.type_string(elem, unit);
                    buf.push_str(&format!("{sink} = new({kind})\n*{sink} = *{source}\n"));
                    self.walk_type(
                        source, sink, rel, unit, elem, buf, skip_set, generating, depth,
                    );
                }

                buf.push_str("}\n");
            }

            TypeKind::Chan { elem } => {
                // A fresh channel of equal capacity; buffered contents
                // are not transferred.
                let kind = self.type_string(*elem, unit);
                buf.push_str(&format!(
                    "if {source} != nil {{\n{sink} = make(chan {kind}, cap({source}))\n}}\n"
                ));
            }

            TypeKind::Map { key, elem } => {
                let (key, elem) = (*key, *elem);
                let kkind = self.type_string(key, unit);
                let vkind = self.type_string(elem, unit);
                let (kvar, vvar) = if depth > 1 {
                    (format!("k{depth}"), format!("v{depth}"))
                } else {
                    ("k".to_string(), "v".to_string())
                };
                let krel = format!("{rel}[k]");
                let vrel = format!("{rel}[v]");

                buf.push_str(&format!(
                    "if {source} != nil {{\n{sink} = make(map[{kkind}]{vkind}, len({source}))\n"
                ));
                buf.push_str(&format!("for {kvar}, {vvar} := range {source} {{\n"));

                // Key and value skips are independent; deep copies go
                // through temporaries derived from the sink path.
                let mut ksink = kvar.clone();
                let mut vsink = vvar.clone();

                if !skip_set.contains(&krel) {
                    let copy_sink = format!("{}_{kvar}", sel_to_ident(sink));
                    let mut body = String::new();
                    self.walk_type(
                        &kvar, &copy_sink, &krel, unit, key, &mut body, skip_set, generating,
                        depth,
                    );
                    if !body.is_empty() {
                        ksink = copy_sink;
                        buf.push_str(&format!("var {ksink} {kkind}\n"));
                        buf.push_str(&body);
                    }
                }

                if !skip_set.contains(&vrel) {
                    let copy_sink = format!("{}_{vvar}", sel_to_ident(sink));
                    let mut body = String::new();
                    self.walk_type(
                        &vvar, &copy_sink, &vrel, unit, elem, &mut body, skip_set, generating,
                        depth,
                    );
                    if !body.is_empty() {
                        vsink = copy_sink;
                        buf.push_str(&format!("var {vsink} {vkind}\n"));
                        buf.push_str(&body);
                    }
                }

                buf.push_str(&format!("{sink}[{ksink}] = {vsink}\n"));
                buf.push_str("}\n}\n");
            }

            // Basic types, channels of nothing further, undefined names:
            // the whole-value shallow copy already covers them.
            TypeKind::Basic { .. } | TypeKind::Named { .. } => {}
        }
    }

    /// Emit a call to an existing (or scheduled) copy operation, adapting
    /// the result shape to the sink. Returns whether a call was emitted.
    pub(crate) fn reuse_copy_method(
        &mut self,
        source: &str,
        sink: &str,
        ty: TypeId,
        pointer_wanted: bool,
        generating: &[TypeId],
        buf: &mut String,
    ) -> bool {
        let found = match reuse::detect(
            self.model,
            ty,
            generating,
            &self.config.method_name,
            self.config.pointer_receiver,
        ) {
            Some(found) => found,
            None => return false,
        };

        let method = &self.config.method_name;
        if pointer_wanted == found.result_is_pointer {
            buf.push_str(&format!("{sink} = {source}.{method}()\n"));
        } else if pointer_wanted {
            buf.push_str(&format!("retV := {source}.{method}()\n{sink} = &retV\n"));
        } else {
            buf.push_str(&format!(
                "{{\nretV := {source}.{method}()\n{sink} = *retV\n}}\n"
            ));
        }
        true
    }
}
