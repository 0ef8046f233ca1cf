// Generation orchestration: resolve the batch, infer receiver names,
// synthesize one function per target in request order, assemble the
// output unit and hand it to the formatter.

use crate::config::{Config, SkipSet};
use crate::error::{Error, Result};
use crate::format::SourceFormatter;
use crate::{recv, skips};
use dcgen_model::{Model, TypeId, UnitId};
use std::collections::{BTreeMap, HashMap};

/// A single generation run. All accumulating state (import table,
/// synthesized bodies) lives here and is threaded through the recursive
/// walk; nothing is global and nothing survives the run.
pub struct Generator<'m> {
    pub(crate) model: &'m Model,
    pub(crate) config: Config,
    pub(crate) invocation: String,
    pub(crate) imports: BTreeMap<String, String>,
    pub(crate) fns: Vec<String>,
    pub(crate) receiver_names: HashMap<String, String>,
    pub(crate) current_target: String,
}

impl<'m> Generator<'m> {
    pub fn new(model: &'m Model, config: Config) -> Self {
        Self {
            model,
            config,
            invocation: "dcgen".to_string(),
            imports: BTreeMap::new(),
            fns: Vec::new(),
            receiver_names: HashMap::new(),
            current_target: String::new(),
        }
    }

    /// Record the command line for the generated-file header.
    pub fn with_invocation(mut self, invocation: &str) -> Self {
        self.invocation = invocation.to_string();
        self
    }

    /// Run the batch. Fail-fast: any error aborts the whole run with no
    /// partial output.
    pub fn generate<S: AsRef<str>>(
        mut self,
        unit: UnitId,
        targets: &[S],
        formatter: &dyn SourceFormatter,
    ) -> Result<String> {
        // Resolve every target up front; the full batch is the
        // generating set, so mutual reuse is order-independent.
        let mut resolved = Vec::with_capacity(targets.len());
        for t in targets {
            let name = t.as_ref();
            let id = self
                .model
                .lookup(unit, name)
                .ok_or_else(|| self.not_found(unit, name))?;
            resolved.push(id);
        }

        skips::validate_skip_lists(self.model, &resolved, &self.config)?;

        self.receiver_names = recv::receiver_names(self.model, unit)?;
        log::debug!("receiver names: {:?}", self.receiver_names);

        for (i, &target) in resolved.iter().enumerate() {
            let skip_set = self.config.skip_lists.get(i);
            let body = self.generate_fn(unit, target, &skip_set, &resolved);
            self.fns.push(body);
        }

        let text = self.assemble(unit);
        formatter.format(&text).map_err(|reason| Error::InvalidOutput {
            reason,
            source_text: text,
        })
    }

    fn not_found(&self, unit: UnitId, name: &str) -> Error {
        let candidates = self.model.declared_names(unit);
        let hint = candidates
            .iter()
            .map(|c| (c, strsim::jaro_winkler(name, c)))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, _)| format!("; did you mean {c:?}?"))
            .unwrap_or_default();
        Error::NotFound {
            name: name.to_string(),
            unit: self.model.unit(unit).name.clone(),
            hint,
        }
    }

    /// Synthesize one method. The shallow whole-value copy comes first;
    /// the walk emits only the deep-copy fixups after it.
    fn generate_fn(
        &mut self,
        unit: UnitId,
        target: TypeId,
        skip_set: &SkipSet,
        generating: &[TypeId],
    ) -> String {
        let name = match self.model.named_info(target) {
            Some((n, _)) => n.to_string(),
            None => self.model.display(target),
        };
        self.current_target = name.clone();

        let ptr = if self.config.pointer_receiver { "*" } else { "" };
        let method = self.config.method_name.clone();
        let source = self
            .receiver_names
            .get(&name)
            .cloned()
            .unwrap_or_else(|| "o".to_string());
        log::debug!("receiver name for {name} is {source}");

        let mut buf = String::new();
        buf.push_str(&format!("// {method} generates a deep copy of {ptr}{name}\n"));
        buf.push_str(&format!(
            "func ({source} {ptr}{name}) {method}() {ptr}{name} {{\n"
        ));
        buf.push_str(&format!("var cp {name} = {ptr}{source}\n"));

        self.walk_type(&source, "cp", "", unit, target, &mut buf, skip_set, generating, 0);

        if self.config.pointer_receiver {
            buf.push_str("return &cp\n}");
        } else {
            buf.push_str("return cp\n}");
        }
        buf
    }

    /// Concatenate the header, import block and function bodies.
    fn assemble(&self, unit: UnitId) -> String {
        let mut file = String::new();
        file.push_str(&format!(
            "// Code generated by {}; DO NOT EDIT.\n\npackage {}\n\n",
            self.invocation,
            self.model.unit(unit).name
        ));

        if !self.imports.is_empty() {
            file.push_str("import (\n");
            for (alias, path) in &self.imports {
                if path.ends_with(alias) {
                    file.push_str(&format!("\"{path}\"\n"));
                } else {
                    file.push_str(&format!("{alias} \"{path}\"\n"));
                }
            }
            file.push_str(")\n");
        }

        for body in &self.fns {
            file.push_str(body);
            file.push_str("\n\n");
        }
        file
    }
}
