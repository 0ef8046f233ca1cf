// Declaration-level source syntax, as much of it as receiver-name
// inference needs: function declarations, receiver variables, and the
// generated-file marker comment.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One source file of a compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,

    /// Top-level comment lines, checked against the generated marker.
    #[serde(default)]
    pub comments: Vec<String>,

    #[serde(default)]
    pub funcs: Vec<FuncDecl>,
}

/// A function or method declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
}

/// The receiver clause of a method declaration, with the pointer already
/// stripped: `(f *Foo)` yields `{ type_name: "Foo", var_name: "f" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "var")]
    pub var_name: String,
}

static GENERATED_MARKER: OnceLock<Regex> = OnceLock::new();

fn generated_marker() -> &'static Regex {
    GENERATED_MARKER
        .get_or_init(|| Regex::new(r"^// Code generated .* DO NOT EDIT\.$").expect("static regex"))
}

impl SourceFile {
    /// Whether this file carries the standard generated-code marker.
    /// Generated files are excluded from receiver-name inference.
    pub fn is_generated(&self) -> bool {
        self.comments.iter().any(|c| generated_marker().is_match(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_detection() {
        let gen = SourceFile {
            name: "deep_copy.go".to_string(),
            comments: vec!["// Code generated by dcgen; DO NOT EDIT.".to_string()],
            funcs: vec![],
        };
        assert!(gen.is_generated());

        let hand = SourceFile {
            name: "foo.go".to_string(),
            comments: vec!["// Package pkg does things.".to_string()],
            funcs: vec![],
        };
        assert!(!hand.is_generated());
    }

    #[test]
    fn marker_requires_full_line() {
        let f = SourceFile {
            name: "x.go".to_string(),
            comments: vec!["// Code generated by hand, DO NOT EDIT please".to_string()],
            funcs: vec![],
        };
        assert!(!f.is_generated());
    }
}
