// The formatter seam. Pretty-printing and validating the emitted text is
// an external collaborator's job; the engine only needs something that
// either returns canonical text or rejects the input with a diagnostic.

use std::io::Write;
use std::process::{Command, Stdio};

/// Canonicalizes generated source text, or rejects it as invalid.
pub trait SourceFormatter {
    fn format(&self, source: &str) -> std::result::Result<String, String>;
}

/// Pipes the text through `gofmt` (or a compatible program). A non-zero
/// exit rejects the text with the program's stderr as the diagnostic.
pub struct GofmtFormatter {
    program: String,
}

impl GofmtFormatter {
    pub fn new() -> Self {
        Self::with_program("gofmt")
    }

    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for GofmtFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFormatter for GofmtFormatter {
    fn format(&self, source: &str) -> std::result::Result<String, String> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run {}: {e}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| format!("writing to {}: {e}", self.program))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| format!("waiting for {}: {e}", self.program))?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).into_owned());
        }

        String::from_utf8(output.stdout).map_err(|e| format!("non-utf8 formatter output: {e}"))
    }
}

/// Returns the text unchanged, with no validation. Used when embedding
/// the engine and in tests.
pub struct PassthroughFormatter;

impl SourceFormatter for PassthroughFormatter {
    fn format(&self, source: &str) -> std::result::Result<String, String> {
        Ok(source.to_string())
    }
}
