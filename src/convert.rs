//! Turning documents into text.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{ExtractionError, Result};

/// A capability that turns the document at a path into text.
///
/// Closures taking a `&Path` are converters too, which keeps statement parsing testable without
/// any external tool installed.
pub trait Converter {
    fn convert(&self, path: &Path) -> Result<String>;
}

impl<F> Converter for F
where
    F: Fn(&Path) -> Result<String>,
{
    fn convert(&self, path: &Path) -> Result<String> {
        self(path)
    }
}

/// Runs poppler's `pdftotext` in layout mode, so that table columns stay aligned.
///
/// Every call spawns a new process and blocks until it exits.
#[derive(Clone, Debug)]
pub struct PdfToText {
    program: OsString,
}

impl Default for PdfToText {
    fn default() -> Self {
        PdfToText {
            program: "pdftotext".into(),
        }
    }
}

impl PdfToText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        PdfToText {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Converter for PdfToText {
    fn convert(&self, path: &Path) -> Result<String> {
        debug!(program = %self.program_name(), path = %path.display(), "converting document");
        let output = Command::new(&self.program)
            .args(&["-enc", "UTF-8", "-layout"])
            .arg(path)
            .arg("-")
            .output()
            .map_err(|source| ExtractionError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(status = %output.status, %stderr, "conversion failed");
            return Err(ExtractionError::Failed {
                program: self.program_name(),
                status: output.status,
                stderr,
            }
            .into());
        }

        Ok(String::from_utf8(output.stdout).map_err(ExtractionError::from)?)
    }
}
