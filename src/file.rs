use std::cell::OnceCell;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::convert::Converter;
use crate::error::Result;

pub const PDF_MIMETYPE: &str = "application/pdf";

/// A document offered for import.
///
/// The text derived from the document is memoized: the first successful [`convert`] runs the
/// converter, later calls return the same text whatever converter they pass. A handle is meant to
/// be used from a single thread.
///
/// [`convert`]: ImportFile::convert
#[derive(Debug)]
pub struct ImportFile {
    path: PathBuf,
    mimetype: OnceCell<String>,
    text: OnceCell<String>,
}

impl ImportFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ImportFile {
            path: path.into(),
            mimetype: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    /// A handle whose MIME type is already known to the caller.
    pub fn with_mimetype(path: impl Into<PathBuf>, mimetype: impl Into<String>) -> Self {
        let file = Self::new(path);
        let _ = file.mimetype.set(mimetype.into());
        file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name as recorded in entry metadata.
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }

    /// MIME type sniffed from the file header, falling back to the extension.
    pub fn mimetype(&self) -> Result<&str> {
        if let Some(mimetype) = self.mimetype.get() {
            return Ok(mimetype);
        }
        let detected = detect_mimetype(&self.path)?;
        trace!(path = %self.path.display(), mimetype = detected, "detected mimetype");
        Ok(self.mimetype.get_or_init(|| detected.to_string()))
    }

    pub fn convert(&self, converter: &dyn Converter) -> Result<&str> {
        if let Some(text) = self.text.get() {
            return Ok(text);
        }
        let text = converter.convert(&self.path)?;
        Ok(self.text.get_or_init(|| text))
    }
}

fn detect_mimetype(path: &Path) -> Result<&'static str> {
    let mut header = [0u8; 5];
    let mut file = File::open(path)?;
    let mut read = 0;
    while read < header.len() {
        match file.read(&mut header[read..])? {
            0 => break,
            n => read += n,
        }
    }
    if &header[..read] == b"%PDF-" {
        return Ok(PDF_MIMETYPE);
    }
    Ok(mimetype_from_extension(path))
}

fn mimetype_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => PDF_MIMETYPE,
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        Some("ofx") | Some("qfx") => "application/x-ofx",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;

    #[test]
    fn sniffs_pdf_header() {
        let mut f = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        let file = ImportFile::new(f.path());
        assert_eq!(file.mimetype().unwrap(), PDF_MIMETYPE);
    }

    #[test]
    fn falls_back_to_extension() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(b"date,amount\n").unwrap();
        let file = ImportFile::new(f.path());
        assert_eq!(file.mimetype().unwrap(), "text/csv");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let file = ImportFile::new("/nonexistent/statement.pdf");
        assert!(file.mimetype().is_err());
    }

    #[test]
    fn explicit_mimetype_skips_detection() {
        let file = ImportFile::with_mimetype("/nonexistent/statement.pdf", "text/plain");
        assert_eq!(file.mimetype().unwrap(), "text/plain");
    }

    #[test]
    fn convert_runs_once() {
        let calls = Cell::new(0);
        let converter = |_: &Path| -> Result<String> {
            calls.set(calls.get() + 1);
            Ok("text".to_string())
        };
        let file = ImportFile::with_mimetype("statement.pdf", PDF_MIMETYPE);
        assert_eq!(file.convert(&converter).unwrap(), "text");
        assert_eq!(file.convert(&converter).unwrap(), "text");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failed_conversion_is_not_cached() {
        let calls = Cell::new(0);
        let converter = |_: &Path| -> Result<String> {
            calls.set(calls.get() + 1);
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom").into())
        };
        let file = ImportFile::with_mimetype("statement.pdf", PDF_MIMETYPE);
        assert!(file.convert(&converter).is_err());
        assert!(file.convert(&converter).is_err());
        assert_eq!(calls.get(), 2);
    }
}
