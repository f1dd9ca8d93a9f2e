//! Running importers over documents: matching, extraction and filing.

use std::fs;
use std::path::PathBuf;

use beancount_core::Ledger;
use chrono::{DateTime, Local, NaiveDate};
use tracing::debug;

use crate::error::Result;
use crate::file::ImportFile;
use crate::importer::Importer;

/// Importers that recognize `file`, in registration order.
pub fn identify<'i>(
    importers: &'i [Box<dyn Importer>],
    file: &ImportFile,
) -> Result<Vec<&'i dyn Importer>> {
    let mut matched = Vec::new();
    for importer in importers {
        if importer.identify(file)? {
            debug!(importer = %importer.name(), path = %file.path().display(), "identified");
            matched.push(importer.as_ref());
        }
    }
    Ok(matched)
}

/// Entries of `file` from the first importer that recognizes it, sorted by date.
///
/// Entries sharing a date keep statement order.
pub fn extract<'i>(
    importers: &'i [Box<dyn Importer>],
    file: &ImportFile,
) -> Result<Option<(&'i dyn Importer, Ledger<'static>)>> {
    let importer = match identify(importers, file)?.into_iter().next() {
        Some(importer) => importer,
        None => return Ok(None),
    };
    let mut directives = importer.extract(file)?;
    directives.sort_by(|a, b| a.date().cmp(b.date()));
    debug!(importer = %importer.name(), entries = directives.len(), "extracted");
    let ledger = Ledger::builder().directives(directives).build();
    Ok(Some((importer, ledger)))
}

/// Where `file` belongs in a document archive: `<account path>/<date>.<name>`.
///
/// The date is the importer's document date, or the file's modification date when the importer
/// has none. Nothing is moved.
pub fn archive_path(importer: &dyn Importer, file: &ImportFile) -> Result<PathBuf> {
    let date = match importer.file_date(file)? {
        Some(date) => date,
        None => modified_date(file)?,
    };
    let name = match importer.file_name(file) {
        Some(name) => name.into_owned(),
        None => file
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let account = importer.file_account(file);
    let mut dest: PathBuf = account.components().collect();
    dest.push(format!("{}.{}", date.format("%Y-%m-%d"), name));
    Ok(dest)
}

fn modified_date(file: &ImportFile) -> Result<NaiveDate> {
    let modified = fs::metadata(file.path())?.modified()?;
    Ok(DateTime::<Local>::from(modified).date_naive())
}
