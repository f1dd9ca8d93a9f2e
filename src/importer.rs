use std::borrow::Cow;

use beancount_core::{Account, Directive};
use chrono::NaiveDate;

use crate::error::Result;
use crate::file::ImportFile;

/// A statement format the ingest pipeline can recognize and import.
pub trait Importer {
    /// A name identifying the importer in reports.
    fn name(&self) -> Cow<'_, str>;

    /// Whether `file` is a document this importer handles.
    fn identify(&self, file: &ImportFile) -> Result<bool>;

    /// Extracts the entries a statement holds, in statement order.
    fn extract(&self, file: &ImportFile) -> Result<Vec<Directive<'static>>>;

    /// The account the document's transactions post against.
    fn file_account(&self, file: &ImportFile) -> Account<'static>;

    /// The canonical name to archive the document under.
    fn file_name(&self, _file: &ImportFile) -> Option<Cow<'static, str>> {
        None
    }

    /// The date the document is archived under.
    fn file_date(&self, _file: &ImportFile) -> Result<Option<NaiveDate>> {
        Ok(None)
    }
}
