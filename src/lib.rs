//! Importing bank statements into Beancount.
//!
//! A [`Converter`] turns a document into text, an [`Importer`] recognizes a statement format and
//! turns its text into Beancount directives, and the [`ingest`] functions run importers over
//! [`ImportFile`]s the way `bean-extract` and `bean-file` do.

pub mod bjbank;
pub mod convert;
pub mod error;
pub mod file;
pub mod importer;
pub mod ingest;

pub use bjbank::BJBankImporter;
pub use convert::{Converter, PdfToText};
pub use error::{ExtractionError, ImportError, Result};
pub use file::ImportFile;
pub use importer::Importer;
