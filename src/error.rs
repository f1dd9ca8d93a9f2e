use std::io;
use std::process::ExitStatus;
use std::string::FromUtf8Error;

use beancount_core::AccountParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("text extraction failed")]
    Extraction(#[from] ExtractionError),

    #[error("{what} not found in statement")]
    NotFound { what: &'static str },

    #[error("cannot convert {field} '{value}' on line {line}")]
    Conversion {
        field: &'static str,
        value: String,
        line: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("invalid account name '{name}'")]
    InvalidAccount {
        name: String,
        #[source]
        source: AccountParseError,
    },

    #[error("an io error occurred")]
    Io(#[from] io::Error),
}

/// Failure to turn a document into text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("could not run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("output is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

impl ImportError {
    pub(crate) fn conversion<E>(field: &'static str, value: &str, line: usize, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ImportError::Conversion {
            field,
            value: value.to_string(),
            line,
            source: Box::new(err),
        }
    }
}
