//! Writer errors.

use thiserror::Error;

/// An error writing a database out as text.
#[derive(Error, Debug)]
pub enum WriterError {
    /// Writing (or the temp-file-then-rename dance) failed.
    #[error("I/O error writing {0:?}: {1}")]
    Io(String, std::io::Error),
}
