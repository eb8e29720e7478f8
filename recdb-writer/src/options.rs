//! Writer configuration.

/// The four textual output modes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WriterMode {
    /// Canonical rec syntax: `name: value`, continuation lines for
    /// multi-line values.
    #[default]
    Normal,
    /// S-expressions: `(record CHARLOC ((field LOC "name" "value") …))`.
    Sexp,
    /// One field value per line, no names, no comments.
    Values,
    /// A record's field values on one line, separated by single spaces.
    ValuesRow,
}

/// Options controlling how a [`crate::Writer`] renders a database.
#[derive(Clone, Debug)]
pub struct WriterOptions {
    /// Which of the four output modes to use.
    pub mode: WriterMode,
    /// Omit the blank line that otherwise separates consecutive records
    /// within a record set.
    pub collapse: bool,
    /// Omit comments entirely.
    pub skip_comments: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            mode: WriterMode::Normal,
            collapse: false,
            skip_comments: false,
        }
    }
}

impl WriterOptions {
    /// Options selecting `mode`, otherwise default.
    pub fn with_mode(mode: WriterMode) -> Self {
        WriterOptions {
            mode,
            ..Default::default()
        }
    }
}
