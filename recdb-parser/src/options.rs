//! Parser configuration.

/// Options controlling how a [`crate::Parser`] reads its input.
#[derive(Clone, Debug, Default)]
pub struct ParserOptions {
    /// The name to attach to every [`recdb_core::SourceLoc`] this parser
    /// produces (typically a file path), for error messages.
    pub source_name: Option<String>,
}

impl ParserOptions {
    /// Options naming `source_name` as the source.
    pub fn named(source_name: impl Into<String>) -> Self {
        ParserOptions {
            source_name: Some(source_name.into()),
        }
    }
}
