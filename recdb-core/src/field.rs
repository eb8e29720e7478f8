//! Field and comment primitives.

use crate::mset::{Kind, MSetElem};

/// Where a [`Field`] or [`Comment`] came from in its source text, for error
/// reporting and for the SEX iteration algorithm, which needs a
/// per-field mark independent of the field's name or value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLoc {
    /// Name of the source (a file path, or a synthetic name for in-memory
    /// buffers), if known.
    pub source: Option<String>,
    /// 1-based line number within the source.
    pub line: u64,
    /// Byte offset within the source.
    pub offset: u64,
}

/// A single `Name: Value` pair, the atomic unit of a [`Record`](crate::Record).
///
/// Field names compare equal by exact (case-sensitive) string equality; `_`,
/// `-` and `%` are never folded into one another. Values are arbitrary UTF-8.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    name: String,
    value: String,
    loc: SourceLoc,
    /// A scratch mark used by algorithms that need to remember "have I
    /// already visited this field" without allocating a side table (the SEX
    /// record-evaluation algorithm and `Record::uniq`).
    mark: i64,
}

impl Field {
    /// Creates a new field. Does not validate the name; use
    /// [`Field::is_valid_name`] at parse boundaries.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            loc: SourceLoc::default(),
            mark: 0,
        }
    }

    /// Attaches source-location metadata, for error reporting.
    pub fn with_loc(mut self, loc: SourceLoc) -> Self {
        self.loc = loc;
        self
    }

    /// Whether `name` is a syntactically valid field name:
    /// `[A-Za-z%][A-Za-z0-9_]*`.
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '%' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Source-location metadata.
    pub fn loc(&self) -> &SourceLoc {
        &self.loc
    }

    /// Replaces the value, freeing the old one.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Replaces the name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether two field names are the same field:
    /// exact (case-sensitive) string equality, no normalization.
    pub fn name_eq(a: &str, b: &str) -> bool {
        a == b
    }

    /// Per-field integer mark, used by mark/reset algorithms.
    pub fn mark(&self) -> i64 {
        self.mark
    }

    /// Sets the per-field mark.
    pub fn set_mark(&mut self, mark: i64) {
        self.mark = mark;
    }

    /// Renders this field in canonical `name: value` form, splitting a
    /// multi-line value into continuation lines the way the NORMAL writer
    /// does, but without the trailing newline.
    pub fn render_inline(&self) -> String {
        let mut out = String::new();
        let mut lines = self.value.split('\n');
        out.push_str(&self.name);
        out.push_str(": ");
        if let Some(first) = lines.next() {
            out.push_str(first);
        }
        for rest in lines {
            out.push_str("\n+ ");
            out.push_str(rest);
        }
        out
    }

    /// Converts this field to a [`Comment`] by rendering its textual form
    /// and stripping the trailing newline (it has none here, since
    /// `render_inline` never adds one).
    pub fn to_comment(&self) -> Comment {
        Comment::new(self.render_inline())
    }
}

impl PartialEq for Field {
    /// Fields compare equal by name only; the value is ignored.
    fn eq(&self, other: &Self) -> bool {
        Self::name_eq(&self.name, &other.name)
    }
}

impl MSetElem for Field {
    fn kind(&self) -> Kind {
        Kind::Concrete
    }
}

/// The text of one or more consecutive `#`-prefixed lines, with the leading
/// `#` stripped from each line and internal line breaks kept as `\n`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    text: String,
    loc: SourceLoc,
}

impl Comment {
    /// Creates a new comment from its (already unprefixed) text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            loc: SourceLoc::default(),
        }
    }

    /// Attaches source-location metadata.
    pub fn with_loc(mut self, loc: SourceLoc) -> Self {
        self.loc = loc;
        self
    }

    /// The comment's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source-location metadata.
    pub fn loc(&self) -> &SourceLoc {
        &self.loc
    }
}

impl MSetElem for Comment {
    fn kind(&self) -> Kind {
        Kind::Comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(Field::is_valid_name("Name"));
        assert!(Field::is_valid_name("%rec"));
        assert!(Field::is_valid_name("foo_bar1"));
        assert!(!Field::is_valid_name("1foo"));
        assert!(!Field::is_valid_name("foo-bar"));
        assert!(!Field::is_valid_name(""));
    }

    #[test]
    fn equality_ignores_value() {
        let a = Field::new("Id", "1");
        let b = Field::new("Id", "2");
        assert_eq!(a, b);
        let c = Field::new("Other", "1");
        assert_ne!(a, c);
    }

    #[test]
    fn render_multiline() {
        let f = Field::new("Desc", "first\nsecond\nthird");
        assert_eq!(f.render_inline(), "Desc: first\n+ second\n+ third");
    }

    #[test]
    fn to_comment_round_trip() {
        let f = Field::new("Id", "1");
        let c = f.to_comment();
        assert_eq!(c.text(), "Id: 1");
    }
}
