//! The pull parser itself: turns a text buffer into a stream of top-level
//! items (comments and records), and `parse_database` groups that stream
//! into record sets by their `%rec:` descriptors.

use recdb_core::{Comment, Database, Field, Record, RSet, SourceLoc};

use crate::error::ParserError;
use crate::options::ParserOptions;

/// A top-level item read from the input: a standalone comment block, or a
/// complete record. Whether a comment attaches to the record that follows
/// it is decided by the caller (`parse_database` does this by checking
/// whether a blank line separates the two); the parser itself only reports
/// what it saw.
#[derive(Clone, Debug)]
pub enum Item {
    /// A maximal run of consecutive `#` lines.
    Comment(Comment),
    /// A complete record.
    Record(Record),
}

/// A saved read position, for backtracking (`seek`/`tell`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
    line: u64,
}

enum LineKind<'a> {
    Blank,
    Comment(&'a str),
    Field(&'a str, &'a str),
    Continuation(&'a str),
    Invalid,
}

fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(rest) = line.strip_prefix('#') {
        return LineKind::Comment(rest.strip_prefix(' ').unwrap_or(rest));
    }
    if let Some(rest) = line.strip_prefix('+') {
        return LineKind::Continuation(rest.strip_prefix(' ').unwrap_or(rest));
    }
    if let Some((name, value)) = line.split_once(':') {
        let name = name.trim();
        if Field::is_valid_name(name) {
            return LineKind::Field(name, value.strip_prefix(' ').unwrap_or(value));
        }
    }
    LineKind::Invalid
}

/// A pull parser over an in-memory text buffer.
pub struct Parser<'a> {
    text: &'a str,
    pos: usize,
    line: u64,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `text`.
    pub fn new(text: &'a str, options: ParserOptions) -> Self {
        Parser {
            text,
            pos: 0,
            line: 0,
            options,
        }
    }

    /// The current read position, for later [`Parser::seek`].
    pub fn tell(&self) -> Cursor {
        Cursor {
            pos: self.pos,
            line: self.line,
        }
    }

    /// Rewinds (or fast-forwards) to a position previously returned by
    /// [`Parser::tell`].
    pub fn seek(&mut self, cursor: Cursor) {
        self.pos = cursor.pos;
        self.line = cursor.line;
    }

    fn loc_at_cursor(&self) -> SourceLoc {
        SourceLoc {
            source: self.options.source_name.clone(),
            line: self.line + 1,
            offset: self.pos as u64,
        }
    }

    fn peek_raw_line(&self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        Some(match rest.find('\n') {
            Some(i) => rest[..i].trim_end_matches('\r'),
            None => rest.trim_end_matches('\r'),
        })
    }

    fn next_raw_line(&mut self) -> Option<(&'a str, u64)> {
        if self.pos >= self.text.len() {
            return None;
        }
        let start_line = self.line + 1;
        let rest = &self.text[self.pos..];
        let (line, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        self.line += 1;
        Some((line.trim_end_matches('\r'), start_line))
    }

    /// Whether the very next line (no skipping) is non-blank: used right
    /// after reading a comment block to decide whether it was immediately
    /// followed by more content, with no blank-line gap.
    fn immediately_followed_by_content(&self) -> bool {
        match self.peek_raw_line() {
            Some(l) => !l.trim().is_empty(),
            None => false,
        }
    }

    /// Pulls the next top-level item, or `None` at end of input.
    pub fn next_item(&mut self) -> Result<Option<Item>, ParserError> {
        loop {
            match self.peek_raw_line() {
                None => return Ok(None),
                Some(l) if l.trim().is_empty() => {
                    self.next_raw_line();
                }
                _ => break,
            }
        }
        let first = self.peek_raw_line().expect("checked above");
        match classify(first) {
            LineKind::Comment(_) => {
                let block_loc = self.loc_at_cursor();
                let mut lines = Vec::new();
                loop {
                    match self.peek_raw_line() {
                        Some(l) => match classify(l) {
                            LineKind::Comment(text) => {
                                lines.push(text.to_string());
                                self.next_raw_line();
                            }
                            _ => break,
                        },
                        None => break,
                    }
                }
                Ok(Some(Item::Comment(Comment::new(lines.join("\n")).with_loc(block_loc))))
            }
            LineKind::Field(_, _) => Ok(Some(Item::Record(self.read_record_body()?))),
            LineKind::Continuation(_) => Err(ParserError::DanglingContinuation {
                source: self.options.source_name.clone(),
                line: self.line + 1,
            }),
            LineKind::Invalid => Err(ParserError::InvalidField {
                source: self.options.source_name.clone(),
                line: self.line + 1,
                text: first.to_string(),
            }),
            LineKind::Blank => unreachable!("blank lines are skipped above"),
        }
    }

    fn read_record_body(&mut self) -> Result<Record, ParserError> {
        let loc = self.loc_at_cursor();
        let mut record = Record::new();
        record.set_source_position(loc.line);
        loop {
            let Some(line) = self.peek_raw_line() else { break };
            if line.trim().is_empty() {
                break;
            }
            match classify(line) {
                LineKind::Field(name, value) => {
                    let (_, start_line) = self.next_raw_line().expect("peeked above");
                    let field_loc = SourceLoc {
                        source: self.options.source_name.clone(),
                        line: start_line,
                        offset: 0,
                    };
                    record.push_field(Field::new(name, value).with_loc(field_loc));
                }
                LineKind::Comment(text) => {
                    let (_, start_line) = self.next_raw_line().expect("peeked above");
                    let c_loc = SourceLoc {
                        source: self.options.source_name.clone(),
                        line: start_line,
                        offset: 0,
                    };
                    record.push_comment(Comment::new(text).with_loc(c_loc));
                }
                LineKind::Continuation(value) => {
                    self.next_raw_line();
                    match record.fields_mut().last() {
                        Some(field) => {
                            // A trailing `\` right before the line break that
                            // separates this continuation from the previous
                            // one escapes that break: both characters are
                            // dropped and the two chunks are glued directly
                            // together instead of joined with an embedded
                            // `\n`.
                            let joined = match field.value().strip_suffix('\\') {
                                Some(escaped) => format!("{escaped}{value}"),
                                None => format!("{}\n{}", field.value(), value),
                            };
                            field.set_value(joined);
                        }
                        None => {
                            return Err(ParserError::DanglingContinuation {
                                source: self.options.source_name.clone(),
                                line: self.line,
                            })
                        }
                    }
                }
                LineKind::Invalid => {
                    return Err(ParserError::InvalidField {
                        source: self.options.source_name.clone(),
                        line: self.line + 1,
                        text: line.to_string(),
                    })
                }
                LineKind::Blank => unreachable!("checked above"),
            }
        }
        Ok(record)
    }

    /// Consumes the rest of the input, grouping every item into record sets
    /// by their `%rec:` descriptors. Consecutive data records with no
    /// descriptor of their own — whether at the top of the file or anywhere
    /// else — are folded into a single default record set. A comment block
    /// immediately followed by a record (no blank line in between) is
    /// attached as that record's (or descriptor's) preceding comment rather
    /// than left as a standalone element.
    pub fn parse_database(&mut self) -> Result<Database, ParserError> {
        let mut db = Database::new();
        let mut current: Option<RSet> = None;
        let mut pending: Option<Comment> = None;
        while let Some(item) = self.next_item()? {
            match item {
                Item::Comment(c) => {
                    if self.immediately_followed_by_content() {
                        pending = Some(c);
                    } else {
                        current.get_or_insert_with(RSet::new).push_comment(c);
                    }
                }
                Item::Record(rec) => {
                    if is_descriptor(&rec) {
                        let rec_loc = rec.source_position();
                        if let Some(prev) = current.take() {
                            self.flush_rset(&mut db, prev)?;
                        }
                        let mut rset = RSet::new();
                        if let Some(c) = pending.take() {
                            rset.push_comment(c);
                            rset.set_descriptor_position(1);
                        }
                        rset.set_descriptor(Some(rec));
                        if let Some(name) = rset.type_name() {
                            if db.type_p(name) {
                                return Err(ParserError::DuplicateRecordType {
                                    source: self.options.source_name.clone(),
                                    line: rec_loc,
                                    type_name: name.to_string(),
                                });
                            }
                        }
                        current = Some(rset);
                    } else {
                        let rset = current.get_or_insert_with(RSet::new);
                        if let Some(c) = pending.take() {
                            rset.push_comment(c);
                        }
                        rset.push_record(rec);
                    }
                }
            }
        }
        if let Some(rset) = current {
            self.flush_rset(&mut db, rset)?;
        }
        tracing::debug!(record_sets = db.len(), source = ?self.options.source_name, "parsed database");
        Ok(db)
    }

    /// Appends `rset` to `db`, folding it into the existing default record
    /// set if both are unnamed (the "multiple unnamed rsets merge into one"
    /// invariant); a named `rset` whose type already exists is rejected
    /// before this is ever reached (checked when its descriptor is read).
    fn flush_rset(&self, db: &mut Database, mut rset: RSet) -> Result<(), ParserError> {
        if rset.type_name().is_none() {
            if let Some(default) = db.by_type_mut(None) {
                default.merge_elems_from(&mut rset);
                return Ok(());
            }
        }
        db.append_rset(rset);
        Ok(())
    }
}

fn is_descriptor(record: &Record) -> bool {
    record.fields().next().map(|f| f.name() == "%rec").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_field_record() {
        let text = "Name: Alice\nAge: 30\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        assert_eq!(db.len(), 1);
        let rec = db.get(0).unwrap().records().next().unwrap();
        assert_eq!(rec.field_by_name("Name", 0).unwrap().value(), "Alice");
        assert_eq!(rec.field_by_name("Age", 0).unwrap().value(), "30");
    }

    #[test]
    fn continuation_line_appends_with_newline() {
        let text = "Desc: first\n+ second\n+ third\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        let rec = db.get(0).unwrap().records().next().unwrap();
        assert_eq!(rec.field_by_name("Desc", 0).unwrap().value(), "first\nsecond\nthird");
    }

    #[test]
    fn trailing_backslash_escapes_the_continuation_newline() {
        let text = "Desc: first\\\n+ second\n+ third\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        let rec = db.get(0).unwrap().records().next().unwrap();
        assert_eq!(rec.field_by_name("Desc", 0).unwrap().value(), "firstsecond\nthird");
    }

    #[test]
    fn descriptor_starts_a_new_named_rset() {
        let text = "%rec: Book\n%key: Id\n\nId: 1\nTitle: Unix Haters\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.get(0).unwrap().type_name(), Some("Book"));
        assert_eq!(db.get(0).unwrap().num_records(), 1);
    }

    #[test]
    fn multiple_anonymous_blocks_merge_into_one_default_rset() {
        let text = "Name: Alice\n\nName: Bob\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.get(0).unwrap().type_name().is_none());
        assert_eq!(db.get(0).unwrap().num_records(), 2);
    }

    #[test]
    fn standalone_comment_block_stays_in_the_current_rsets_body() {
        let text = "Name: Alice\n\n# standalone note\n\nName: Bob\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        assert_eq!(db.len(), 1);
        let rset = db.get(0).unwrap();
        assert_eq!(rset.num_records(), 2);
        let comment_count = rset.elems().filter(|e| matches!(e, recdb_core::RSetElem::Comment(_))).count();
        assert_eq!(comment_count, 1);
    }

    #[test]
    fn comment_immediately_before_a_descriptor_sets_descriptor_position() {
        let text = "# About Book\n%rec: Book\n\nId: 1\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let db = parser.parse_database().unwrap();
        let rset = db.get(0).unwrap();
        assert_eq!(rset.descriptor_position(), 1);
        let comment = rset.elems().next().unwrap().as_comment().unwrap();
        assert_eq!(comment.text(), "About Book");
    }

    #[test]
    fn duplicate_record_type_is_an_error() {
        let text = "%rec: Book\n\nId: 1\n\n%rec: Book\n\nId: 2\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        assert!(matches!(
            parser.parse_database(),
            Err(ParserError::DuplicateRecordType { .. })
        ));
    }

    #[test]
    fn dangling_continuation_is_an_error() {
        let text = "+ nothing to continue\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        assert!(parser.next_item().is_err());
    }

    #[test]
    fn seek_rewinds_to_a_saved_position() {
        let text = "Name: Alice\n\nName: Bob\n";
        let mut parser = Parser::new(text, ParserOptions::default());
        let mark = parser.tell();
        parser.next_item().unwrap();
        parser.seek(mark);
        let item = parser.next_item().unwrap().unwrap();
        match item {
            Item::Record(rec) => assert_eq!(rec.field_by_name("Name", 0).unwrap().value(), "Alice"),
            _ => panic!("expected a record"),
        }
    }
}
