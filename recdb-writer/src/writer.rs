use recdb_core::{Comment, Database, Field, Record, RecordElem, RSet, RSetElem};

use crate::options::{WriterMode, WriterOptions};

/// Renders records, record sets and whole databases back to text, in one of
/// the four modes a [`WriterOptions`] selects.
#[derive(Clone, Debug)]
pub struct Writer {
    options: WriterOptions,
}

impl Writer {
    /// Creates a writer with the given options.
    pub fn new(options: WriterOptions) -> Self {
        Writer { options }
    }

    /// Renders an entire database: every record set in order, separated by
    /// a blank line.
    pub fn write_database(&self, db: &Database) -> String {
        let mut blocks = Vec::new();
        for rset in db.rsets() {
            let rendered = self.write_rset(rset);
            if !rendered.is_empty() {
                blocks.push(rendered);
            }
        }
        blocks.join("\n")
    }

    /// Renders one record set: its descriptor (at its recorded relative
    /// position), its body comments, and its records.
    pub fn write_rset(&self, rset: &RSet) -> String {
        let elems: Vec<&RSetElem> = rset.elems().collect();
        let pos = rset.descriptor_position().min(elems.len());
        let mut blocks: Vec<String> = Vec::new();

        for elem in &elems[..pos] {
            if let Some(block) = self.write_rset_elem(elem) {
                blocks.push(block);
            }
        }
        let descriptor_trails_alone = pos == elems.len();
        if let Some(descriptor) = rset.descriptor() {
            blocks.push(self.write_record(descriptor));
        }
        for elem in &elems[pos..] {
            if let Some(block) = self.write_rset_elem(elem) {
                blocks.push(block);
            }
        }

        let sep = if self.options.collapse { "\n" } else { "\n\n" };
        let mut out = blocks.join(sep);
        if descriptor_trails_alone && rset.descriptor().is_some() && !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn write_rset_elem(&self, elem: &RSetElem) -> Option<String> {
        match elem {
            RSetElem::Record(record) => Some(self.write_record(record)),
            RSetElem::Comment(comment) => {
                if self.options.skip_comments {
                    None
                } else {
                    Some(self.write_standalone_comment(comment))
                }
            }
        }
    }

    /// Renders a single record in the selected mode.
    pub fn write_record(&self, record: &Record) -> String {
        match self.options.mode {
            WriterMode::Normal => self.write_record_normal(record),
            WriterMode::Sexp => self.write_record_sexp(record),
            WriterMode::Values => self.write_record_values(record),
            WriterMode::ValuesRow => self.write_record_values_row(record),
        }
    }

    fn write_record_normal(&self, record: &Record) -> String {
        let mut lines = Vec::new();
        for elem in record.elems() {
            match elem {
                RecordElem::Field(f) => lines.push(f.render_inline()),
                RecordElem::Comment(c) => {
                    if !self.options.skip_comments {
                        lines.push(render_comment_lines(c));
                    }
                }
            }
        }
        lines.join("\n")
    }

    fn write_standalone_comment(&self, comment: &Comment) -> String {
        render_comment_lines(comment)
    }

    fn write_record_sexp(&self, record: &Record) -> String {
        let mut fields = Vec::new();
        for elem in record.elems() {
            match elem {
                RecordElem::Field(f) => fields.push(sexp_field(f)),
                RecordElem::Comment(c) => {
                    if !self.options.skip_comments {
                        fields.push(sexp_comment(c));
                    }
                }
            }
        }
        format!("(record {} ({}))", record.source_position(), fields.join(" "))
    }

    fn write_record_values(&self, record: &Record) -> String {
        record.fields().map(Field::value).collect::<Vec<_>>().join("\n")
    }

    fn write_record_values_row(&self, record: &Record) -> String {
        record.fields().map(Field::value).collect::<Vec<_>>().join(" ")
    }
}

fn render_comment_lines(comment: &Comment) -> String {
    comment
        .text()
        .split('\n')
        .map(|line| if line.is_empty() { "#".to_string() } else { format!("# {line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

fn sexp_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

fn sexp_field(field: &Field) -> String {
    format!(
        "(field {} \"{}\" \"{}\")",
        field.loc().offset,
        sexp_escape(field.name()),
        sexp_escape(field.value())
    )
}

fn sexp_comment(comment: &Comment) -> String {
    format!("(comment {} \"{}\")", comment.loc().offset, sexp_escape(comment.text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_core::Field;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (n, v) in pairs {
            r.push_field(Field::new(*n, *v));
        }
        r
    }

    #[test]
    fn normal_mode_renders_name_value_pairs() {
        let w = Writer::new(WriterOptions::default());
        let r = record(&[("Name", "Alice"), ("Age", "30")]);
        assert_eq!(w.write_record(&r), "Name: Alice\nAge: 30");
    }

    #[test]
    fn normal_mode_splits_multiline_values_into_continuations() {
        let w = Writer::new(WriterOptions::default());
        let mut r = Record::new();
        r.push_field(Field::new("Desc", "first\nsecond"));
        assert_eq!(w.write_record(&r), "Desc: first\n+ second");
    }

    #[test]
    fn values_mode_drops_names() {
        let w = Writer::new(WriterOptions::with_mode(WriterMode::Values));
        let r = record(&[("Name", "Alice"), ("Age", "30")]);
        assert_eq!(w.write_record(&r), "Alice\n30");
    }

    #[test]
    fn values_row_mode_joins_with_spaces() {
        let w = Writer::new(WriterOptions::with_mode(WriterMode::ValuesRow));
        let r = record(&[("Name", "Alice"), ("Age", "30")]);
        assert_eq!(w.write_record(&r), "Alice 30");
    }

    #[test]
    fn sexp_mode_escapes_quotes_and_backslashes() {
        let w = Writer::new(WriterOptions::with_mode(WriterMode::Sexp));
        let mut r = Record::new();
        r.push_field(Field::new("Quote", "she said \"hi\\bye\""));
        let out = w.write_record(&r);
        assert!(out.starts_with("(record 0 ((field"));
        assert!(out.contains("\\\"hi\\\\bye\\\""));
    }

    #[test]
    fn rset_emits_descriptor_before_records_by_default() {
        let mut rset = RSet::new();
        let mut descr = Record::new();
        descr.push_field(Field::new("%rec", "Book"));
        rset.set_descriptor(Some(descr));
        rset.push_record(record(&[("Title", "Unix Haters")]));
        let w = Writer::new(WriterOptions::default());
        let out = w.write_rset(&rset);
        assert_eq!(out, "%rec: Book\n\nTitle: Unix Haters");
    }

    #[test]
    fn collapse_option_omits_blank_lines_between_records() {
        let mut rset = RSet::new();
        rset.push_record(record(&[("A", "1")]));
        rset.push_record(record(&[("A", "2")]));
        let mut opts = WriterOptions::default();
        opts.collapse = true;
        let w = Writer::new(opts);
        assert_eq!(w.write_rset(&rset), "A: 1\nA: 2");
    }

    #[test]
    fn skip_comments_drops_comment_lines() {
        let mut r = Record::new();
        r.push_comment(Comment::new("a note"));
        r.push_field(Field::new("A", "1"));
        let mut opts = WriterOptions::default();
        opts.skip_comments = true;
        let w = Writer::new(opts);
        assert_eq!(w.write_record(&r), "A: 1");
    }

    proptest::proptest! {
        /// Writing a descriptor-less record set in NORMAL mode and parsing
        /// the result back recovers the same field names and values, in the
        /// same order, no matter which ASCII names/values were used.
        #[test]
        fn write_then_parse_round_trips_fields(
            records in proptest::collection::vec(
                proptest::collection::vec(("[A-Za-z][A-Za-z0-9_]{0,5}", "[A-Za-z0-9 ]{0,8}"), 1..4),
                0..5,
            )
        ) {
            let mut rset = RSet::new();
            for pairs in &records {
                let mut r = Record::new();
                for (name, value) in pairs {
                    r.push_field(Field::new(name.clone(), value.clone()));
                }
                rset.push_record(r);
            }
            let mut db = recdb_core::Database::new();
            db.append_rset(rset);

            let w = Writer::new(WriterOptions::default());
            let text = w.write_database(&db);
            let parsed = recdb_parser::parse_str(&text).unwrap();

            let original: Vec<Vec<(String, String)>> = records
                .iter()
                .map(|pairs| pairs.iter().map(|(n, v)| (n.clone(), v.clone())).collect())
                .collect();
            let round_tripped: Vec<Vec<(String, String)>> = parsed
                .get(0)
                .map(|rset| {
                    rset.records()
                        .map(|r| r.fields().map(|f| (f.name().to_string(), f.value().to_string())).collect())
                        .collect()
                })
                .unwrap_or_default();
            prop_assert_eq!(original, round_tripped);
        }
    }
}
