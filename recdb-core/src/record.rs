//! Records: ordered multi-sets of fields and comments.

use crate::field::{Comment, Field};
use crate::mset::{Kind, MSet, MSetElem};

/// One element of a [`Record`]'s multi-set: a field or a comment.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordElem {
    /// A `Name: Value` field.
    Field(Field),
    /// A `#`-prefixed comment.
    Comment(Comment),
}

impl MSetElem for RecordElem {
    fn kind(&self) -> Kind {
        match self {
            RecordElem::Field(_) => Kind::Concrete,
            RecordElem::Comment(_) => Kind::Comment,
        }
    }
}

impl RecordElem {
    /// The field inside this element, if it is one.
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            RecordElem::Field(f) => Some(f),
            RecordElem::Comment(_) => None,
        }
    }

    /// The field inside this element, mutably, if it is one.
    pub fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            RecordElem::Field(f) => Some(f),
            RecordElem::Comment(_) => None,
        }
    }

    /// The comment inside this element, if it is one.
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            RecordElem::Comment(c) => Some(c),
            RecordElem::Field(_) => None,
        }
    }
}

/// An ordered multi-set of fields and comments, interleaved in insertion
/// order.
///
/// A record does not own a back-reference to its containing record set
/// directly; callers that need it look the record up by position in the
/// owning [`RSet`](crate::RSet), which keeps ownership strictly tree-shaped
/// (every container exclusively owns its children).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    elems: MSet<RecordElem>,
    source_position: u64,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// The position (line/record index) this record started at in its
    /// source, for error reporting.
    pub fn source_position(&self) -> u64 {
        self.source_position
    }

    /// Sets the source position.
    pub fn set_source_position(&mut self, pos: u64) {
        self.source_position = pos;
    }

    /// Appends a field.
    pub fn push_field(&mut self, field: Field) {
        self.elems.append(RecordElem::Field(field));
    }

    /// Appends a comment.
    pub fn push_comment(&mut self, comment: Comment) {
        self.elems.append(RecordElem::Comment(comment));
    }

    /// Appends a raw element.
    pub fn push_elem(&mut self, elem: RecordElem) {
        self.elems.append(elem);
    }

    /// Iterates over every element (fields and comments), in order.
    pub fn elems(&self) -> impl DoubleEndedIterator<Item = &RecordElem> {
        self.elems.iter()
    }

    /// Iterates mutably over every element.
    pub fn elems_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut RecordElem> {
        self.elems.iter_mut()
    }

    /// Iterates over every field, in order, ignoring comments.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.elems.iter().filter_map(RecordElem::as_field)
    }

    /// Iterates over every field mutably, ignoring comments.
    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.elems.iter_mut().filter_map(RecordElem::as_field_mut)
    }

    /// Number of fields named `name`.
    pub fn num_fields_by_name(&self, name: &str) -> usize {
        self.fields().filter(|f| f.name() == name).count()
    }

    /// The `k`-th field named `name` (0-based), if present.
    pub fn field_by_name(&self, name: &str, k: usize) -> Option<&Field> {
        self.fields().filter(|f| f.name() == name).nth(k)
    }

    /// The `k`-th field named `name`, mutably.
    pub fn field_by_name_mut(&mut self, name: &str, k: usize) -> Option<&mut Field> {
        self.fields_mut().filter(|f| f.name() == name).nth(k)
    }

    /// Removes every field named `name`, or just the `k`-th if `k` is
    /// `Some`. Returns the number of fields removed.
    pub fn remove_field_by_name(&mut self, name: &str, k: Option<usize>) -> usize {
        match k {
            None => {
                let before = self.elems.count(Kind::Concrete);
                self.elems.retain(|e| match e {
                    RecordElem::Field(f) => f.name() != name,
                    RecordElem::Comment(_) => true,
                });
                before - self.elems.count(Kind::Concrete)
            }
            Some(k) => {
                let mut seen = 0;
                let mut target: Option<usize> = None;
                for (pos, elem) in self.elems.iter().enumerate() {
                    if let RecordElem::Field(f) = elem {
                        if f.name() == name {
                            if seen == k {
                                target = Some(pos);
                                break;
                            }
                            seen += 1;
                        }
                    }
                }
                if let Some(pos) = target {
                    self.elems.remove_at(pos);
                    1
                } else {
                    0
                }
            }
        }
    }

    /// Zero-based index of `field` among *all* fields in the record (by
    /// identity of position, comparing via pointer-free structural search:
    /// the caller passes the field reference it obtained from this record).
    pub fn get_field_index(&self, field: &Field) -> Option<usize> {
        self.fields().position(|f| std::ptr::eq(f, field))
    }

    /// Position of `field` among fields sharing its name (its "subscript").
    pub fn get_field_index_by_name(&self, field: &Field) -> Option<usize> {
        self.fields()
            .filter(|f| f.name() == field.name())
            .position(|f| std::ptr::eq(f, field))
    }

    /// Whether any field's value contains `needle` as a substring.
    pub fn contains_value(&self, needle: &str, case_insensitive: bool) -> bool {
        if case_insensitive {
            let needle = needle.to_lowercase();
            self.fields()
                .any(|f| f.value().to_lowercase().contains(&needle))
        } else {
            self.fields().any(|f| f.value().contains(needle))
        }
    }

    /// Whether the record has a field named `name` with value `value`.
    pub fn contains_field(&self, name: &str, value: &str) -> bool {
        self.fields().any(|f| f.name() == name && f.value() == value)
    }

    /// Serializes this record (fields only, in `name: value` form joined by
    /// `\n`) and wraps it as a single [`Comment`].
    pub fn to_comment(&self) -> Comment {
        let text = self
            .fields()
            .map(Field::render_inline)
            .collect::<Vec<_>>()
            .join("\n");
        Comment::new(text)
    }

    /// Removes later duplicate fields: for every pair of fields with equal
    /// (name, value), keeps only the earliest occurrence.
    pub fn uniq(&mut self) {
        let mut seen: Vec<(String, String)> = Vec::new();
        self.elems.retain(|e| match e {
            RecordElem::Field(f) => {
                let key = (f.name().to_string(), f.value().to_string());
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            }
            RecordElem::Comment(_) => true,
        });
    }

    /// Copies every field of `src` onto the end of `self`.
    pub fn append(&mut self, src: &Record) {
        for f in src.fields() {
            self.push_field(f.clone());
        }
    }

    /// Resets every field's mark to `0`.
    pub fn reset_marks(&mut self) {
        for f in self.fields_mut() {
            f.set_mark(0);
        }
    }

    /// Whether `self` and `other` are equal as mutual multi-sets of fields:
    /// every field in `self` has a matching (name, value) in `other` and
    /// vice versa (order-independent, duplicates counted).
    pub fn mset_eq(&self, other: &Record) -> bool {
        let mut a: Vec<(&str, &str)> = self.fields().map(|f| (f.name(), f.value())).collect();
        let mut b: Vec<(&str, &str)> = other.fields().map(|f| (f.name(), f.value())).collect();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    /// Whether the record has no fields (comments alone don't count).
    pub fn is_empty(&self) -> bool {
        self.elems.count(Kind::Concrete) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (n, v) in pairs {
            r.push_field(Field::new(*n, *v));
        }
        r
    }

    #[test]
    fn num_fields_by_name_counts_only_matching() {
        let r = rec(&[("A", "1"), ("B", "2"), ("A", "3")]);
        assert_eq!(r.num_fields_by_name("A"), 2);
        assert_eq!(r.num_fields_by_name("Z"), 0);
    }

    #[test]
    fn remove_field_by_name_all_vs_one() {
        let mut r = rec(&[("A", "1"), ("B", "2"), ("A", "3")]);
        assert_eq!(r.remove_field_by_name("A", Some(0)), 1);
        assert_eq!(r.num_fields_by_name("A"), 1);
        assert_eq!(r.field_by_name("A", 0).unwrap().value(), "3");

        let mut r2 = rec(&[("A", "1"), ("B", "2"), ("A", "3")]);
        assert_eq!(r2.remove_field_by_name("A", None), 2);
        assert_eq!(r2.num_fields_by_name("A"), 0);
    }

    #[test]
    fn uniq_keeps_earliest() {
        let mut r = rec(&[("A", "1"), ("B", "2"), ("A", "1")]);
        r.uniq();
        let vals: Vec<_> = r.fields().map(|f| (f.name(), f.value())).collect();
        assert_eq!(vals, vec![("A", "1"), ("B", "2")]);
    }

    #[test]
    fn contains_value_and_field() {
        let r = rec(&[("Title", "Unix Haters")]);
        assert!(r.contains_value("Haters", false));
        assert!(!r.contains_value("haters", false));
        assert!(r.contains_value("haters", true));
        assert!(r.contains_field("Title", "Unix Haters"));
    }

    #[test]
    fn mset_eq_is_order_independent() {
        let a = rec(&[("A", "1"), ("B", "2")]);
        let b = rec(&[("B", "2"), ("A", "1")]);
        assert!(a.mset_eq(&b));
    }

    proptest::proptest! {
        /// `uniq` is idempotent: running it twice is the same as running it
        /// once, no matter which (name, value) pairs repeat.
        #[test]
        fn uniq_is_idempotent(pairs in proptest::collection::vec(("[A-Za-z]{1,4}", "[a-z0-9]{0,4}"), 0..12)) {
            let mut r = rec(&pairs.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect::<Vec<_>>());
            r.uniq();
            let once: Vec<_> = r.fields().map(|f| (f.name().to_string(), f.value().to_string())).collect();
            r.uniq();
            let twice: Vec<_> = r.fields().map(|f| (f.name().to_string(), f.value().to_string())).collect();
            prop_assert_eq!(once, twice);
        }
    }
}
