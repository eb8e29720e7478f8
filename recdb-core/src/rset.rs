//! Record sets: ordered multi-sets of records and comments, with a
//! descriptor that derives a whole block of per-field configuration
//!

use std::collections::{HashMap, HashSet};

use crate::field::Comment;
use crate::mset::{Kind, MSet, MSetElem};
use crate::record::Record;
use crate::types::{Type, TypeRegistry};

/// One element of an [`RSet`]'s multi-set: a record or a comment.
#[derive(Clone, Debug)]
pub enum RSetElem {
    /// A data record.
    Record(Record),
    /// A `#`-prefixed comment.
    Comment(Comment),
}

impl MSetElem for RSetElem {
    fn kind(&self) -> Kind {
        match self {
            RSetElem::Record(_) => Kind::Concrete,
            RSetElem::Comment(_) => Kind::Comment,
        }
    }
}

impl RSetElem {
    /// The record inside this element, if it is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            RSetElem::Record(r) => Some(r),
            RSetElem::Comment(_) => None,
        }
    }

    /// The record inside this element, mutably, if it is one.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            RSetElem::Record(r) => Some(r),
            RSetElem::Comment(_) => None,
        }
    }
}

/// Per-field properties derived from the descriptor.
#[derive(Clone, Debug, Default)]
pub struct FieldProps {
    /// Whether this field is the primary key (`%key:`).
    pub is_key: bool,
    /// Whether this field is auto-generated (`%auto:`).
    pub is_auto: bool,
    /// Whether this field is confidential/encryptable (`%confidential:`).
    pub is_confidential: bool,
    /// An inline (anonymous) type declared for this field via `%type:`.
    pub anonymous_type: Option<Type>,
    /// A named-type reference declared for this field via `%type:`,
    /// resolved through the record set's [`TypeRegistry`].
    pub named_type: Option<String>,
}

/// Size-count bounds for a record set, derived from `%size:`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeBounds {
    /// Minimum allowed number of records (inclusive).
    pub min: u64,
    /// Maximum allowed number of records (inclusive).
    pub max: u64,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self { min: 0, max: u64::MAX }
    }
}

/// All state derived from a record set's descriptor. Rebuilt from scratch
/// every time the descriptor is replaced (a full rebuild, not a patch).
#[derive(Clone, Debug, Default)]
pub struct Derived {
    /// The record type named by `%rec:`, if any (`None` for the default
    /// unnamed record set).
    pub rec_type: Option<String>,
    /// The URL or path of an external descriptor to merge, from `%rec:`.
    pub external: Option<String>,
    /// Per-field properties, keyed by field name.
    pub field_props: HashMap<String, FieldProps>,
    /// Named types and synonyms declared by `%typedef:`.
    pub registry: TypeRegistry,
    /// The primary key field name, from `%key:`.
    pub key: Option<String>,
    /// Field names that must appear at least once (`%mandatory:`).
    pub mandatory: HashSet<String>,
    /// Field names that must appear at most once (`%unique:`).
    pub unique: HashSet<String>,
    /// Field names that must never appear (`%prohibit:`).
    pub prohibit: HashSet<String>,
    /// The set of allowed field names (`%allowed:`), if declared.
    pub allowed: Option<HashSet<String>>,
    /// Field names marked confidential, in declaration order.
    pub confidential: Vec<String>,
    /// Field names marked auto-generated, in declaration order.
    pub auto: Vec<String>,
    /// Record-count bounds, from `%size:`.
    pub size: SizeBounds,
    /// The default sort/group key, from `%sort:`.
    pub sort_key: Vec<String>,
    /// Raw (uncompiled) SEX source of every `%constraint:` directive.
    ///
    /// Compiling these into predicates requires `recdb-expr`, which depends
    /// on this crate; compiling them here would be a dependency cycle, so
    /// `recdb-core` only stores the source text. `recdb-query`'s integrity
    /// checker and query engine compile and evaluate them.
    pub constraints: Vec<String>,
}

/// An ordered multi-set of records and comments, an optional descriptor, and
/// the descriptor-derived state.
#[derive(Clone, Debug, Default)]
pub struct RSet {
    elems: MSet<RSetElem>,
    descriptor: Option<Record>,
    /// Number of comments preceding the descriptor in source order; used by
    /// the writer to re-emit the descriptor at the same relative spot.
    descriptor_position: usize,
    derived: Derived,
}

impl RSet {
    /// Creates an empty, undescribed record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record type name, if this is not the default unnamed set.
    pub fn type_name(&self) -> Option<&str> {
        self.derived.rec_type.as_deref()
    }

    /// The descriptor record, if any.
    pub fn descriptor(&self) -> Option<&Record> {
        self.descriptor.as_ref()
    }

    /// The descriptor's relative position (number of leading comments
    /// before it).
    pub fn descriptor_position(&self) -> usize {
        self.descriptor_position
    }

    /// Sets the descriptor's relative position.
    pub fn set_descriptor_position(&mut self, pos: usize) {
        self.descriptor_position = pos;
    }

    /// Replaces the descriptor and rebuilds all derived state atomically.
    pub fn set_descriptor(&mut self, descriptor: Option<Record>) {
        self.derived = match &descriptor {
            Some(rec) => Derived::from_descriptor(rec),
            None => Derived::default(),
        };
        self.descriptor = descriptor;
    }

    /// Read-only access to the derived state.
    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    /// Appends a record.
    pub fn push_record(&mut self, record: Record) {
        self.elems.append(RSetElem::Record(record));
    }

    /// Appends a comment.
    pub fn push_comment(&mut self, comment: Comment) {
        self.elems.append(RSetElem::Comment(comment));
    }

    /// Appends a raw element.
    pub fn push_elem(&mut self, elem: RSetElem) {
        self.elems.append(elem);
    }

    /// Appends every element of `other` onto the end of `self`, leaving
    /// `other` empty. Used by the parser to fold a second unnamed record
    /// set into the database's one default record set; `other`'s
    /// descriptor (if any) is discarded, since unnamed record sets never
    /// carry one.
    pub fn merge_elems_from(&mut self, other: &mut RSet) {
        self.elems.append_all(&mut other.elems);
    }

    /// Iterates over every element (records and comments), in order.
    pub fn elems(&self) -> impl DoubleEndedIterator<Item = &RSetElem> {
        self.elems.iter()
    }

    /// Iterates mutably over every element.
    pub fn elems_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut RSetElem> {
        self.elems.iter_mut()
    }

    /// Iterates over every record, ignoring comments.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.elems.iter().filter_map(RSetElem::as_record)
    }

    /// Iterates over every record mutably, ignoring comments.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.elems.iter_mut().filter_map(RSetElem::as_record_mut)
    }

    /// Number of records (not counting comments or the descriptor).
    pub fn num_records(&self) -> usize {
        self.elems.count(Kind::Concrete)
    }

    /// Removes the record at position `idx` among records (0-based,
    /// ignoring comments), returning it if present.
    pub fn remove_record(&mut self, idx: usize) -> Option<Record> {
        let pos = self.elems.iter_kind(Kind::Concrete).nth(idx).map(|(p, _)| p)?;
        self.elems.remove_at(pos).and_then(|e| match e {
            RSetElem::Record(r) => Some(r),
            RSetElem::Comment(_) => None,
        })
    }

    /// Replaces the record at position `idx` among records with `new`.
    pub fn replace_record(&mut self, idx: usize, new: Record) -> bool {
        if let Some((pos, _)) = self.elems.iter_kind(Kind::Concrete).nth(idx) {
            if let Some(slot) = self.elems.get_at_mut(pos) {
                *slot = RSetElem::Record(new);
                return true;
            }
        }
        false
    }

    /// Converts the record at position `idx` among records into a comment
    /// in place, via [`Record::to_comment`]. Goes through `remove_at`/
    /// `insert_at` rather than overwriting the slot directly, since the
    /// element's [`Kind`] changes from `Concrete` to `Comment` and only
    /// those two methods keep the multi-set's per-kind counts consistent.
    pub fn comment_out_record(&mut self, idx: usize) -> bool {
        let Some(pos) = self.elems.iter_kind(Kind::Concrete).nth(idx).map(|(p, _)| p) else {
            return false;
        };
        match self.elems.remove_at(pos) {
            Some(RSetElem::Record(r)) => {
                self.elems.insert_at(pos, RSetElem::Comment(r.to_comment()));
                true
            }
            Some(other) => {
                self.elems.insert_at(pos, other);
                false
            }
            None => false,
        }
    }

    /// The resolved [`Type`] for field `name`, if declared (directly or via
    /// the type registry).
    pub fn type_of(&self, name: &str) -> Option<&Type> {
        let props = self.derived.field_props.get(name)?;
        if let Some(ty) = &props.anonymous_type {
            return Some(ty);
        }
        if let Some(named) = &props.named_type {
            return self.derived.registry.resolve(named);
        }
        None
    }

    /// Sets the sort/group key (if `key` is given) and stably sorts the
    /// record multi-set by it, using each field's typed comparator.
    ///
    /// Missing-field rule: if a key field is
    /// absent from one record, that record sorts before the other; if
    /// absent from both, the comparison still yields "less" rather than
    /// "equal" — an intentionally non-reflexive quirk inherited from the
    /// original implementation, reproduced here for round-trip fidelity of
    /// already-sorted inputs.
    pub fn sort(&mut self, key: Option<Vec<String>>) {
        if let Some(k) = key {
            self.derived.sort_key = k;
        }
        let sort_key = self.derived.sort_key.clone();
        if sort_key.is_empty() {
            return;
        }
        // Extract records, sort, and splice back into their original slots
        // so interleaved comments keep their absolute positions.
        let positions: Vec<usize> = self
            .elems
            .iter_kind(Kind::Concrete)
            .map(|(pos, _)| pos)
            .collect();
        let mut records: Vec<Record> = positions
            .iter()
            .map(|&pos| match self.elems.get_at(pos).unwrap() {
                RSetElem::Record(r) => r.clone(),
                RSetElem::Comment(_) => unreachable!(),
            })
            .collect();
        records.sort_by(|a, b| self.compare_by_key(a, b, &sort_key));
        for (pos, rec) in positions.into_iter().zip(records.into_iter()) {
            *self.elems.get_at_mut(pos).unwrap() = RSetElem::Record(rec);
        }
    }

    fn compare_by_key(&self, a: &Record, b: &Record, key: &[String]) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        for field_name in key {
            let ty = self.type_of(field_name);
            let av = a.field_by_name(field_name, 0).map(|f| f.value());
            let bv = b.field_by_name(field_name, 0).map(|f| f.value());
            let ord = match (av, bv) {
                (None, None) => Ordering::Less,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => match ty {
                    Some(ty) => ty.values_cmp(x, y),
                    None => x.cmp(y),
                },
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Groups the record multi-set by `key`, assuming it is already sorted
    /// by that key. Consecutive records whose key-tuples compare
    /// equal are merged into the first occurrence; non-key fields of later
    /// records are appended, and the later records are removed.
    pub fn group(&mut self, key: &[String]) {
        if key.is_empty() {
            return;
        }
        let positions: Vec<usize> = self
            .elems
            .iter_kind(Kind::Concrete)
            .map(|(pos, _)| pos)
            .collect();
        let mut to_remove: HashSet<usize> = HashSet::new();
        let mut i = 0;
        while i < positions.len() {
            let head_pos = positions[i];
            let mut j = i + 1;
            while j < positions.len() {
                let same = {
                    let head = self.elems.get_at(head_pos).unwrap().as_record().unwrap();
                    let next = self.elems.get_at(positions[j]).unwrap().as_record().unwrap();
                    key.iter().all(|k| {
                        let ty = self.type_of(k);
                        let hv = head.field_by_name(k, 0).map(|f| f.value());
                        let nv = next.field_by_name(k, 0).map(|f| f.value());
                        match (hv, nv) {
                            (Some(x), Some(y)) => match ty {
                                Some(ty) => ty.values_cmp(x, y) == std::cmp::Ordering::Equal,
                                None => x == y,
                            },
                            (None, None) => true,
                            _ => false,
                        }
                    })
                };
                if !same {
                    break;
                }
                // Merge next's non-key fields into head.
                let merged_fields: Vec<_> = {
                    let next = self.elems.get_at(positions[j]).unwrap().as_record().unwrap();
                    next.fields()
                        .filter(|f| !key.iter().any(|k| k == f.name()))
                        .cloned()
                        .collect()
                };
                if let Some(head) = self.elems.get_at_mut(head_pos).unwrap().as_record_mut() {
                    for f in merged_fields {
                        head.push_field(f);
                    }
                }
                to_remove.insert(positions[j]);
                j += 1;
            }
            i = j;
        }
        let mut sorted: Vec<usize> = to_remove.into_iter().collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a)); // remove back-to-front
        for pos in sorted {
            self.elems.remove_at(pos);
        }
    }

    /// For each declared auto field not already present in `record`,
    /// prepends a generated value.
    pub fn add_auto_fields(&self, record: &mut Record) {
        for name in &self.derived.auto {
            if record.num_fields_by_name(name) > 0 {
                continue;
            }
            let ty = self.type_of(name);
            let value = match ty.map(|t| t.kind()) {
                Some(crate::types::TypeKind::Int) | Some(crate::types::TypeKind::Range { .. })
                | None => {
                    // An auto field with no explicit type defaults to `int`.
                    let max = self
                        .records()
                        .filter_map(|r| r.field_by_name(name, 0))
                        .filter_map(|f| crate::types::parse_int(f.value()))
                        .max()
                        .unwrap_or(0);
                    Some((max + 1).to_string())
                }
                Some(crate::types::TypeKind::Date) => {
                    Some(chrono::Local::now().format("%a, %d %b %Y %T %z").to_string())
                }
                #[cfg(feature = "uuid")]
                Some(crate::types::TypeKind::Uuid) => Some(new_time_based_uuid()),
                _ => None,
            };
            if let Some(value) = value {
                let mut new_field = crate::Field::new(name.clone(), value);
                new_field.set_mark(0);
                prepend_field(record, new_field);
            }
        }
    }
}

#[cfg(feature = "uuid")]
fn new_time_based_uuid() -> String {
    let context = uuid::timestamp::context::NoContext;
    let ts = uuid::Timestamp::now(context);
    uuid::Uuid::new_v1(ts, &[1, 2, 3, 4, 5, 6]).to_string()
}

fn prepend_field(record: &mut Record, field: crate::Field) {
    let mut elems: Vec<_> = record.elems().cloned().collect();
    elems.insert(0, crate::record::RecordElem::Field(field));
    let mut new_record = Record::new();
    new_record.set_source_position(record.source_position());
    for e in elems {
        new_record.push_elem(e);
    }
    *record = new_record;
}

impl Derived {
    fn from_descriptor(descriptor: &Record) -> Self {
        let mut derived = Derived::default();
        for field in descriptor.fields() {
            match field.name() {
                "%rec" => {
                    let mut parts = field.value().splitn(2, char::is_whitespace);
                    derived.rec_type = parts.next().map(|s| s.trim().to_string());
                    derived.external = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
                }
                "%type" => apply_type(&mut derived, field.value()),
                "%typedef" => apply_typedef(&mut derived, field.value()),
                "%key" => derived.key = Some(field.value().trim().to_string()),
                "%auto" => {
                    for name in csv_or_ws(field.value()) {
                        derived.auto.push(name.clone());
                        derived.field_props.entry(name).or_default().is_auto = true;
                    }
                }
                "%mandatory" => derived.mandatory.extend(csv_or_ws(field.value())),
                "%unique" => derived.unique.extend(csv_or_ws(field.value())),
                "%prohibit" => derived.prohibit.extend(csv_or_ws(field.value())),
                "%allowed" => derived
                    .allowed
                    .get_or_insert_with(HashSet::new)
                    .extend(csv_or_ws(field.value())),
                "%confidential" => {
                    for name in csv_or_ws(field.value()) {
                        derived.confidential.push(name.clone());
                        derived.field_props.entry(name).or_default().is_confidential = true;
                    }
                }
                "%size" => {
                    if let Some(bounds) = parse_size_directive(field.value()) {
                        derived.size = bounds;
                    }
                }
                "%sort" => derived.sort_key = csv_or_ws(field.value()),
                "%constraint" => derived.constraints.push(field.value().to_string()),
                _ => {}
            }
            if let Some(key) = &derived.key {
                derived.field_props.entry(key.clone()).or_default().is_key = true;
            }
        }
        derived
    }
}

fn apply_type(derived: &mut Derived, value: &str) {
    let (fex, descr) = match value.split_once(char::is_whitespace) {
        Some((a, b)) => (a, b.trim()),
        None => return,
    };
    for name in fex.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Ok(ty) = Type::new(descr) {
            derived.field_props.entry(name.to_string()).or_default().anonymous_type = Some(ty);
        } else {
            derived.field_props.entry(name.to_string()).or_default().named_type =
                Some(descr.to_string());
        }
    }
}

fn apply_typedef(derived: &mut Derived, value: &str) {
    let (name, descr) = match value.split_once(char::is_whitespace) {
        Some((a, b)) => (a.trim(), b.trim()),
        None => return,
    };
    match Type::new(descr) {
        Ok(ty) => derived.registry.insert(name, ty),
        Err(_) => derived.registry.insert_synonym(name, descr),
    }
}

fn csv_or_ws(value: &str) -> Vec<String> {
    if value.contains(',') {
        value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    } else {
        value.split_whitespace().map(String::from).collect()
    }
}

fn parse_size_directive(value: &str) -> Option<SizeBounds> {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix("<=") {
        let n: u64 = rest.trim().parse().ok()?;
        Some(SizeBounds { min: 0, max: n })
    } else if let Some(rest) = value.strip_prefix('<') {
        let n: u64 = rest.trim().parse().ok()?;
        Some(SizeBounds { min: 0, max: n.saturating_sub(1) })
    } else if let Some(rest) = value.strip_prefix(">=") {
        let n: u64 = rest.trim().parse().ok()?;
        Some(SizeBounds { min: n, max: u64::MAX })
    } else if let Some(rest) = value.strip_prefix('>') {
        let n: u64 = rest.trim().parse().ok()?;
        Some(SizeBounds { min: n + 1, max: u64::MAX })
    } else {
        let n: u64 = value.parse().ok()?;
        Some(SizeBounds { min: n, max: n })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    fn descr(fields: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (n, v) in fields {
            r.push_field(Field::new(*n, *v));
        }
        r
    }

    #[test]
    fn descriptor_rebuild_sets_key_and_type() {
        let mut rset = RSet::new();
        rset.set_descriptor(Some(descr(&[
            ("%rec", "Book"),
            ("%key", "Id"),
            ("%type", "Id int"),
            ("%mandatory", "Title"),
        ])));
        assert_eq!(rset.type_name(), Some("Book"));
        assert!(rset.derived().field_props["Id"].is_key);
        assert!(matches!(rset.type_of("Id").unwrap().kind(), crate::types::TypeKind::Int));
        assert!(rset.derived().mandatory.contains("Title"));
    }

    #[test]
    fn size_directive_variants() {
        assert_eq!(parse_size_directive("3").unwrap(), SizeBounds { min: 3, max: 3 });
        assert_eq!(parse_size_directive("<5").unwrap(), SizeBounds { min: 0, max: 4 });
        assert_eq!(parse_size_directive(">=2").unwrap(), SizeBounds { min: 2, max: u64::MAX });
    }

    #[test]
    fn sort_orders_by_typed_key_missing_fields_come_first() {
        let mut rset = RSet::new();
        rset.set_descriptor(Some(descr(&[("%rec", "Book"), ("%type", "Year int")])));
        let mut r1 = Record::new();
        r1.push_field(Field::new("Year", "2019"));
        let mut r2 = Record::new();
        r2.push_field(Field::new("Year", "1994"));
        let mut r3 = Record::new(); // no Year field
        r3.push_field(Field::new("Title", "no year"));
        rset.push_record(r1);
        rset.push_record(r2);
        rset.push_record(r3);
        rset.sort(Some(vec!["Year".to_string()]));
        let years: Vec<_> = rset
            .records()
            .map(|r| r.field_by_name("Year", 0).map(|f| f.value().to_string()))
            .collect();
        assert_eq!(years, vec![None, Some("1994".to_string()), Some("2019".to_string())]);
    }

    #[test]
    fn group_merges_consecutive_matching_keys() {
        let mut rset = RSet::new();
        rset.set_descriptor(Some(descr(&[("%rec", "X")])));
        let mut r1 = Record::new();
        r1.push_field(Field::new("K", "a"));
        r1.push_field(Field::new("V", "1"));
        let mut r2 = Record::new();
        r2.push_field(Field::new("K", "a"));
        r2.push_field(Field::new("V", "2"));
        let mut r3 = Record::new();
        r3.push_field(Field::new("K", "b"));
        r3.push_field(Field::new("V", "3"));
        rset.push_record(r1);
        rset.push_record(r2);
        rset.push_record(r3);
        rset.group(&["K".to_string()]);
        assert_eq!(rset.num_records(), 2);
        let first = rset.records().next().unwrap();
        let vs: Vec<_> = first.fields().filter(|f| f.name() == "V").map(|f| f.value()).collect();
        assert_eq!(vs, vec!["1", "2"]);
    }

    #[test]
    fn comment_out_record_preserves_kind_counts() {
        let mut rset = RSet::new();
        let mut r1 = Record::new();
        r1.push_field(Field::new("A", "1"));
        rset.push_record(r1);
        let mut r2 = Record::new();
        r2.push_field(Field::new("A", "2"));
        rset.push_record(r2);
        assert!(rset.comment_out_record(0));
        assert_eq!(rset.num_records(), 1);
        assert_eq!(rset.records().next().unwrap().field_by_name("A", 0).unwrap().value(), "2");
    }

    #[test]
    fn add_auto_fields_uses_max_plus_one() {
        let mut rset = RSet::new();
        rset.set_descriptor(Some(descr(&[("%rec", "Book"), ("%auto", "Id"), ("%type", "Id int")])));
        let mut r1 = Record::new();
        r1.push_field(Field::new("Id", "7"));
        rset.push_record(r1);
        let mut new_rec = Record::new();
        new_rec.push_field(Field::new("Title", "new"));
        rset.add_auto_fields(&mut new_rec);
        assert_eq!(new_rec.field_by_name("Id", 0).unwrap().value(), "8");
    }

    proptest::proptest! {
        /// Sorting by key is stable: among records sharing a key value, their
        /// original relative order survives the sort.
        #[test]
        fn sort_is_stable(keys in proptest::collection::vec(0i64..4, 1..20)) {
            let mut rset = RSet::new();
            rset.set_descriptor(Some(descr(&[("%rec", "X"), ("%type", "Key int")])));
            for (tag, key) in keys.iter().enumerate() {
                let mut r = Record::new();
                r.push_field(Field::new("Key", key.to_string()));
                r.push_field(Field::new("Tag", tag.to_string()));
                rset.push_record(r);
            }
            rset.sort(Some(vec!["Key".to_string()]));
            let mut seen_tags_by_key: std::collections::HashMap<i64, Vec<usize>> = std::collections::HashMap::new();
            for r in rset.records() {
                let key: i64 = r.field_by_name("Key", 0).unwrap().value().parse().unwrap();
                let tag: usize = r.field_by_name("Tag", 0).unwrap().value().parse().unwrap();
                seen_tags_by_key.entry(key).or_default().push(tag);
            }
            for tags in seen_tags_by_key.values() {
                let mut sorted = tags.clone();
                sorted.sort_unstable();
                prop_assert_eq!(tags, &sorted);
            }
        }
    }
}
