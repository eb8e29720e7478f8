//! The database: an ordered list of record sets.

use crate::rset::RSet;

/// An ordered list of record sets.
///
/// The aggregate-function registry lives one layer up, in
/// `recdb-agg`/`recdb`'s facade: putting it here would make `recdb-core`
/// depend on the aggregate crate, which itself depends on `recdb-core` for
/// [`Record`](crate::Record) — a cycle. See `DESIGN.md`.
#[derive(Clone, Debug, Default)]
pub struct Database {
    rsets: Vec<RSet>,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of record sets.
    pub fn len(&self) -> usize {
        self.rsets.len()
    }

    /// Whether the database has no record sets.
    pub fn is_empty(&self) -> bool {
        self.rsets.is_empty()
    }

    /// Iterates over every record set, in order.
    pub fn rsets(&self) -> impl Iterator<Item = &RSet> {
        self.rsets.iter()
    }

    /// Iterates mutably over every record set.
    pub fn rsets_mut(&mut self) -> impl Iterator<Item = &mut RSet> {
        self.rsets.iter_mut()
    }

    /// The record set at `pos`, if any.
    pub fn get(&self, pos: usize) -> Option<&RSet> {
        self.rsets.get(pos)
    }

    /// The record set at `pos`, mutably, if any.
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut RSet> {
        self.rsets.get_mut(pos)
    }

    /// The record set named `name`, if present. Passing `None` looks up the
    /// default (unnamed) record set.
    pub fn by_type(&self, name: Option<&str>) -> Option<&RSet> {
        self.rsets.iter().find(|r| r.type_name() == name)
    }

    /// The record set named `name`, mutably.
    pub fn by_type_mut(&mut self, name: Option<&str>) -> Option<&mut RSet> {
        self.rsets.iter_mut().find(|r| r.type_name() == name)
    }

    /// Whether a record set named `name` exists.
    pub fn type_p(&self, name: &str) -> bool {
        self.rsets.iter().any(|r| r.type_name() == Some(name))
    }

    /// Inserts `rset` at `pos`. The default (unnamed) record set, if any,
    /// stays at position 0 after the insert: if `rset` has no type name and
    /// `pos != 0`, it is placed at the front instead; if `rset` has a type
    /// name and a default record set already occupies position 0, the new
    /// record set is placed after it.
    pub fn insert_rset(&mut self, pos: usize, rset: RSet) {
        let has_default_at_zero = self.rsets.first().map(|r| r.type_name().is_none()).unwrap_or(false);
        let is_default = rset.type_name().is_none();
        let actual_pos = if is_default {
            0
        } else if has_default_at_zero {
            pos.max(1)
        } else {
            pos
        };
        let actual_pos = actual_pos.min(self.rsets.len());
        self.rsets.insert(actual_pos, rset);
    }

    /// Appends `rset` at the end (subject to the same default-set-first
    /// invariant as [`Database::insert_rset`]).
    pub fn append_rset(&mut self, rset: RSet) {
        let pos = self.rsets.len();
        self.insert_rset(pos, rset);
    }

    /// Removes and returns the record set at `pos`.
    pub fn remove_rset(&mut self, pos: usize) -> Option<RSet> {
        if pos < self.rsets.len() {
            Some(self.rsets.remove(pos))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> RSet {
        let mut r = RSet::new();
        let mut d = crate::Record::new();
        d.push_field(crate::Field::new("%rec", name));
        r.set_descriptor(Some(d));
        r
    }

    #[test]
    fn default_rset_stays_at_zero() {
        let mut db = Database::new();
        db.append_rset(named("Book"));
        db.append_rset(RSet::new()); // default/unnamed
        assert!(db.get(0).unwrap().type_name().is_none());
        assert_eq!(db.get(1).unwrap().type_name(), Some("Book"));
    }

    #[test]
    fn by_type_lookup() {
        let mut db = Database::new();
        db.append_rset(named("Book"));
        assert!(db.type_p("Book"));
        assert!(!db.type_p("Movie"));
        assert!(db.by_type(Some("Book")).is_some());
    }
}
