//! An ordered, heterogeneous list of typed elements with per-kind counts.
//!
//! [`Record`](crate::Record) is a multi-set of fields and comments; a
//! [`RSet`](crate::RSet) is a multi-set of records and comments. Both reuse
//! this module instead of hand-rolling their own bookkeeping, the way the
//! original C implementation shared a single `rec_mset_t` for both.

use std::cmp::Ordering;

/// The two coarse kinds an [`MSet`] element can be.
///
/// Mixed sets (records holding fields+comments, record sets holding
/// records+comments) only ever need to distinguish "a comment" from
/// "everything else", because ordering and filtering rules only ever care
/// about that distinction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// A comment element.
    Comment,
    /// A concrete element (a field, or a record).
    Concrete,
}

/// Implemented by anything stored in an [`MSet`].
pub trait MSetElem {
    /// The coarse kind of this element.
    fn kind(&self) -> Kind;
}

/// An ordered multi-set of `T`, tracking how many elements of each [`Kind`]
/// it currently holds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MSet<T> {
    elems: Vec<T>,
    comment_count: usize,
    concrete_count: usize,
}

impl<T> Default for MSet<T> {
    fn default() -> Self {
        Self {
            elems: Vec::new(),
            comment_count: 0,
            concrete_count: 0,
        }
    }
}

impl<T: MSetElem> MSet<T> {
    /// Creates an empty multi-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements of the given kind.
    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Comment => self.comment_count,
            Kind::Concrete => self.concrete_count,
        }
    }

    /// Total number of elements, of any kind.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether the multi-set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Returns the element at position `pos`, if any.
    pub fn get_at(&self, pos: usize) -> Option<&T> {
        self.elems.get(pos)
    }

    /// Returns a mutable reference to the element at position `pos`, if any.
    pub fn get_at_mut(&mut self, pos: usize) -> Option<&mut T> {
        self.elems.get_mut(pos)
    }

    /// Inserts `data` at position `pos`, shifting later elements right.
    pub fn insert_at(&mut self, pos: usize, data: T) {
        self.bump(data.kind(), 1);
        self.elems.insert(pos.min(self.elems.len()), data);
    }

    /// Inserts `data` immediately after position `pos`.
    pub fn insert_after(&mut self, pos: usize, data: T) {
        self.insert_at(pos + 1, data);
    }

    /// Appends `data` at the end of the multi-set.
    pub fn append(&mut self, data: T) {
        self.bump(data.kind(), 1);
        self.elems.push(data);
    }

    /// Inserts `data` into its sorted position according to `cmp`, keeping
    /// the multi-set ordered; ties keep existing elements first (stable).
    pub fn add_sorted<F>(&mut self, data: T, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let pos = self
            .elems
            .iter()
            .position(|e| cmp(&data, e) == Ordering::Less)
            .unwrap_or(self.elems.len());
        self.insert_at(pos, data);
    }

    /// Removes and returns the element at position `pos`, if any.
    pub fn remove_at(&mut self, pos: usize) -> Option<T> {
        if pos >= self.elems.len() {
            return None;
        }
        let removed = self.elems.remove(pos);
        match removed.kind() {
            Kind::Comment => self.comment_count -= 1,
            Kind::Concrete => self.concrete_count -= 1,
        }
        Some(removed)
    }

    /// Removes every element for which `pred` returns true, preserving the
    /// relative order of the remaining elements.
    pub fn retain<F>(&mut self, mut pred: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut comment_count = 0;
        let mut concrete_count = 0;
        self.elems.retain(|e| {
            let keep = pred(e);
            if keep {
                match e.kind() {
                    Kind::Comment => comment_count += 1,
                    Kind::Concrete => concrete_count += 1,
                }
            }
            keep
        });
        self.comment_count = comment_count;
        self.concrete_count = concrete_count;
    }

    /// Iterates over every element, in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.elems.iter()
    }

    /// Iterates mutably over every element, in order.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> {
        self.elems.iter_mut()
    }

    /// Iterates over every element of a given kind, in order, paired with
    /// its position in the whole multi-set.
    pub fn iter_kind(&self, kind: Kind) -> impl Iterator<Item = (usize, &T)> {
        self.elems
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.kind() == kind)
    }

    /// Finds the first element for which `pred` holds, with its position.
    pub fn search<F>(&self, mut pred: F) -> Option<(usize, &T)>
    where
        F: FnMut(&T) -> bool,
    {
        self.elems.iter().enumerate().find(|(_, e)| pred(e))
    }

    /// Sorts the whole multi-set with `cmp`, stably.
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.elems.sort_by(cmp);
    }

    /// Drains and returns every element, leaving the multi-set empty.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.comment_count = 0;
        self.concrete_count = 0;
        std::mem::take(&mut self.elems)
    }

    /// Appends every element of `other` onto `self`, leaving `other` empty.
    pub fn append_all(&mut self, other: &mut MSet<T>) {
        for e in other.drain_all() {
            self.append(e);
        }
    }

    fn bump(&mut self, kind: Kind, delta: usize) {
        debug_assert_eq!(delta, 1, "bump is only ever called to account for an insert");
        match kind {
            Kind::Comment => self.comment_count += delta,
            Kind::Concrete => self.concrete_count += delta,
        }
    }
}

impl<T: MSetElem + Clone> MSet<T> {
    /// Deep-duplicates the multi-set (every element is cloned).
    pub fn duplicate(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum E {
        C(&'static str),
        V(i32),
    }

    impl MSetElem for E {
        fn kind(&self) -> Kind {
            match self {
                E::C(_) => Kind::Comment,
                E::V(_) => Kind::Concrete,
            }
        }
    }

    #[test]
    fn counts_track_append_and_remove() {
        let mut m: MSet<E> = MSet::new();
        m.append(E::V(1));
        m.append(E::C("hi"));
        m.append(E::V(2));
        assert_eq!(m.count(Kind::Concrete), 2);
        assert_eq!(m.count(Kind::Comment), 1);
        m.remove_at(1);
        assert_eq!(m.count(Kind::Comment), 0);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn add_sorted_is_stable_on_ties() {
        let mut m: MSet<E> = MSet::new();
        m.add_sorted(E::V(3), |a, b| match (a, b) {
            (E::V(x), E::V(y)) => x.cmp(y),
            _ => Ordering::Equal,
        });
        m.add_sorted(E::V(1), |a, b| match (a, b) {
            (E::V(x), E::V(y)) => x.cmp(y),
            _ => Ordering::Equal,
        });
        m.add_sorted(E::V(1), |a, b| match (a, b) {
            (E::V(x), E::V(y)) => x.cmp(y),
            _ => Ordering::Equal,
        });
        let vals: Vec<_> = m.iter().cloned().collect();
        assert_eq!(vals, vec![E::V(1), E::V(1), E::V(3)]);
    }

    #[test]
    fn retain_recomputes_counts() {
        let mut m: MSet<E> = MSet::new();
        m.append(E::V(1));
        m.append(E::C("x"));
        m.append(E::V(2));
        m.retain(|e| !matches!(e, E::C(_)));
        assert_eq!(m.count(Kind::Comment), 0);
        assert_eq!(m.count(Kind::Concrete), 2);
    }
}
