//! `QueryFlags`: the `REC_F_*` bit flags shared by query/insert/delete/set.

use bitflags::bitflags;

bitflags! {
    /// Behavior switches shared by [`crate::query::query`],
    /// [`crate::mutate::insert`], [`crate::mutate::delete`], and
    /// [`crate::mutate::set`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct QueryFlags: u32 {
        /// Copy the source record set's descriptor into a query's result.
        const DESCRIPTOR = 1;
        /// Case-insensitive matching for `fast_string` selection.
        const ICASE = 2;
        /// Apply [`recdb_core::Record::uniq`] to each result/mutated record.
        const UNIQ = 4;
        /// Skip auto-field generation on insert.
        const NOAUTO = 8;
        /// On delete, convert matched records to comments instead of
        /// removing them.
        const COMMENT_OUT = 16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine_and_test_independently() {
        let f = QueryFlags::ICASE | QueryFlags::UNIQ;
        assert!(f.contains(QueryFlags::ICASE));
        assert!(f.contains(QueryFlags::UNIQ));
        assert!(!f.contains(QueryFlags::DESCRIPTOR));
    }
}
