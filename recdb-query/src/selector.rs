//! The record-selection machinery shared by query/insert/delete/set:
//! index ranges, a compiled `sex`, a `fast_string`, or `random`.

use std::collections::HashSet;

use rand::Rng;
use recdb_core::Record;
use recdb_expr::Sex;

use crate::error::QueryError;

/// An inclusive `[min, max]` span of 0-based record positions.
///
/// The original represents an index list as a sentinel-terminated array of
/// `(min, max)` pairs (`(NOINDEX, NOINDEX)` marks the end); a `Vec` of this
/// type says the same thing without the sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    /// Inclusive lower bound.
    pub min: u64,
    /// Inclusive upper bound.
    pub max: u64,
}

impl IndexRange {
    /// A range containing a single index.
    pub fn single(i: u64) -> Self {
        IndexRange { min: i, max: i }
    }

    fn contains(&self, i: u64) -> bool {
        i >= self.min && i <= self.max
    }
}

/// How to pick which records a query/mutation applies to.
///
/// At most one of `index_list`, `sex`, `fast_string` may be set, and
/// `random` is mutually exclusive with all three; [`Selector::validate`]
/// enforces this.
#[derive(Clone, Debug, Default)]
pub struct Selector {
    /// Select records at these positions.
    pub index_list: Option<Vec<IndexRange>>,
    /// Select records this selection expression matches.
    pub sex: Option<Sex>,
    /// Select records containing this substring in any field value.
    pub fast_string: Option<String>,
    /// Select this many records chosen uniformly at random.
    pub random: u64,
}

impl Selector {
    /// No selector: every record is selected.
    pub fn none() -> Self {
        Self::default()
    }

    /// A selector by explicit index ranges.
    pub fn by_index(ranges: Vec<IndexRange>) -> Self {
        Selector {
            index_list: Some(ranges),
            ..Self::default()
        }
    }

    /// A selector by compiled selection expression.
    pub fn by_sex(sex: Sex) -> Self {
        Selector {
            sex: Some(sex),
            ..Self::default()
        }
    }

    /// A selector by substring.
    pub fn by_fast_string(needle: impl Into<String>) -> Self {
        Selector {
            fast_string: Some(needle.into()),
            ..Self::default()
        }
    }

    /// A selector of `n` random records.
    pub fn random(n: u64) -> Self {
        Selector {
            random: n,
            ..Self::default()
        }
    }

    /// Whether any non-random selector is present.
    pub(crate) fn has_explicit_selector(&self) -> bool {
        self.index_list.is_some() || self.sex.is_some() || self.fast_string.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), QueryError> {
        if self.random > 0 && self.has_explicit_selector() {
            return Err(QueryError::ConflictingSelectors);
        }
        Ok(())
    }
}

/// Resolves `selector` against a source of `num_records` records into a
/// concrete set of 0-based indices, for the `index_list`/`random` cases.
/// Returns `None` when selection should instead fall through to `sex`,
/// `fast_string`, or "select everything" (checked by [`selected_p`]).
pub(crate) fn resolve_indices(
    selector: &Selector,
    num_records: usize,
) -> Result<Option<HashSet<usize>>, QueryError> {
    selector.validate()?;
    if selector.random > 0 {
        if selector.random as usize > num_records {
            return Err(QueryError::NotEnoughRecords {
                requested: selector.random,
                available: num_records as u64,
            });
        }
        let mut pool: Vec<usize> = (0..num_records).collect();
        let mut rng = rand::thread_rng();
        let mut chosen = HashSet::with_capacity(selector.random as usize);
        for _ in 0..selector.random {
            let pick = rng.gen_range(0..pool.len());
            chosen.insert(pool.swap_remove(pick));
        }
        return Ok(Some(chosen));
    }
    if let Some(ranges) = &selector.index_list {
        let chosen = (0..num_records)
            .filter(|i| ranges.iter().any(|r| r.contains(*i as u64)))
            .collect();
        return Ok(Some(chosen));
    }
    Ok(None)
}

/// Whether `record`, at position `idx` among the records being considered,
/// is selected. Precedence: `fast_string` first, then `sex`, then the
/// resolved index/random set, then "select everything".
pub(crate) fn selected_p(
    record: &Record,
    idx: usize,
    selector: &Selector,
    indices: Option<&HashSet<usize>>,
    icase: bool,
) -> bool {
    if let Some(needle) = &selector.fast_string {
        return record.contains_value(needle, icase);
    }
    if let Some(sex) = &selector.sex {
        return sex.matches(record);
    }
    if let Some(indices) = indices {
        return indices.contains(&idx);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_core::Field;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (n, v) in pairs {
            r.push_field(Field::new(*n, *v));
        }
        r
    }

    #[test]
    fn random_conflicts_with_explicit_selectors() {
        let selector = Selector {
            random: 2,
            fast_string: Some("x".to_string()),
            ..Selector::default()
        };
        assert_eq!(selector.validate(), Err(QueryError::ConflictingSelectors));
    }

    #[test]
    fn index_ranges_resolve_to_a_membership_set() {
        let selector = Selector::by_index(vec![IndexRange::single(0), IndexRange { min: 2, max: 3 }]);
        let indices = resolve_indices(&selector, 5).unwrap().unwrap();
        assert_eq!(indices, [0usize, 2, 3].into_iter().collect());
    }

    #[test]
    fn fast_string_takes_precedence_over_sex() {
        let selector = Selector {
            sex: Some(Sex::parse("A = \"nope\"").unwrap()),
            fast_string: Some("hello".to_string()),
            ..Selector::default()
        };
        assert!(selected_p(&rec(&[("A", "hello")]), 0, &selector, None, false));
    }

    #[test]
    fn random_selection_picks_the_requested_count() {
        let selector = Selector::random(3);
        let indices = resolve_indices(&selector, 5).unwrap().unwrap();
        assert_eq!(indices.len(), 3);
        assert!(indices.iter().all(|&i| i < 5));
    }

    #[test]
    fn random_larger_than_available_is_an_error() {
        let selector = Selector::random(10);
        assert_eq!(
            resolve_indices(&selector, 3),
            Err(QueryError::NotEnoughRecords { requested: 10, available: 3 })
        );
    }
}
