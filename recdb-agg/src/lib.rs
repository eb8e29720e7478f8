//! # recdb-agg
//!
//! Aggregate functions: `count`, `sum`, `avg`, `min`, `max`, callable
//! by name over a slice of selected records, plus a case-insensitive
//! registry so `recdb-query` can look one up from a field expression's
//! function-call syntax.

use std::collections::HashMap;

use recdb_core::Record;
use thiserror::Error;

/// Errors registering or looking up an aggregate function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggError {
    /// The registry already holds the maximum number of entries.
    #[error("aggregate function registry is full (max {0})")]
    RegistryFull(usize),
    /// No aggregate function is registered under this name.
    #[error("unknown aggregate function {0:?}")]
    UnknownFunction(String),
}

/// An aggregate function: given the records a query selected and a field
/// name, produces the aggregate's textual result, or `None` if it has
/// nothing to report (e.g. `avg` over zero records).
pub type AggFn = fn(&[&Record], &str) -> Option<String>;

/// Maximum number of entries a registry may hold.
pub const MAX_ENTRIES: usize = 40;

/// A case-insensitive name → aggregate-function table.
#[derive(Clone)]
pub struct AggRegistry {
    entries: HashMap<String, AggFn>,
}

impl AggRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        AggRegistry {
            entries: HashMap::new(),
        }
    }

    /// A registry pre-populated with the five built-in functions.
    pub fn standard() -> Self {
        let mut reg = Self::new();
        reg.insert("count", count).unwrap();
        reg.insert("sum", sum).unwrap();
        reg.insert("avg", avg).unwrap();
        reg.insert("min", min).unwrap();
        reg.insert("max", max).unwrap();
        reg
    }

    /// Registers `f` under `name` (case-insensitively).
    pub fn insert(&mut self, name: &str, f: AggFn) -> Result<(), AggError> {
        if self.entries.len() >= MAX_ENTRIES && !self.entries.contains_key(&name.to_ascii_lowercase()) {
            return Err(AggError::RegistryFull(MAX_ENTRIES));
        }
        self.entries.insert(name.to_ascii_lowercase(), f);
        Ok(())
    }

    /// Looks up the function registered under `name`.
    pub fn get(&self, name: &str) -> Option<AggFn> {
        self.entries.get(&name.to_ascii_lowercase()).copied()
    }

    /// Calls the function registered under `name` over `records`/`field`.
    pub fn call(&self, name: &str, records: &[&Record], field: &str) -> Result<Option<String>, AggError> {
        let f = self.get(name).ok_or_else(|| AggError::UnknownFunction(name.to_string()))?;
        Ok(f(records, field))
    }
}

impl Default for AggRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Formats a float the way C's `%g` would: the shortest decimal
/// representation that round-trips, with no forced trailing `.0`, and the
/// `inf`/`-inf` spelling for the unseeded `min`/`max` accumulator.
fn format_g(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn values_by_name<'a>(records: &'a [&Record], field: &str) -> impl Iterator<Item = &'a str> {
    records.iter().flat_map(move |r| r.fields().filter(move |f| f.name() == field).map(|f| f.value()))
}

fn numeric_values(records: &[&Record], field: &str) -> Vec<f64> {
    values_by_name(records, field)
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .collect()
}

/// Number of fields named `field` across every record (or the total record
/// count if `field` is empty).
fn count(records: &[&Record], field: &str) -> Option<String> {
    let n = if field.is_empty() {
        records.len()
    } else {
        values_by_name(records, field).count()
    };
    Some(n.to_string())
}

/// Sum of `field`'s numeric values across `records` (`0` if none are
/// numeric).
fn sum(records: &[&Record], field: &str) -> Option<String> {
    let values = numeric_values(records, field);
    Some(format_g(values.iter().sum()))
}

/// Arithmetic mean of `field`'s numeric values, or `None` if there are none.
fn avg(records: &[&Record], field: &str) -> Option<String> {
    let values = numeric_values(records, field);
    if values.is_empty() {
        return None;
    }
    Some(format_g(values.iter().sum::<f64>() / values.len() as f64))
}

/// The smallest numeric value of `field` across `records`, skipping any
/// non-numeric values; `"inf"` (the unseeded accumulator, `%g`-formatted) if
/// none of `field`'s values parse as a number.
fn min(records: &[&Record], field: &str) -> Option<String> {
    extremum(records, field, true)
}

/// The largest numeric value of `field` across `records`, skipping any
/// non-numeric values; `"-inf"` if none of `field`'s values parse as a
/// number.
fn max(records: &[&Record], field: &str) -> Option<String> {
    extremum(records, field, false)
}

fn extremum(records: &[&Record], field: &str, want_min: bool) -> Option<String> {
    let nums = numeric_values(records, field);
    let seed = if want_min { f64::INFINITY } else { f64::NEG_INFINITY };
    let pick = if want_min {
        nums.iter().cloned().fold(seed, f64::min)
    } else {
        nums.iter().cloned().fold(seed, f64::max)
    };
    Some(format_g(pick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_core::Field;

    fn rec(value: &str) -> Record {
        let mut r = Record::new();
        r.push_field(Field::new("Year", value));
        r
    }

    #[test]
    fn count_sum_avg_min_max() {
        let recs = vec![rec("1"), rec("2"), rec("3")];
        let refs: Vec<&Record> = recs.iter().collect();
        let reg = AggRegistry::standard();
        assert_eq!(reg.call("count", &refs, "Year").unwrap(), Some("3".to_string()));
        assert_eq!(reg.call("SUM", &refs, "Year").unwrap(), Some("6".to_string()));
        assert_eq!(reg.call("Avg", &refs, "Year").unwrap(), Some("2".to_string()));
        assert_eq!(reg.call("min", &refs, "Year").unwrap(), Some("1".to_string()));
        assert_eq!(reg.call("max", &refs, "Year").unwrap(), Some("3".to_string()));
    }

    #[test]
    fn avg_of_no_records_is_none() {
        let recs: Vec<Record> = Vec::new();
        let refs: Vec<&Record> = recs.iter().collect();
        let reg = AggRegistry::standard();
        assert_eq!(reg.call("avg", &refs, "Year").unwrap(), None);
        assert_eq!(reg.call("sum", &refs, "Year").unwrap(), Some("0".to_string()));
    }

    #[test]
    fn unknown_function_is_an_error() {
        let reg = AggRegistry::standard();
        assert!(matches!(reg.call("bogus", &[], "X"), Err(AggError::UnknownFunction(_))));
    }

    #[test]
    fn min_max_skip_non_numeric_values() {
        let recs = vec![rec("banana"), rec("5"), rec("cherry"), rec("2")];
        let refs: Vec<&Record> = recs.iter().collect();
        let reg = AggRegistry::standard();
        assert_eq!(reg.call("min", &refs, "Year").unwrap(), Some("2".to_string()));
        assert_eq!(reg.call("max", &refs, "Year").unwrap(), Some("5".to_string()));
    }

    #[test]
    fn min_max_of_no_numeric_values_produces_the_seed() {
        let recs = vec![rec("banana"), rec("cherry")];
        let refs: Vec<&Record> = recs.iter().collect();
        let reg = AggRegistry::standard();
        assert_eq!(reg.call("min", &refs, "Year").unwrap(), Some("inf".to_string()));
        assert_eq!(reg.call("max", &refs, "Year").unwrap(), Some("-inf".to_string()));
    }
}
