//! Projecting a record through a field expression (FEX), for `query`'s
//! per-record result shaping.

use recdb_agg::AggRegistry;
use recdb_core::{Field, Record};
use recdb_expr::{Fex, FexElem};

use crate::error::QueryError;

/// Projects `record` through `fex`, or clones it verbatim if `fex` is
/// `None`. A call element (`function_name` set) invokes the aggregate
/// against `record` alone; a plain element duplicates the field's matching
/// occurrences (restricted to `[min, max]` if given), renaming via
/// `rewrite_to` if present.
pub(crate) fn project(
    record: &Record,
    fex: Option<&Fex>,
    aggregates: &AggRegistry,
) -> Result<Record, QueryError> {
    let Some(fex) = fex else {
        return Ok(record.clone());
    };
    let mut out = Record::new();
    out.set_source_position(record.source_position());
    for elem in fex.elements() {
        match &elem.function_name {
            Some(func) => {
                if let Some(value) = aggregates.call(func, &[record], &elem.field_name)? {
                    out.push_field(Field::new(elem.output_name(), value));
                }
            }
            None => {
                for value in selected_occurrences(record, elem) {
                    out.push_field(Field::new(elem.output_name(), value));
                }
            }
        }
    }
    Ok(out)
}

fn selected_occurrences<'a>(record: &'a Record, elem: &FexElem) -> Vec<&'a str> {
    let occurrences: Vec<&str> = record
        .fields()
        .filter(|f| f.name() == elem.field_name)
        .map(|f| f.value())
        .collect();
    if elem.min < 0 {
        return occurrences;
    }
    let lo = elem.min as usize;
    let hi = if elem.max >= 0 { elem.max as usize } else { lo };
    occurrences
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i >= lo && *i <= hi)
        .map(|(_, v)| v)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_expr::FexKind;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (n, v) in pairs {
            r.push_field(Field::new(*n, *v));
        }
        r
    }

    #[test]
    fn no_fex_clones_verbatim() {
        let r = rec(&[("A", "1")]);
        let out = project(&r, None, &AggRegistry::standard()).unwrap();
        assert!(out.mset_eq(&r));
    }

    #[test]
    fn plain_element_duplicates_and_renames() {
        let r = rec(&[("Name", "Alice"), ("Age", "30")]);
        let fex = Fex::parse(FexKind::Subscripts, "Name: Who").unwrap();
        let out = project(&r, Some(&fex), &AggRegistry::standard()).unwrap();
        assert_eq!(out.field_by_name("Who", 0).unwrap().value(), "Alice");
        assert_eq!(out.num_fields_by_name("Age"), 0);
    }

    #[test]
    fn call_element_invokes_the_aggregate_against_this_record_alone() {
        let r = rec(&[("Year", "2019")]);
        let fex = Fex::parse(FexKind::Subscripts, "count(Year)").unwrap();
        let out = project(&r, Some(&fex), &AggRegistry::standard()).unwrap();
        assert_eq!(out.field_by_name("count_Year", 0).unwrap().value(), "1");
    }

    #[test]
    fn subscript_range_restricts_which_occurrences_are_kept() {
        let r = rec(&[("Tag", "a"), ("Tag", "b"), ("Tag", "c")]);
        let fex = Fex::parse(FexKind::Subscripts, "Tag[1-2]").unwrap();
        let out = project(&r, Some(&fex), &AggRegistry::standard()).unwrap();
        let values: Vec<_> = out.fields().map(|f| f.value()).collect();
        assert_eq!(values, vec!["b", "c"]);
    }
}
