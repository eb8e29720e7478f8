//! `query`: builds a result record set out of a database by resolving,
//! optionally joining, sorting/grouping, selecting, and projecting.

use recdb_agg::AggRegistry;
use recdb_core::{Database, Field, Record, RSet};
use recdb_expr::Fex;

use crate::error::QueryError;
use crate::flags::QueryFlags;
use crate::projection::project;
use crate::selector::{resolve_indices, selected_p, Selector};

/// Everything [`query`] needs besides the database and the aggregate
/// registry it evaluates `fex` calls against.
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    /// The record type to query. `None` means "the database's only record
    /// set".
    pub type_name: Option<String>,
    /// A `rec`-typed field to inner-join on, resolved against its referred
    /// record set's primary key.
    pub join: Option<String>,
    /// Which records to keep.
    pub selector: Selector,
    /// The field expression to project each selected record through.
    /// `None` projects records verbatim.
    pub fex: Option<Fex>,
    /// If set, confidential fields of each result record are decrypted
    /// under this password.
    pub password: Option<String>,
    /// Sort then group by these field names before selection.
    pub group_by: Option<Vec<String>>,
    /// Sort by these field names before selection (falls back to the
    /// source record set's declared `%sort` key if not given).
    pub sort_by: Option<Vec<String>>,
    /// Behavior flags (`DESCRIPTOR`, `ICASE`, `UNIQ`).
    pub flags: QueryFlags,
}

/// Runs a query against `db`, returning a fresh [`RSet`] of the selected,
/// projected records (see §4.M).
pub fn query(db: &Database, opts: &QueryOptions, aggregates: &AggRegistry) -> Result<RSet, QueryError> {
    opts.selector.validate()?;
    let source_rset = resolve_rset(db, opts.type_name.as_deref())?;

    let working_records: Vec<Record> = match &opts.join {
        Some(join_field) => apply_join(source_rset, db, join_field)?,
        None => source_rset.records().cloned().collect(),
    };

    // Stage the working records through a scratch rset carrying the
    // source's descriptor, so `sort`/`group`/`type_of` can use its typed
    // field declarations; a bare `Vec<Record>` has no type information.
    let mut staging = RSet::new();
    staging.set_descriptor(source_rset.descriptor().cloned());
    for record in working_records {
        staging.push_record(record);
    }

    if opts.fex.as_ref().is_some_and(Fex::all_calls_p) && opts.group_by.is_none() {
        return single_aggregate_query(&staging, source_rset, opts, aggregates);
    }

    if let Some(group_key) = &opts.group_by {
        staging.sort(Some(group_key.clone()));
        staging.group(group_key);
    }
    let sort_key = opts
        .sort_by
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| Some(source_rset.derived().sort_key.clone()).filter(|k| !k.is_empty()));
    if let Some(key) = sort_key {
        staging.sort(Some(key));
    }

    let icase = opts.flags.contains(QueryFlags::ICASE);
    let indices = resolve_indices(&opts.selector, staging.num_records())?;

    let mut result = RSet::new();
    if opts.flags.contains(QueryFlags::DESCRIPTOR) {
        result.set_descriptor(source_rset.descriptor().cloned());
    }

    for (idx, record) in staging.records().enumerate() {
        if !selected_p(record, idx, &opts.selector, indices.as_ref(), icase) {
            continue;
        }
        let mut projected = project(record, opts.fex.as_ref(), aggregates)?;
        if opts.flags.contains(QueryFlags::UNIQ) {
            projected.uniq();
        }
        if projected.is_empty() {
            continue;
        }
        if let Some(password) = &opts.password {
            recdb_crypto::decrypt_record(&mut projected, &staging, password);
        }
        result.push_record(projected);
    }

    Ok(result)
}

fn single_aggregate_query(
    staging: &RSet,
    source_rset: &RSet,
    opts: &QueryOptions,
    aggregates: &AggRegistry,
) -> Result<RSet, QueryError> {
    let fex = opts.fex.as_ref().expect("checked by caller");
    let records: Vec<&Record> = staging.records().collect();
    let mut agg_record = Record::new();
    for elem in fex.elements() {
        let func = elem.function_name.as_deref().expect("fex.all_calls_p() checked by caller");
        if let Some(value) = aggregates.call(func, &records, &elem.field_name)? {
            agg_record.push_field(Field::new(elem.output_name(), value));
        }
    }
    let mut result = RSet::new();
    if opts.flags.contains(QueryFlags::DESCRIPTOR) {
        result.set_descriptor(source_rset.descriptor().cloned());
    }
    if !agg_record.is_empty() {
        result.push_record(agg_record);
    }
    Ok(result)
}

pub(crate) fn resolve_rset<'a>(db: &'a Database, type_name: Option<&str>) -> Result<&'a RSet, QueryError> {
    match type_name {
        Some(name) => db.by_type(Some(name)).ok_or_else(|| QueryError::UnknownType(name.to_string())),
        None if db.len() == 1 => Ok(db.get(0).expect("len() == 1")),
        None => Err(QueryError::AmbiguousType),
    }
}

pub(crate) fn resolve_rset_mut<'a>(
    db: &'a mut Database,
    type_name: Option<&str>,
) -> Result<&'a mut RSet, QueryError> {
    match type_name {
        Some(name) => db.by_type_mut(Some(name)).ok_or_else(|| QueryError::UnknownType(name.to_string())),
        None if db.len() == 1 => Ok(db.get_mut(0).expect("len() == 1")),
        None => Err(QueryError::AmbiguousType),
    }
}

/// Inner join on `rset.{join_field} = ref.{key}`: for every record of
/// `rset` whose `join_field` matches a record in the referred type's
/// primary key, produce a merged record with the referenced record's
/// fields prefixed `{join_field}_` and the original join field removed.
///
/// A plain nested loop, the natural correctness-first shape; a hash join
/// would only be worth the extra bookkeeping at record counts far beyond
/// what a text-file database holds.
fn apply_join(rset: &RSet, db: &Database, join_field: &str) -> Result<Vec<Record>, QueryError> {
    let ty = rset
        .type_of(join_field)
        .ok_or_else(|| QueryError::UnknownField(join_field.to_string()))?;
    let recdb_core::TypeKind::Rec { type_name: ref_type } = ty.kind() else {
        return Err(QueryError::NotAJoinField(join_field.to_string()));
    };
    let ref_rset = db.by_type(Some(ref_type.as_str())).ok_or_else(|| QueryError::UnknownType(ref_type.clone()))?;
    let key = ref_rset
        .derived()
        .key
        .clone()
        .ok_or_else(|| QueryError::NoPrimaryKey(ref_type.clone()))?;

    let mut out = Vec::new();
    for record in rset.records() {
        let Some(join_value) = record.field_by_name(join_field, 0) else {
            continue;
        };
        let join_value = join_value.value().to_string();
        for ref_record in ref_rset.records() {
            let Some(key_field) = ref_record.field_by_name(&key, 0) else {
                continue;
            };
            if key_field.value() != join_value {
                continue;
            }
            let mut merged = Record::new();
            merged.set_source_position(record.source_position());
            for f in record.fields().filter(|f| f.name() != join_field) {
                merged.push_field(f.clone());
            }
            for f in ref_record.fields() {
                merged.push_field(Field::new(format!("{join_field}_{}", f.name()), f.value()));
            }
            out.push(merged);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_parser::parse_str;

    fn books() -> Database {
        parse_str(
            "%rec: Book\n%key: Id\n%type: Id,Year int\n%mandatory: Title\n\n\
             Id: 1\nTitle: Recutils Manual\nYear: 2019\n\n\
             Id: 2\nTitle: Unix Haters\nYear: 1994\n",
        )
        .unwrap()
    }

    #[test]
    fn sort_by_orders_records() {
        let db = books();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            sort_by: Some(vec!["Year".to_string()]),
            ..Default::default()
        };
        let result = query(&db, &opts, &AggRegistry::standard()).unwrap();
        let ids: Vec<_> = result.records().map(|r| r.field_by_name("Id", 0).unwrap().value().to_string()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn sex_selector_filters_records() {
        let db = books();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            selector: Selector::by_sex(recdb_expr::Sex::parse("Title ~ \"Unix\"").unwrap()),
            ..Default::default()
        };
        let result = query(&db, &opts, &AggRegistry::standard()).unwrap();
        assert_eq!(result.num_records(), 1);
        assert_eq!(result.records().next().unwrap().field_by_name("Year", 0).unwrap().value(), "1994");
    }

    #[test]
    fn fast_string_selector() {
        let db = books();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            selector: Selector::by_fast_string("Unix"),
            ..Default::default()
        };
        let result = query(&db, &opts, &AggRegistry::standard()).unwrap();
        assert_eq!(result.num_records(), 1);
    }

    #[test]
    fn index_selector() {
        let db = books();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            selector: Selector::by_index(vec![crate::selector::IndexRange::single(0)]),
            ..Default::default()
        };
        let result = query(&db, &opts, &AggRegistry::standard()).unwrap();
        assert_eq!(result.num_records(), 1);
        assert_eq!(result.records().next().unwrap().field_by_name("Year", 0).unwrap().value(), "2019");
    }

    #[test]
    fn single_aggregate_projection() {
        let db = books();
        let fex = recdb_expr::Fex::parse(recdb_expr::FexKind::Subscripts, "count(Id),avg(Year)").unwrap();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            fex: Some(fex),
            ..Default::default()
        };
        let result = query(&db, &opts, &AggRegistry::standard()).unwrap();
        assert_eq!(result.num_records(), 1);
        let record = result.records().next().unwrap();
        assert_eq!(record.field_by_name("count_Id", 0).unwrap().value(), "2");
        assert_eq!(record.field_by_name("avg_Year", 0).unwrap().value(), "2006.5");
    }

    #[test]
    fn join_merges_referenced_fields() {
        let db = parse_str(
            "%rec: Author\n%key: Id\n\nId: 1\nName: Erik\n\n\
             %rec: Book\n%type: Author rec Author\n\nTitle: Recutils\nAuthor: 1\n",
        )
        .unwrap();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            join: Some("Author".to_string()),
            ..Default::default()
        };
        let result = query(&db, &opts, &AggRegistry::standard()).unwrap();
        let record = result.records().next().unwrap();
        assert_eq!(record.field_by_name("Author_Name", 0).unwrap().value(), "Erik");
        assert_eq!(record.num_fields_by_name("Author"), 0);
    }
}
