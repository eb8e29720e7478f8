//! The integrity checker (§4.N): descriptor-shape validation plus, per
//! record, the key/type/mandatory/unique/secrets/prohibit/constraint/
//! allowed rule chain, in that fixed order.

use std::collections::HashSet;
use std::fmt::Write as _;

use itertools::Itertools;
use recdb_core::{Database, Record, RSet, Type, TypeKind};
use recdb_expr::{Fex, FexKind, Sex};

use crate::error::QueryError;

/// A caller-supplied way to retrieve the text of an externally-referenced
/// descriptor (the URL/path following the type name in a `%rec:` field).
///
/// This crate does not bundle an HTTP client: fetching a URL is an
/// "external collaborator" concern (networking, TLS, redirects, timeouts)
/// that belongs to the embedding application, not to a record-format
/// engine. Local file paths are read directly via `std::fs` without
/// consulting a fetcher at all.
pub trait ExternalDescriptorFetcher {
    /// Returns the raw descriptor text at `location`.
    fn fetch(&self, location: &str) -> Result<String, QueryError>;
}

/// Checks every record set of `db`, appending `source:line: error: …` lines
/// to `errors` and returning the total error count (0 = clean).
pub fn check_db(db: &Database, errors: &mut String, fetcher: Option<&dyn ExternalDescriptorFetcher>) -> usize {
    db.rsets().map(|rset| check_rset(rset, db, errors, fetcher)).sum()
}

/// Checks one record set: descriptor shape, then each record against the
/// key/type/mandatory/unique/secrets/prohibit/constraint/allowed chain,
/// then the record set's declared size bounds. `db` is consulted for
/// `rec`-typed fields, to delegate to the referred type's key type.
pub fn check_rset(rset: &RSet, db: &Database, errors: &mut String, fetcher: Option<&dyn ExternalDescriptorFetcher>) -> usize {
    let Some(descriptor) = rset.descriptor() else {
        return 0;
    };

    let mut count = check_descriptor_shape(descriptor, errors);

    let merged = merge_external(rset, fetcher, errors, &mut count);
    let derived = merged.derived();

    let constraints: Vec<(&String, Result<Sex, _>)> =
        derived.constraints.iter().map(|src| (src, Sex::parse(src))).collect();

    let mut key_records: Vec<&Record> = Vec::new();

    for record in rset.records() {
        let (source, line) = locate(record);

        if let Some(key) = &derived.key {
            let n = record.num_fields_by_name(key);
            if n != 1 {
                emit(errors, &source, line, format_args!("field {key:?} must appear exactly once (declared as %key)"));
                count += 1;
            } else {
                key_records.push(record);
            }
        }

        for field in record.fields() {
            if let Some(ty) = merged.type_of(field.name()) {
                if let Err(msg) = check_typed_field(ty, field.value(), db) {
                    emit(errors, &source, line, format_args!("field {:?}: {msg}", field.name()));
                    count += 1;
                }
            }
        }

        for name in &derived.mandatory {
            if record.num_fields_by_name(name) == 0 {
                emit(errors, &source, line, format_args!("missing mandatory field {name:?}"));
                count += 1;
            }
        }

        for name in &derived.unique {
            if record.num_fields_by_name(name) > 1 {
                emit(errors, &source, line, format_args!("field {name:?} must appear at most once"));
                count += 1;
            }
        }

        for name in &derived.confidential {
            for field in record.fields().filter(|f| f.name() == name) {
                if !recdb_crypto::is_encrypted(field.value()) {
                    emit(errors, &source, line, format_args!("confidential field {name:?} is not encrypted"));
                    count += 1;
                }
            }
        }

        for name in &derived.prohibit {
            if record.num_fields_by_name(name) > 0 {
                emit(errors, &source, line, format_args!("field {name:?} is prohibited"));
                count += 1;
            }
        }

        for (src, compiled) in &constraints {
            match compiled {
                Ok(sex) => {
                    if !sex.matches(record) {
                        emit(errors, &source, line, format_args!("constraint {src:?} failed"));
                        count += 1;
                    }
                }
                Err(e) => {
                    emit(errors, &source, line, format_args!("invalid constraint {src:?}: {e}"));
                    count += 1;
                }
            }
        }

        if let Some(allowed) = &derived.allowed {
            for field in record.fields() {
                let ok = allowed.contains(field.name())
                    || derived.mandatory.contains(field.name())
                    || derived.key.as_deref() == Some(field.name());
                if !ok {
                    emit(errors, &source, line, format_args!("field {:?} is not in %allowed", field.name()));
                    count += 1;
                }
            }
        }
    }

    count += check_key_uniqueness(derived.key.as_deref(), &key_records, errors);

    let n = rset.num_records() as u64;
    if n < derived.size.min || n > derived.size.max {
        let (source, line) = locate(descriptor);
        emit(
            errors,
            &source,
            line,
            format_args!(
                "record set {:?} has {n} records, outside the declared bounds [{}, {}]",
                rset.type_name(),
                derived.size.min,
                derived.size.max
            ),
        );
        count += 1;
    }

    count
}

fn check_key_uniqueness(key: Option<&str>, records: &[&Record], errors: &mut String) -> usize {
    let Some(key) = key else {
        return 0;
    };
    let mut count = 0;
    let dupes: HashSet<&str> = records
        .iter()
        .map(|r| r.field_by_name(key, 0).expect("pushed only when key present exactly once").value())
        .counts()
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(value, _)| value)
        .collect();
    if dupes.is_empty() {
        return 0;
    }
    for record in records {
        let value = record.field_by_name(key, 0).expect("checked above").value();
        if dupes.contains(value) {
            let (source, line) = locate(record);
            emit(errors, &source, line, format_args!("duplicate value {value:?} for key field {key:?}"));
            count += 1;
        }
    }
    count
}

fn check_typed_field(ty: &Type, value: &str, db: &Database) -> Result<(), String> {
    if let TypeKind::Rec { type_name } = ty.kind() {
        let Some(ref_rset) = db.by_type(Some(type_name.as_str())) else {
            return Err(format!("referenced record type {type_name:?} does not exist"));
        };
        let Some(key) = &ref_rset.derived().key else {
            return Ok(());
        };
        return match ref_rset.type_of(key) {
            Some(key_ty) => key_ty.check(value),
            None => Ok(()),
        };
    }
    ty.check(value)
}

fn check_descriptor_shape(descriptor: &Record, errors: &mut String) -> usize {
    let mut count = 0;
    let (source, line) = locate(descriptor);

    let rec_count = descriptor.num_fields_by_name("%rec");
    if rec_count != 1 {
        emit(errors, &source, line, format_args!("descriptor must declare exactly one %rec (found {rec_count})"));
        count += 1;
    }
    for name in ["%key", "%size", "%sort"] {
        if descriptor.num_fields_by_name(name) > 1 {
            emit(errors, &source, line, format_args!("descriptor declares {name} more than once"));
            count += 1;
        }
    }

    for field in descriptor.fields() {
        match field.name() {
            "%type" => {
                if let Some((fex_part, _descr)) = field.value().split_once(char::is_whitespace) {
                    if Fex::parse(FexKind::Simple, fex_part.trim()).is_err() {
                        emit(errors, &source, line, format_args!("invalid field list in %type: {fex_part:?}"));
                        count += 1;
                    }
                } else {
                    emit(errors, &source, line, format_args!("malformed %type directive {:?}", field.value()));
                    count += 1;
                }
            }
            "%typedef" => {
                if field.value().split_once(char::is_whitespace).is_none() {
                    emit(errors, &source, line, format_args!("malformed %typedef directive {:?}", field.value()));
                    count += 1;
                }
            }
            "%constraint" => {
                if Sex::parse(field.value()).is_err() {
                    emit(errors, &source, line, format_args!("invalid %constraint: {:?}", field.value()));
                    count += 1;
                }
            }
            "%size" => {
                if !is_valid_size_directive(field.value()) {
                    emit(errors, &source, line, format_args!("malformed %size directive {:?}", field.value()));
                    count += 1;
                }
            }
            "%confidential" => {
                if field.value().split_whitespace().next().is_none() {
                    emit(errors, &source, line, format_args!("%confidential must name at least one field"));
                    count += 1;
                }
            }
            _ => {}
        }
    }

    count
}

fn is_valid_size_directive(value: &str) -> bool {
    let v = value.trim();
    let rest = v
        .strip_prefix("<=")
        .or_else(|| v.strip_prefix(">="))
        .or_else(|| v.strip_prefix('<'))
        .or_else(|| v.strip_prefix('>'))
        .unwrap_or(v);
    rest.trim().parse::<u64>().is_ok()
}

/// Merges an external descriptor into a clone of `rset`, if `%rec:` named
/// one. Any field name the local descriptor declares wins outright (all of
/// its occurrences replace all of the external ones); field names the
/// external descriptor has but the local one doesn't are kept as-is. On
/// any fetch/parse failure, an error is appended and the unmerged `rset` is
/// used instead.
fn merge_external(
    rset: &RSet,
    fetcher: Option<&dyn ExternalDescriptorFetcher>,
    errors: &mut String,
    count: &mut usize,
) -> RSet {
    let Some(location) = rset.derived().external.clone() else {
        return rset.clone();
    };
    let (source, line) = rset.descriptor().map(locate).unwrap_or((None, 0));

    let text = match fetch_external_text(&location, fetcher) {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::debug!(location, "no fetcher configured for external descriptor, skipping merge");
            return rset.clone();
        }
        Err(e) => {
            emit(errors, &source, line, format_args!("failed to fetch external descriptor {location:?}: {e}"));
            *count += 1;
            return rset.clone();
        }
    };

    let parsed = recdb_parser::Parser::new(&text, recdb_parser::ParserOptions::named(location.clone())).next_item();
    let external_descriptor = match parsed {
        Ok(Some(recdb_parser::Item::Record(r))) => r,
        _ => {
            emit(errors, &source, line, format_args!("could not parse external descriptor at {location:?}"));
            *count += 1;
            return rset.clone();
        }
    };

    let mut merged_descriptor = external_descriptor;
    if let Some(local) = rset.descriptor() {
        let local_names: HashSet<&str> = local.fields().map(|f| f.name()).collect();
        for name in local_names {
            merged_descriptor.remove_field_by_name(name, None);
            for field in local.fields().filter(|f| f.name() == name) {
                merged_descriptor.push_field(field.clone());
            }
        }
    }

    let mut merged = rset.clone();
    merged.set_descriptor(Some(merged_descriptor));
    merged
}

fn fetch_external_text(location: &str, fetcher: Option<&dyn ExternalDescriptorFetcher>) -> Result<Option<String>, QueryError> {
    let path = std::path::Path::new(location);
    if path.is_file() {
        return std::fs::read_to_string(path).map(Some).map_err(|e| QueryError::ExternalFetch(e.to_string()));
    }
    match fetcher {
        Some(f) => f.fetch(location).map(Some),
        None => Ok(None),
    }
}

fn locate(record: &Record) -> (Option<String>, u64) {
    let source = record.fields().find_map(|f| f.loc().source.clone());
    (source, record.source_position())
}

fn emit(errors: &mut String, source: &Option<String>, line: u64, msg: std::fmt::Arguments<'_>) {
    let _ = writeln!(errors, "{source:?}:{line}: error: {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_parser::parse_str;

    #[test]
    fn missing_mandatory_field_is_reported() {
        let db = parse_str("%rec: Book\n%mandatory: Title\n\nId: 1\n").unwrap();
        let mut errors = String::new();
        let n = check_db(&db, &mut errors, None);
        assert_eq!(n, 1);
        assert!(errors.contains("missing mandatory field"));
    }

    #[test]
    fn duplicate_key_values_are_reported() {
        let db = parse_str("%rec: Book\n%key: Id\n\nId: 1\n\nId: 1\n").unwrap();
        let mut errors = String::new();
        let n = check_db(&db, &mut errors, None);
        assert_eq!(n, 2);
    }

    #[test]
    fn constraint_violation_is_reported() {
        let db = parse_str("%rec: Book\n%type: Year int\n%constraint: Year > 2000\n\nYear: 1994\n").unwrap();
        let mut errors = String::new();
        let n = check_db(&db, &mut errors, None);
        assert_eq!(n, 1);
    }

    #[test]
    fn unencrypted_confidential_field_is_reported() {
        let db = parse_str("%rec: User\n%confidential: Pwd\n\nPwd: plaintext\n").unwrap();
        let mut errors = String::new();
        let n = check_db(&db, &mut errors, None);
        assert_eq!(n, 1);
    }

    #[test]
    fn clean_database_has_no_errors() {
        let db = parse_str(
            "%rec: Book\n%key: Id\n%type: Id int\n%mandatory: Title\n\n\
             Id: 1\nTitle: Recutils Manual\n\nId: 2\nTitle: Unix Haters\n",
        )
        .unwrap();
        let mut errors = String::new();
        assert_eq!(check_db(&db, &mut errors, None), 0);
        assert!(errors.is_empty());
    }

    #[test]
    fn size_bounds_violation_is_reported() {
        let db = parse_str("%rec: Book\n%size: <2\n\nId: 1\n\nId: 2\n").unwrap();
        let mut errors = String::new();
        assert_eq!(check_db(&db, &mut errors, None), 1);
    }

    #[test]
    fn duplicate_rec_directive_is_a_descriptor_shape_error() {
        // Two %rec fields in one descriptor record (constructed directly,
        // since the parser itself splits on the first %rec it sees).
        let mut descriptor = Record::new();
        descriptor.push_field(recdb_core::Field::new("%rec", "Book"));
        descriptor.push_field(recdb_core::Field::new("%rec", "Book2"));
        let mut rset = RSet::new();
        rset.set_descriptor(Some(descriptor));
        let mut db = Database::new();
        db.append_rset(rset);
        let mut errors = String::new();
        assert_eq!(check_db(&db, &mut errors, None), 1);
        assert!(errors.contains("exactly one %rec"));
    }
}
