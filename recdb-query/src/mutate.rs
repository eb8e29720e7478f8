//! `insert`, `delete`, and `set`: in-place mutation of a [`Database`].

use recdb_core::{Comment, Database, Field, Record, RSet};
use recdb_expr::Fex;

use crate::error::QueryError;
use crate::flags::QueryFlags;
use crate::query::resolve_rset_mut;
use crate::selector::{resolve_indices, selected_p, Selector};

/// Inserts `record`: if `selector` matches anything, every matched record
/// is replaced by a copy of `record`; otherwise `record` is appended to the
/// `type_name` record set (creating it — at position 0 if `type_name` is
/// `None` — if it doesn't exist yet).
pub fn insert(
    db: &mut Database,
    type_name: Option<&str>,
    selector: &Selector,
    password: Option<&str>,
    mut record: Record,
    flags: QueryFlags,
) -> Result<usize, QueryError> {
    selector.validate()?;

    if selector.has_explicit_selector() || selector.random > 0 {
        let rset = resolve_rset_mut(db, type_name)?;
        let icase = flags.contains(QueryFlags::ICASE);
        let indices = resolve_indices(selector, rset.num_records())?;
        let matched: Vec<usize> = rset
            .records()
            .enumerate()
            .filter(|(i, r)| selected_p(r, *i, selector, indices.as_ref(), icase))
            .map(|(i, _)| i)
            .collect();
        let count = matched.len();
        for pos in matched {
            rset.replace_record(pos, record.clone());
        }
        return Ok(count);
    }

    let rset = match type_name {
        Some(name) => {
            if !db.type_p(name) {
                let mut new_rset = RSet::new();
                let mut descriptor = Record::new();
                descriptor.push_field(Field::new("%rec", name));
                new_rset.set_descriptor(Some(descriptor));
                db.append_rset(new_rset);
            }
            db.by_type_mut(Some(name)).expect("just ensured it exists")
        }
        None => {
            if db.by_type(None).is_none() {
                db.insert_rset(0, RSet::new());
            }
            db.by_type_mut(None).expect("just ensured it exists")
        }
    };
    if !flags.contains(QueryFlags::NOAUTO) {
        rset.add_auto_fields(&mut record);
    }
    if let Some(password) = password {
        recdb_crypto::encrypt_record(&mut record, rset, password)?;
    }
    rset.push_record(record);
    Ok(1)
}

/// Removes every record `selector` matches from the `type_name` record
/// set, or (with `REC_F_COMMENT_OUT`) converts each to a comment instead.
pub fn delete(
    db: &mut Database,
    type_name: Option<&str>,
    selector: &Selector,
    flags: QueryFlags,
) -> Result<usize, QueryError> {
    selector.validate()?;
    let rset = resolve_rset_mut(db, type_name)?;
    let icase = flags.contains(QueryFlags::ICASE);
    let indices = resolve_indices(selector, rset.num_records())?;
    let matched: Vec<usize> = rset
        .records()
        .enumerate()
        .filter(|(i, r)| selected_p(r, *i, selector, indices.as_ref(), icase))
        .map(|(i, _)| i)
        .collect();
    let count = matched.len();
    // Descending order: removing/commenting-out a record shifts every
    // later record-position down by one, so later positions must be
    // resolved before earlier ones are touched.
    for pos in matched.into_iter().rev() {
        if flags.contains(QueryFlags::COMMENT_OUT) {
            rset.comment_out_record(pos);
        } else {
            rset.remove_record(pos);
        }
    }
    Ok(count)
}

/// The field-level action [`set`] applies to each matched record's
/// fex-selected fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetAction {
    /// Renames the field(s); `fex` must have exactly one element.
    Rename,
    /// Overwrites the value of every existing matching field.
    Set,
    /// Appends a new field per fex element.
    Add,
    /// Like `Set`, but creates the field if no match exists.
    SetAdd,
    /// Physically removes the matching fields.
    Delete,
    /// Turns each matching field into a comment.
    Comment,
}

/// Applies `action` (with `arg` as its value/new-name, where the action
/// needs one) to each fex-selected field of every record `selector`
/// matches. `RENAME` additionally renames the descriptor's field when no
/// selector was given (so the whole record set is being renamed, not a
/// subset of records).
pub fn set(
    db: &mut Database,
    type_name: Option<&str>,
    selector: &Selector,
    fex: &Fex,
    action: SetAction,
    arg: Option<&str>,
    flags: QueryFlags,
) -> Result<usize, QueryError> {
    if action == SetAction::Rename && fex.elements().len() != 1 {
        return Err(QueryError::InvalidRenameFex);
    }
    selector.validate()?;
    let icase = flags.contains(QueryFlags::ICASE);
    let has_selector = selector.has_explicit_selector() || selector.random > 0;
    let rset = resolve_rset_mut(db, type_name)?;

    if action == SetAction::Rename && !has_selector {
        let new_name = arg.ok_or(QueryError::MissingArgument)?;
        let old_name = &fex.elements()[0].field_name;
        if let Some(mut descriptor) = rset.descriptor().cloned() {
            if let Some(field) = descriptor.field_by_name_mut(old_name, 0) {
                field.set_name(new_name.to_string());
            }
            rset.set_descriptor(Some(descriptor));
        }
    }

    let indices = resolve_indices(selector, rset.num_records())?;
    let matched: Vec<usize> = rset
        .records()
        .enumerate()
        .filter(|(i, r)| selected_p(r, *i, selector, indices.as_ref(), icase))
        .map(|(i, _)| i)
        .collect();
    let count = matched.len();
    for pos in matched {
        let record = rset.records_mut().nth(pos).expect("position came from this rset's own records()");
        apply_action(record, fex, action, arg)?;
    }
    Ok(count)
}

fn apply_action(
    record: &mut Record,
    fex: &Fex,
    action: SetAction,
    arg: Option<&str>,
) -> Result<(), QueryError> {
    match action {
        SetAction::Rename => {
            let elem = &fex.elements()[0];
            let new_name = arg.ok_or(QueryError::MissingArgument)?;
            // Rename in descending-index order so an earlier rename
            // doesn't shift the subscript of a later one still to be done.
            for idx in subscript_positions(record, &elem.field_name, elem.min, elem.max).into_iter().rev() {
                if let Some(field) = record.field_by_name_mut(&elem.field_name, idx) {
                    field.set_name(new_name.to_string());
                }
            }
        }
        SetAction::Set => {
            let value = arg.ok_or(QueryError::MissingArgument)?;
            for elem in fex.elements() {
                for field in record.fields_mut().filter(|f| f.name() == elem.field_name) {
                    field.set_value(value.to_string());
                }
            }
        }
        SetAction::SetAdd => {
            let value = arg.ok_or(QueryError::MissingArgument)?;
            for elem in fex.elements() {
                if record.num_fields_by_name(&elem.field_name) == 0 {
                    record.push_field(Field::new(elem.field_name.clone(), value));
                } else {
                    for field in record.fields_mut().filter(|f| f.name() == elem.field_name) {
                        field.set_value(value.to_string());
                    }
                }
            }
        }
        SetAction::Add => {
            let value = arg.ok_or(QueryError::MissingArgument)?;
            for elem in fex.elements() {
                record.push_field(Field::new(elem.field_name.clone(), value));
            }
        }
        SetAction::Delete => {
            for elem in fex.elements() {
                record.remove_field_by_name(&elem.field_name, None);
            }
        }
        SetAction::Comment => {
            for elem in fex.elements() {
                let values: Vec<String> =
                    record.fields().filter(|f| f.name() == elem.field_name).map(|f| f.value().to_string()).collect();
                record.remove_field_by_name(&elem.field_name, None);
                for value in values {
                    record.push_comment(Comment::new(format!("{}: {value}", elem.field_name)));
                }
            }
        }
    }
    Ok(())
}

fn subscript_positions(record: &Record, name: &str, min: i64, max: i64) -> Vec<usize> {
    let count = record.num_fields_by_name(name);
    if min < 0 {
        return (0..count).collect();
    }
    let lo = min as usize;
    let hi = if max >= 0 { max as usize } else { lo };
    (lo..=hi).filter(|&i| i < count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdb_expr::FexKind;
    use recdb_parser::parse_str;

    fn books() -> Database {
        parse_str(
            "%rec: Book\n%key: Id\n%type: Id int\n\n\
             Id: 1\nTitle: Recutils Manual\n\n\
             Id: 2\nTitle: Unix Haters\n",
        )
        .unwrap()
    }

    #[test]
    fn insert_appends_with_auto_fields() {
        let mut db = books();
        let mut record = Record::new();
        record.push_field(Field::new("Title", "New Book"));
        let n = insert(&mut db, Some("Book"), &Selector::none(), None, record, QueryFlags::empty()).unwrap();
        assert_eq!(n, 1);
        let rset = db.by_type(Some("Book")).unwrap();
        assert_eq!(rset.num_records(), 3);
        let last = rset.records().last().unwrap();
        assert_eq!(last.field_by_name("Id", 0).unwrap().value(), "3");
    }

    #[test]
    fn insert_with_selector_replaces_matches() {
        let mut db = books();
        let mut record = Record::new();
        record.push_field(Field::new("Id", "9"));
        record.push_field(Field::new("Title", "Replaced"));
        let selector = Selector::by_sex(recdb_expr::Sex::parse("Id = 1").unwrap());
        let n = insert(&mut db, Some("Book"), &selector, None, record, QueryFlags::empty()).unwrap();
        assert_eq!(n, 1);
        let rset = db.by_type(Some("Book")).unwrap();
        assert_eq!(rset.num_records(), 2);
        assert!(rset.records().any(|r| r.field_by_name("Title", 0).unwrap().value() == "Replaced"));
    }

    #[test]
    fn delete_removes_matching_records() {
        let mut db = books();
        let selector = Selector::by_sex(recdb_expr::Sex::parse("Id = 1").unwrap());
        let n = delete(&mut db, Some("Book"), &selector, QueryFlags::empty()).unwrap();
        assert_eq!(n, 1);
        assert_eq!(db.by_type(Some("Book")).unwrap().num_records(), 1);
    }

    #[test]
    fn delete_with_comment_out_preserves_record_count_as_comments() {
        let mut db = books();
        let selector = Selector::by_sex(recdb_expr::Sex::parse("Id = 1").unwrap());
        let n = delete(&mut db, Some("Book"), &selector, QueryFlags::COMMENT_OUT).unwrap();
        assert_eq!(n, 1);
        let rset = db.by_type(Some("Book")).unwrap();
        assert_eq!(rset.num_records(), 1);
        assert!(rset.elems().any(|e| matches!(e, recdb_core::RSetElem::Comment(_))));
    }

    #[test]
    fn set_rename_updates_descriptor_when_unselected() {
        let mut db = books();
        let fex = Fex::parse(FexKind::Simple, "Title").unwrap();
        let n = set(&mut db, Some("Book"), &Selector::none(), &fex, SetAction::Rename, Some("Name"), QueryFlags::empty()).unwrap();
        assert_eq!(n, 2);
        let rset = db.by_type(Some("Book")).unwrap();
        assert!(rset.records().all(|r| r.num_fields_by_name("Title") == 0 && r.num_fields_by_name("Name") == 1));
        assert_eq!(rset.descriptor().unwrap().field_by_name("%type", 0).unwrap().value(), "Id int");
    }

    #[test]
    fn set_setadd_creates_missing_field() {
        let mut db = books();
        let fex = Fex::parse(FexKind::Simple, "Year").unwrap();
        set(&mut db, Some("Book"), &Selector::none(), &fex, SetAction::SetAdd, Some("2000"), QueryFlags::empty()).unwrap();
        let rset = db.by_type(Some("Book")).unwrap();
        assert!(rset.records().all(|r| r.field_by_name("Year", 0).unwrap().value() == "2000"));
    }

    #[test]
    fn set_comment_turns_field_into_comment() {
        let mut db = books();
        let fex = Fex::parse(FexKind::Simple, "Title").unwrap();
        set(&mut db, Some("Book"), &Selector::none(), &fex, SetAction::Comment, None, QueryFlags::empty()).unwrap();
        let rset = db.by_type(Some("Book")).unwrap();
        assert!(rset.records().all(|r| r.num_fields_by_name("Title") == 0));
    }
}
