//! Evaluating a parsed selection expression against a record.

use std::collections::HashSet;

use recdb_core::{parse_date, parse_int, Record};
use regex::Regex;

use super::ast::Expr;
use crate::error::EvalError;

/// The runtime value a selection-expression subtree reduces to.
#[derive(Clone, Debug)]
pub enum Value {
    /// An absent/undefined value (`NoVal`), falsy and equal only to itself.
    NoVal,
    /// An integer.
    Int(i64),
    /// A real number.
    Real(f64),
    /// A string (typically a field's raw textual value).
    Str(String),
}

impl Value {
    /// Whether this value counts as "true" in a boolean context: zero,
    /// empty string, and `NoVal` are falsy; everything else is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::NoVal => false,
            Value::Int(n) => *n != 0,
            Value::Real(r) => *r != 0.0,
            Value::Str(s) => !s.is_empty() && s != "0",
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Value::NoVal => 0.0,
            Value::Int(n) => *n as f64,
            Value::Real(r) => *r,
            Value::Str(s) => parse_leading_f64(s),
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            Value::NoVal => 0,
            Value::Int(n) => *n,
            Value::Real(r) => *r as i64,
            Value::Str(s) => parse_leading_i64(s),
        }
    }

    fn as_str(&self) -> String {
        match self {
            Value::NoVal => String::new(),
            Value::Int(n) => n.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Str(s) => s.clone(),
        }
    }

    /// Whether this value should be treated as numeric for an arithmetic or
    /// relational operator: non-string values always are, and a string is
    /// numeric only if it parses fully as a real (covers plain integers
    /// too, since every integer literal is also valid float syntax).
    fn looks_numeric(&self) -> bool {
        match self {
            Value::NoVal | Value::Int(_) | Value::Real(_) => true,
            Value::Str(s) => s.trim().parse::<f64>().is_ok(),
        }
    }

    /// Whether either operand carries a fractional/real representation, in
    /// which case an arithmetic operator computes in floating point rather
    /// than truncating to integers.
    fn is_real(&self) -> bool {
        match self {
            Value::Real(_) => true,
            Value::Str(s) => s.contains('.') || s.to_ascii_lowercase().contains('e'),
            _ => false,
        }
    }
}

fn parse_leading_f64(s: &str) -> f64 {
    let s = s.trim();
    let end = leading_number_end(s, true);
    s[..end].parse::<f64>().unwrap_or(0.0)
}

fn parse_leading_i64(s: &str) -> i64 {
    let s = s.trim();
    let end = leading_number_end(s, false);
    s[..end].parse::<i64>().unwrap_or(0)
}

fn leading_number_end(s: &str, allow_dot: bool) -> usize {
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            seen_digit = true;
            end = i + 1;
        } else if (c == '+' || c == '-') && i == 0 {
            end = i + 1;
        } else if c == '.' && allow_dot && !seen_dot && seen_digit {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }
    end
}

fn numeric_binop(
    a: &Value,
    b: &Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    real_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if a.is_real() || b.is_real() {
        Ok(Value::Real(real_op(a.as_f64(), b.as_f64())))
    } else {
        match int_op(a.as_i64(), b.as_i64()) {
            Some(v) => Ok(Value::Int(v)),
            None => Err(EvalError::DivByZero),
        }
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> std::cmp::Ordering {
    if a.is_real() || b.is_real() {
        a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(std::cmp::Ordering::Equal)
    } else {
        a.as_i64().cmp(&b.as_i64())
    }
}

/// Evaluates `expr` against `record`, with no latching/retry behaviour: a
/// field that occurs more than once resolves to its first occurrence, and a
/// missing field is an error.
pub fn eval(expr: &Expr, record: &Record) -> Result<Value, EvalError> {
    match expr {
        Expr::NoVal => Ok(Value::NoVal),
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Real(r) => Ok(Value::Real(*r)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Name(name) => {
            let idx = if name.index < 0 { 0 } else { name.index as usize };
            match record.field_by_name(&name.name, idx) {
                Some(field) => Ok(Value::Str(field.value().to_string())),
                // An absent field resolves to the empty string rather than
                // an evaluation error; selection still treats an overall
                // false result the same way either way.
                None => Ok(Value::Str(String::new())),
            }
        }
        Expr::Neg(inner) => {
            let v = eval(inner, record)?;
            if v.is_real() {
                Ok(Value::Real(-v.as_f64()))
            } else {
                Ok(Value::Int(-v.as_i64()))
            }
        }
        Expr::Not(inner) => Ok(bool_value(!eval(inner, record)?.truthy())),
        Expr::Hash(inner) => match inner.as_ref() {
            Expr::Name(name) => Ok(Value::Int(record.num_fields_by_name(&name.name) as i64)),
            _ => Err(EvalError::NotADate),
        },
        Expr::Add(a, b) => {
            let (va, vb) = (eval(a, record)?, eval(b, record)?);
            if va.looks_numeric() && vb.looks_numeric() {
                numeric_binop(&va, &vb, |x, y| x.checked_add(y), |x, y| x + y)
            } else {
                Ok(Value::Str(format!("{}{}", va.as_str(), vb.as_str())))
            }
        }
        Expr::Sub(a, b) => {
            let (va, vb) = (eval(a, record)?, eval(b, record)?);
            numeric_binop(&va, &vb, |x, y| x.checked_sub(y), |x, y| x - y)
        }
        Expr::Mul(a, b) => {
            let (va, vb) = (eval(a, record)?, eval(b, record)?);
            numeric_binop(&va, &vb, |x, y| x.checked_mul(y), |x, y| x * y)
        }
        Expr::Div(a, b) => {
            let (va, vb) = (eval(a, record)?, eval(b, record)?);
            if !va.is_real() && !vb.is_real() && vb.as_i64() == 0 {
                return Err(EvalError::DivByZero);
            }
            numeric_binop(&va, &vb, |x, y| x.checked_div(y), |x, y| x / y)
        }
        Expr::Mod(a, b) => {
            let (va, vb) = (eval(a, record)?, eval(b, record)?);
            if vb.as_i64() == 0 {
                return Err(EvalError::DivByZero);
            }
            numeric_binop(&va, &vb, |x, y| x.checked_rem(y), |x, y| x % y)
        }
        Expr::Eq(a, b) => Ok(bool_value(values_eq(&eval(a, record)?, &eval(b, record)?))),
        Expr::Neq(a, b) => Ok(bool_value(!values_eq(&eval(a, record)?, &eval(b, record)?))),
        Expr::Lt(a, b) => Ok(bool_value(compare(&eval(a, record)?, &eval(b, record)?).is_lt())),
        Expr::Lte(a, b) => Ok(bool_value(compare(&eval(a, record)?, &eval(b, record)?).is_le())),
        Expr::Gt(a, b) => Ok(bool_value(compare(&eval(a, record)?, &eval(b, record)?).is_gt())),
        Expr::Gte(a, b) => Ok(bool_value(compare(&eval(a, record)?, &eval(b, record)?).is_ge())),
        Expr::And(a, b) => Ok(bool_value(eval(a, record)?.truthy() && eval(b, record)?.truthy())),
        Expr::Or(a, b) => Ok(bool_value(eval(a, record)?.truthy() || eval(b, record)?.truthy())),
        Expr::Implies(a, b) => Ok(bool_value(!eval(a, record)?.truthy() || eval(b, record)?.truthy())),
        Expr::Mat(a, b) => {
            let (va, vb) = (eval(a, record)?, eval(b, record)?);
            let re = Regex::new(&vb.as_str()).map_err(|e| EvalError::InvalidRegex(e.to_string()))?;
            Ok(bool_value(re.is_match(&va.as_str())))
        }
        Expr::Before(a, b) => Ok(bool_value(date_cmp(a, b, record)?.is_lt())),
        Expr::After(a, b) => Ok(bool_value(date_cmp(a, b, record)?.is_gt())),
        Expr::SameTime(a, b) => Ok(bool_value(date_cmp(a, b, record)?.is_eq())),
        Expr::Cond(c, t, f) => {
            if eval(c, record)?.truthy() {
                eval(t, record)
            } else {
                eval(f, record)
            }
        }
    }
}

fn bool_value(b: bool) -> Value {
    Value::Int(if b { 1 } else { 0 })
}

fn values_eq(a: &Value, b: &Value) -> bool {
    if a.looks_numeric() && b.looks_numeric() {
        numeric_cmp(a, b).is_eq()
    } else {
        a.as_str() == b.as_str()
    }
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    if a.looks_numeric() && b.looks_numeric() {
        numeric_cmp(a, b)
    } else {
        a.as_str().cmp(&b.as_str())
    }
}

fn date_cmp(a: &Expr, b: &Expr, record: &Record) -> Result<std::cmp::Ordering, EvalError> {
    let va = eval(a, record)?;
    let vb = eval(b, record)?;
    let da = parse_date(&va.as_str()).ok_or(EvalError::NotADate)?;
    let db = parse_date(&vb.as_str()).ok_or(EvalError::NotADate)?;
    Ok(da.cmp(&db))
}

/// Collects every field name a selection expression reads for a value
/// *without* an explicit subscript, excluding names that only ever appear
/// as the operand of `#` (cardinality doesn't latch: asking how many
/// `Email` fields exist doesn't commit to any one of them) and excluding
/// `Name[k]` references, which already pin a specific occurrence and so
/// must not be varied by the record-evaluation retry.
pub fn referenced_names(expr: &Expr) -> HashSet<String> {
    let mut out = HashSet::new();
    collect_names(expr, &mut out, false);
    out
}

fn collect_names(expr: &Expr, out: &mut HashSet<String>, under_hash: bool) {
    match expr {
        Expr::NoVal | Expr::Int(_) | Expr::Real(_) | Expr::Str(_) => {}
        Expr::Name(name) => {
            if !under_hash && name.index < 0 {
                out.insert(name.name.clone());
            }
        }
        Expr::Neg(a) | Expr::Not(a) => collect_names(a, out, under_hash),
        Expr::Hash(a) => collect_names(a, out, true),
        Expr::Add(a, b)
        | Expr::Sub(a, b)
        | Expr::Mul(a, b)
        | Expr::Div(a, b)
        | Expr::Mod(a, b)
        | Expr::Eq(a, b)
        | Expr::Neq(a, b)
        | Expr::Lt(a, b)
        | Expr::Lte(a, b)
        | Expr::Gt(a, b)
        | Expr::Gte(a, b)
        | Expr::And(a, b)
        | Expr::Or(a, b)
        | Expr::Mat(a, b)
        | Expr::Before(a, b)
        | Expr::After(a, b)
        | Expr::SameTime(a, b)
        | Expr::Implies(a, b) => {
            collect_names(a, out, under_hash);
            collect_names(b, out, under_hash);
        }
        Expr::Cond(c, t, f) => {
            collect_names(c, out, under_hash);
            collect_names(t, out, under_hash);
            collect_names(f, out, under_hash);
        }
    }
}

/// Builds a copy of `record` in which every field named `name` other than
/// its `k`-th occurrence has been dropped (the iteration algorithm's
/// "working record").
pub fn restrict_to_occurrence(record: &Record, name: &str, k: usize) -> Record {
    let mut out = Record::new();
    out.set_source_position(record.source_position());
    let mut seen = 0usize;
    for elem in record.elems() {
        match elem {
            recdb_core::RecordElem::Field(f) if f.name() == name => {
                if seen == k {
                    out.push_field(f.clone());
                }
                seen += 1;
            }
            recdb_core::RecordElem::Field(f) => out.push_field(f.clone()),
            recdb_core::RecordElem::Comment(c) => out.push_comment(c.clone()),
        }
    }
    out
}
