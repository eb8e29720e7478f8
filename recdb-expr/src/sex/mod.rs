//! Selection expressions (SEX, §4.K): a boolean query language evaluated
//! against individual records.

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::{Expr, NameRef};
pub use eval::Value;

use recdb_core::Record;

use crate::error::ExprError;
use parser::Parser;

/// A compiled selection expression.
#[derive(Clone, Debug)]
pub struct Sex {
    source: String,
    expr: Expr,
}

impl Sex {
    /// Parses `source` as a selection expression.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let expr = Parser::parse(source)?;
        Ok(Sex {
            source: source.to_string(),
            expr,
        })
    }

    /// The original source text this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed tree, for callers that want to inspect or re-evaluate it
    /// directly (e.g. `recdb-agg`'s own field extraction).
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Whether `record` satisfies this expression.
    ///
    /// A record is tried once as-is. If that fails, and the expression
    /// references a field name (outside of `#`) that occurs more than once
    /// in the record, the record is tried again once per occurrence of that
    /// field — each time with every *other* occurrence of that name removed
    /// — stopping at the first attempt that succeeds. This lets a selection
    /// like `Email ~ "@example.com"` match a record whose second `Email`
    /// field is the one that qualifies, without requiring every occurrence
    /// to match. A run that raises an evaluation error (type coercion
    /// failure, division by zero, a field that's simply absent) is treated
    /// as non-matching rather than propagated: selection is a filter, not a
    /// type-checker.
    pub fn matches(&self, record: &Record) -> bool {
        if self.try_eval(record) {
            return true;
        }
        for name in eval::referenced_names(&self.expr) {
            let count = record.num_fields_by_name(&name);
            if count > 1 {
                for k in 0..count {
                    let working = eval::restrict_to_occurrence(record, &name, k);
                    if self.try_eval(&working) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Evaluates the expression's raw value against `record` (first
    /// occurrence of any multiply-occurring field), for callers that need
    /// the value rather than a boolean filter decision.
    pub fn eval_value(&self, record: &Record) -> Result<Value, crate::error::EvalError> {
        eval::eval(&self.expr, record)
    }

    fn try_eval(&self, record: &Record) -> bool {
        eval::eval(&self.expr, record).map(|v| v.truthy()).unwrap_or(false)
    }
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
    fn simple_match() {
        let sex = Sex::parse("Year > 2000").unwrap();
        assert!(sex.matches(&rec(&[("Year", "2010")])));
        assert!(!sex.matches(&rec(&[("Year", "1999")])));
    }

    #[test]
    fn latches_onto_the_matching_occurrence_of_a_repeated_field() {
        let sex = Sex::parse(r#"Email ~ "@work\\.com""#).unwrap();
        let r = rec(&[("Email", "a@home.com"), ("Email", "b@work.com")]);
        assert!(sex.matches(&r));
    }

    #[test]
    fn no_match_when_no_occurrence_satisfies_it() {
        let sex = Sex::parse(r#"Email ~ "@work\\.com""#).unwrap();
        let r = rec(&[("Email", "a@home.com"), ("Email", "b@home.com")]);
        assert!(!sex.matches(&r));
    }

    #[test]
    fn missing_field_does_not_match_rather_than_erroring() {
        let sex = Sex::parse("Missing = 1").unwrap();
        assert!(!sex.matches(&rec(&[("A", "1")])));
    }
}
