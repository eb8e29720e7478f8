//! Field expressions (FEX): a list of field references used for
//! projection and aggregation.

use crate::error::ExprError;

/// Which of the three FEX surface syntaxes a [`Fex`] was parsed as.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FexKind {
    /// Whitespace-separated `NAME(.SUB)?` elements.
    Simple,
    /// Comma-separated `NAME(.SUB)?` elements.
    Csv,
    /// Comma-separated elements, each either a function call
    /// `FnName(NAME(.SUB)?)` or `NAME(.SUB)?([MIN(-MAX)?])?`, optionally
    /// followed by `: REWRITE`.
    Subscripts,
}

/// One element of a field expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FexElem {
    /// The referenced field name (subscript dotted names are joined with
    /// `_`, e.g. `Address.City` becomes `Address_City`).
    pub field_name: String,
    /// The aggregate function name, if this element is a function call.
    pub function_name: Option<String>,
    /// Lower index bound, or `-1` if absent.
    pub min: i64,
    /// Upper index bound, or `-1` if absent.
    pub max: i64,
    /// The name to project this element's value under, if a `: REWRITE`
    /// suffix was given.
    pub rewrite_to: Option<String>,
}

impl FexElem {
    /// The name this element's result should be stored/projected under:
    /// the rewrite alias if given, otherwise `function_name_field_name` for
    /// a call, otherwise just `field_name`.
    pub fn output_name(&self) -> String {
        if let Some(rewrite) = &self.rewrite_to {
            return rewrite.clone();
        }
        match &self.function_name {
            Some(func) => format!("{func}_{}", self.field_name),
            None => self.field_name.clone(),
        }
    }
}

/// A parsed field expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fex {
    kind: FexKind,
    elements: Vec<FexElem>,
}

impl Fex {
    /// Parses `text` as a FEX of the given surface `kind`.
    pub fn parse(kind: FexKind, text: &str) -> Result<Self, ExprError> {
        let elements = match kind {
            FexKind::Simple => text
                .split_whitespace()
                .map(|tok| simple_elem(tok))
                .collect::<Result<Vec<_>, _>>()?,
            FexKind::Csv => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(simple_elem)
                .collect::<Result<Vec<_>, _>>()?,
            FexKind::Subscripts => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(subscript_elem)
                .collect::<Result<Vec<_>, _>>()?,
        };
        if elements.is_empty() {
            return Err(ExprError::InvalidFex(text.to_string()));
        }
        Ok(Fex { kind, elements })
    }

    /// The surface syntax this FEX was parsed as.
    pub fn kind(&self) -> FexKind {
        self.kind
    }

    /// The elements, in declaration order.
    pub fn elements(&self) -> &[FexElem] {
        &self.elements
    }

    /// Whether every element is a function call (`all_calls_p`).
    pub fn all_calls_p(&self) -> bool {
        self.elements.iter().all(|e| e.function_name.is_some())
    }

    /// Field names referenced by this FEX, in order (join-subname already
    /// folded with `_`).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.field_name.as_str())
    }
}

fn join_dotted(name: &str) -> String {
    match name.split_once('.') {
        Some((base, sub)) => format!("{base}_{sub}"),
        None => name.to_string(),
    }
}

fn simple_elem(tok: &str) -> Result<FexElem, ExprError> {
    if tok.is_empty() {
        return Err(ExprError::InvalidFex(tok.to_string()));
    }
    Ok(FexElem {
        field_name: join_dotted(tok),
        function_name: None,
        min: -1,
        max: -1,
        rewrite_to: None,
    })
}

fn subscript_elem(raw: &str) -> Result<FexElem, ExprError> {
    let (core, rewrite) = match raw.split_once(':') {
        Some((a, b)) => (a.trim(), Some(b.trim().to_string())),
        None => (raw.trim(), None),
    };

    if let Some(open) = core.find('(') {
        if core.ends_with(')') {
            let fname = core[..open].trim();
            let inner = core[open + 1..core.len() - 1].trim();
            if !fname.is_empty() && !inner.is_empty() {
                return Ok(FexElem {
                    field_name: join_dotted(inner),
                    function_name: Some(fname.to_string()),
                    min: -1,
                    max: -1,
                    rewrite_to: rewrite,
                });
            }
        }
        return Err(ExprError::InvalidFex(raw.to_string()));
    }

    let (name_part, bracket) = match core.find('[') {
        Some(i) if core.ends_with(']') => (core[..i].trim(), Some(&core[i + 1..core.len() - 1])),
        Some(_) => return Err(ExprError::InvalidFex(raw.to_string())),
        None => (core, None),
    };

    let (min, max) = match bracket {
        Some(b) => match b.split_once('-') {
            Some((lo, hi)) => (
                lo.trim()
                    .parse::<i64>()
                    .map_err(|_| ExprError::InvalidFex(raw.to_string()))?,
                hi.trim()
                    .parse::<i64>()
                    .map_err(|_| ExprError::InvalidFex(raw.to_string()))?,
            ),
            None => {
                let v = b
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ExprError::InvalidFex(raw.to_string()))?;
                (v, v)
            }
        },
        None => (-1, -1),
    };

    if name_part.is_empty() {
        return Err(ExprError::InvalidFex(raw.to_string()));
    }

    Ok(FexElem {
        field_name: join_dotted(name_part),
        function_name: None,
        min,
        max,
        rewrite_to: rewrite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_fex_splits_on_whitespace_and_joins_subnames() {
        let fex = Fex::parse(FexKind::Simple, "Name Address.City  Id").unwrap();
        let names: Vec<_> = fex.field_names().collect();
        assert_eq!(names, vec!["Name", "Address_City", "Id"]);
    }

    #[test]
    fn csv_fex_splits_on_commas() {
        let fex = Fex::parse(FexKind::Csv, "Id, Year , Title").unwrap();
        let names: Vec<_> = fex.field_names().collect();
        assert_eq!(names, vec!["Id", "Year", "Title"]);
    }

    #[test]
    fn subscripts_fex_function_call() {
        let fex = Fex::parse(FexKind::Subscripts, "count(Id),avg(Year)").unwrap();
        assert!(fex.all_calls_p());
        assert_eq!(fex.elements()[0].function_name.as_deref(), Some("count"));
        assert_eq!(fex.elements()[0].output_name(), "count_Id");
    }

    #[test]
    fn subscripts_fex_range_and_rewrite() {
        let fex = Fex::parse(FexKind::Subscripts, "Name[1-3]: Alias").unwrap();
        let elem = &fex.elements()[0];
        assert_eq!(elem.min, 1);
        assert_eq!(elem.max, 3);
        assert_eq!(elem.output_name(), "Alias");
    }

    #[test]
    fn not_all_calls_p_when_mixed() {
        let fex = Fex::parse(FexKind::Subscripts, "count(Id),Title").unwrap();
        assert!(!fex.all_calls_p());
    }
}
