//! # recdb-expr
//!
//! The two small expression languages used to query a database: field
//! expressions ([`Fex`]) that name which fields to project, and
//! selection expressions ([`Sex`]) that decide which records match.
//!
//! Both operate purely on [`recdb_core::Record`]/field data; neither knows
//! about files, record sets as a whole, or aggregation (that's
//! `recdb-parser`/`recdb-writer`/`recdb-agg`).

mod error;
mod fex;
mod sex;

pub use error::{EvalError, ExprError};
pub use fex::{Fex, FexElem, FexKind};
pub use sex::{Expr, NameRef, Sex, Value};
