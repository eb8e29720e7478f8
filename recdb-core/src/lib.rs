//! # recdb-core
//!
//! Core data model for `recdb`: the growable [`Buffer`], the generic
//! [`MSet`] multi-set, [`Field`]/[`Comment`] primitives, [`Record`], the
//! [`Type`] system, [`RSet`] (record sets with descriptor-derived state),
//! and [`Database`].
//!
//! This crate has no knowledge of the textual syntax (that's
//! `recdb-parser`/`recdb-writer`) or of the expression languages that query
//! it (that's `recdb-expr`); it only models the data.

mod buffer;
mod db;
mod error;
mod field;
mod mset;
mod record;
mod rset;
mod types;

pub use self::{
    buffer::Buffer,
    db::Database,
    error::CoreError,
    field::{Comment, Field, SourceLoc},
    mset::{Kind, MSet, MSetElem},
    record::{Record, RecordElem},
    rset::{Derived, FieldProps, RSet, RSetElem, SizeBounds},
    types::{parse_date, parse_int, Type, TypeKind, TypeRegistry, INT_MAX, INT_MIN},
};
