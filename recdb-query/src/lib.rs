//! # recdb-query
//!
//! Query, insert, delete, and set operations over a [`recdb_core::Database`],
//! plus the integrity checker that validates a record set against its own
//! descriptor (§4.M, §4.N).
//!
//! This crate is the one place selection (`sex`/`fast_string`/index/random),
//! projection (FEX), aggregation, encryption, and descriptor-derived rules
//! all come together; each of those concerns itself lives in a lower crate
//! (`recdb-expr`, `recdb-agg`, `recdb-crypto`) that knows nothing of the
//! others.

mod error;
mod flags;
mod integrity;
mod mutate;
mod projection;
mod query;
mod selector;

pub use error::QueryError;
pub use flags::QueryFlags;
pub use integrity::{check_db, check_rset, ExternalDescriptorFetcher};
pub use mutate::{delete, insert, set, SetAction};
pub use query::{query, QueryOptions};
pub use selector::{IndexRange, Selector};
