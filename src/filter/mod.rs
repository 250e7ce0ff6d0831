//! SQL fragment builders shared by the data-access models.
//!
//! `partial_update` turns a sparse update into a `SET` clause, `filter_where`
//! turns typed search criteria into a `WHERE` clause. Both return a clause string
//! with `$n` placeholders plus the parameter values in placeholder order.

pub mod error;
pub mod filter_where;
pub mod partial_update;
pub mod types;

pub use error::ValidationError;
pub use filter_where::FilterWhere;
pub use partial_update::sql_for_partial_update;
pub use types::*;
