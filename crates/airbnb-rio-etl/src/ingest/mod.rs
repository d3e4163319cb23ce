//! Ingestion module.
//!
//! Reads the listings and reviews CSV files and joins them on the key column.

mod join;
mod loader;

pub use join::join_on_key;
pub use loader::load_csv;
