//! # pgprobe-db
//!
//! Opens a single PostgreSQL connection, asks the server for its version and
//! closes the connection again. No pooling, no retries.

pub mod postgres;

pub use postgres::{probe, probe_with_query, Connection, VERSION_QUERY};
