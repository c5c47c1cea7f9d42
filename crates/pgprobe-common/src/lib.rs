//! # pgprobe-common
//!
//! Configuration and error handling shared by the probe and the binary.
//! No database access happens here.

pub mod config;
pub mod error;
