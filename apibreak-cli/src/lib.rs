//! Library half of the `apibreak` binary: configuration and explanation tables.

pub mod config;
pub mod explain;
