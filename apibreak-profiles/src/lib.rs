//! Endpoint profile ingestion.
//!
//! Loading is tolerant: one unreadable or unparseable file doesn't stop the others, it is
//! reported and skipped. Registry construction is strict about identity: two declarations for
//! the same endpoint (in either path notation) fail the whole load.

mod load;
mod registry;
mod routes;

pub use load::{LoadedProfileFile, ProfileLoadError, load_profile_files, parse_profile_file};
pub use registry::{ProfileRegistry, RegistryError};
pub use routes::{RouteTable, parse_route_table};
