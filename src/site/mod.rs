//! Site configuration shared by every connection.
//!
//! The registry is built once at startup and read concurrently afterwards;
//! nothing in it is mutated while the server runs.

pub mod registry;
pub mod resolve;

pub use registry::{FileKind, SiteRegistry, VirtualHost};
pub use resolve::ResolvedTarget;
