//! Response generation.
//!
//! Once a request is parsed and resolved, everything that turns it into
//! bytes lives here: strategy selection, static file transfer, directory
//! listings, CGI invocation and error pages.

pub mod autoindex;
pub mod cgi;
pub mod engine;
pub mod error_page;
pub mod static_file;

pub use engine::{Outcome, Strategy};
