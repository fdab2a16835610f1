//! Steward - Multi-host static and CGI web server
//!
//! Core library for HTTP parsing, site resolution and response generation.

pub mod config;
pub mod http;
pub mod serve;
pub mod server;
pub mod site;
