//! bootcrab
//!
//! A small HTTP server handing out [iPXE] boot scripts and other per-machine configuration
//! files rendered from templates.
//!
//! Each request is matched to the machine making it: by its source address (or the first
//! `X-Forwarded-For` entry), and by its hostname, either given with the `host` query parameter
//! or found with a reverse DNS lookup. Query parameters, the client's identity, and the
//! parameters of the first matching [hostname or network rule][mappings] are merged into the
//! [variables][variables] a template is rendered with.
//!
//! [iPXE]: https://ipxe.org
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod identity;
pub mod mappings;
pub mod templates;
pub mod variables;

pub use api::new as new_http;
pub use config::{Config, Shared};
pub use dns::PtrClient;
pub use templates::{DirTemplateStore, InMemoryTemplateStore};
pub use variables::{Variable, VariableTree};
