//! Template variables.
//!
//! Every rendered template receives a [`VariableTree`] assembled from four sources. From lowest
//! to highest precedence:
//!
//! 1. Framework defaults: `baseURL`, the configured
//!    [`Config::base_url`][`crate::config::Config::base_url`], suffixed with `env/<name>` when
//!    the request names an environment.
//! 2. Client identity: `ip_address` and `hostname`, see [`crate::identity`].
//! 3. The `params` of the [mapping rule][crate::mappings] matching the client, if the client
//!    didn't pass an explicit `host`.
//! 4. The request's query parameters. Dotted keys build nested levels, so
//!    `?net.eth0.ip=10.0.0.2&net.eth0.gw=10.0.0.1` renders `{{.net.eth0.ip}}` and
//!    `{{.net.eth0.gw}}`.
//!
//! On a key collision at the same level the higher source wins.

mod merge;
mod tree;

pub use merge::{merge_variables, BASE_URL_VAR};
pub use tree::{Variable, VariableTree};
