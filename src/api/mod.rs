//! HTTP API serving rendered boot scripts.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/params` (GET)
//!
//!   Expects a `script` query parameter naming a template, and optionally an `environment`
//!   (defaults to `default`). Returns HTTP 200 (OK) and a JSON array with the names of the
//!   variables the template uses, minus the names in
//!   [`Config::params_blacklist`][`crate::config::Config::params_blacklist`]:
//!
//!   ```bash
//!   ❯ curl 'http://localhost:8081/params?script=debian.ipxe'
//!   ["hostname","net.eth0.ip"]
//!   ```
//!
//!   Returns HTTP 500 (Internal Server Error) when `script` is missing.
//!
//! ## `/<template>` (GET)
//!
//!   Every other path renders the template named by the path, e.g. `/debian.ipxe` or
//!   `/preseed/base.cfg`. The environment is taken from an `/env/<name>/` path prefix, or from
//!   the `environment` query parameter.
//!
//!   Template variables are assembled as described in [`crate::variables`]: all query
//!   parameters (`?net.eth0.ip=10.0.0.2` builds a nested `net.eth0.ip`), the client's
//!   `ip_address` and `hostname`, and the `params` of a matching [mapping rule][crate::mappings].
//!   A `host` query parameter names the client explicitly, skipping reverse DNS and mapping
//!   rules:
//!
//!   ```bash
//!   ❯ curl 'http://localhost:8081/env/prod/debian.ipxe?host=node42&net.eth0.ip=10.0.0.2'
//!   #!ipxe
//!   kernel http://boot.example.com:8081/env/prod/vmlinuz hostname=node42 ip=10.0.0.2
//!   ```
//!
//!   Returns HTTP 200 (OK) with the rendered template, HTTP 404 (Not Found) when the path names
//!   no template, HTTP 400 (Bad Request) when query parameters collide (e.g. `net=x&net.ip=y`),
//!   and HTTP 500 (Internal Server Error) when rendering fails. Error bodies are the error text.
//!
//! # Forwarded requests
//!
//!   When [`Config::trust_forwarded_for`][`crate::config::Config::trust_forwarded_for`] is set
//!   (the default), the first address in an `X-Forwarded-For` header is used as the client's
//!   address. The header is not authenticated.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
