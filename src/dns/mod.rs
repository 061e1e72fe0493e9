//! Reverse DNS lookups for booting clients.
//!
//! When a client doesn't name itself with the `host` query parameter, bootcrab asks the
//! configured DNS server ([`Config::dns_server`][`crate::config::Config::dns_server`]) for the
//! `PTR` record of the client's effective IP. The answer is used verbatim as the client's
//! hostname, so a fully qualified answer keeps its trailing dot:
//!
//! ```bash
//! ❯ dig @10.0.0.1 -x 10.0.0.42 +short
//! node42.rack1.example.com.
//! ```
//!
//! A failed, timed out, or empty lookup is not an error for the request being served. The
//! client is treated as having an unknown (empty) hostname, see
//! [`IdentityResolver`][crate::identity::IdentityResolver].

use crate::error::Error;
use std::net::IpAddr;
use std::sync::Arc;

pub mod client;

pub use client::PtrClient;

/// `DynReverseLookup` is a type alias for a [`ReverseLookup`] shared between concurrent
/// requests through an [`Arc`].
#[allow(clippy::module_name_repetitions)]
pub type DynReverseLookup = Arc<dyn ReverseLookup + Send + Sync>;

/// An async trait describing a `PTR` lookup for an IP address.
#[async_trait::async_trait]
pub trait ReverseLookup {
    /// Return the first `PTR` answer for `ip`.
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<String, Error>;
}
