//! Client identification.
//!
//! Works out which machine is asking for a boot script: the IP address it connects from (or
//! the first address in `X-Forwarded-For` when it reaches us through a proxy), and its hostname,
//! either given explicitly by the client or found through a reverse DNS lookup.

use crate::dns::ReverseLookup;
use crate::variables::VariableTree;
use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Header carrying the original client address when requests are proxied, e.g. by a load
/// balancer in front of bootcrab.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Synthetic variable holding the client's effective IP.
pub const IP_ADDRESS_VAR: &str = "ip_address";

/// Synthetic variable holding the client's hostname.
pub const HOSTNAME_VAR: &str = "hostname";

/// Who a request came from, resolved once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct ClientIdentity {
    /// The transport source address, without its port.
    pub source_ip: Option<IpAddr>,
    /// The first `X-Forwarded-For` entry, when forwarded headers are trusted.
    pub forwarded_ip: Option<IpAddr>,
    /// The hostname the client supplied with the `host` query parameter.
    pub explicit_host: Option<String>,
    /// The explicit host if one was supplied, otherwise the `PTR` answer for the effective IP.
    /// Empty when the hostname is unknown.
    pub resolved_host: String,
}

impl ClientIdentity {
    /// The address used for network mapping lookups.
    #[must_use]
    pub fn effective_ip(&self) -> Option<IpAddr> {
        self.forwarded_ip.or(self.source_ip)
    }

    #[must_use]
    pub fn has_explicit_host(&self) -> bool {
        self.explicit_host.is_some()
    }

    /// The identity derived template variables: `hostname`, and `ip_address` when an effective
    /// IP is known.
    #[must_use]
    pub fn variables(&self) -> VariableTree {
        let mut vars = VariableTree::new();
        if let Some(ip) = self.effective_ip() {
            vars.set_scalar(IP_ADDRESS_VAR, ip.to_string());
        }
        vars.set_scalar(HOSTNAME_VAR, self.resolved_host.clone());
        vars
    }
}

/// Resolves a [`ClientIdentity`] for each request.
pub struct IdentityResolver<'a> {
    dns: &'a (dyn ReverseLookup + Send + Sync),
    trust_forwarded_for: bool,
}

impl<'a> IdentityResolver<'a> {
    #[must_use]
    pub fn new(dns: &'a (dyn ReverseLookup + Send + Sync), trust_forwarded_for: bool) -> Self {
        Self {
            dns,
            trust_forwarded_for,
        }
    }

    /// Identify the client of a request.
    ///
    /// Never fails: an unknown source address leaves the identity without an IP, and a failed
    /// reverse lookup leaves it with an empty hostname. The DNS server is only queried when no
    /// explicit host was given and an effective IP is known.
    pub async fn resolve(
        &self,
        source_addr: Option<SocketAddr>,
        headers: &HeaderMap,
        explicit_host: Option<&str>,
    ) -> ClientIdentity {
        let source_ip = source_addr.map(|addr| addr.ip());
        if source_ip.is_none() {
            tracing::debug!("request has no transport source address");
        }

        let forwarded_ip = if self.trust_forwarded_for {
            forwarded_ip(headers)
        } else {
            None
        };

        let explicit_host = explicit_host
            .filter(|host| !host.is_empty())
            .map(ToString::to_string);

        let mut identity = ClientIdentity {
            source_ip,
            forwarded_ip,
            explicit_host,
            resolved_host: String::new(),
        };

        identity.resolved_host = match (&identity.explicit_host, identity.effective_ip()) {
            (Some(host), _) => host.clone(),
            (None, Some(ip)) => self.lookup_hostname(ip).await,
            (None, None) => String::new(),
        };
        identity
    }

    async fn lookup_hostname(&self, ip: IpAddr) -> String {
        match self.dns.reverse_lookup(ip).await {
            Ok(host) => {
                tracing::debug!("resolved {ip} to \"{host}\"");
                host
            }
            Err(err) => {
                tracing::error!("error resolving hostname for {ip}: {err}");
                String::new()
            }
        }
    }
}

/// The first entry of the `X-Forwarded-For` header, if present and a valid IP address.
#[must_use]
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get(FORWARDED_FOR_HEADER)?.to_str().ok()?;
    if value.is_empty() {
        return None;
    }
    let first = value.split(", ").next()?.trim();
    match first.parse() {
        Ok(ip) => Some(ip),
        Err(_) => {
            tracing::debug!("ignoring unparsable {FORWARDED_FOR_HEADER} entry \"{first}\"");
            None
        }
    }
}
