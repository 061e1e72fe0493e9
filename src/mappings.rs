//! Hostname and network mapping rules.
//!
//! Mapping rules attach boot script parameters to clients that don't pass them in the request.
//! Rules are read from the config and tried in the order they are listed, first match wins:
//!
//! ```json
//! {
//!   "hostname_maps": [
//!     { "hostname": "^db[0-9]+\\.", "script": { "name": "debian.ipxe", "params": { "role": "db" } } }
//!   ],
//!   "network_maps": [
//!     { "network": "10.0.0.0/24", "script": { "name": "rescue.ipxe", "params": { "role": "rescue" } } }
//!   ]
//! }
//! ```
//!
//! Hostname patterns are unanchored regular expressions, anchor them explicitly where needed.

use crate::identity::ClientIdentity;
use ipnetwork::IpNetwork;
use regex::Regex;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// The boot script a mapping rule points at, and the variables it supplies.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// A rule matching clients by (reverse resolved or explicit) hostname.
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct HostnameMap {
    #[serde_as(as = "DisplayFromStr")]
    pub hostname: Regex,
    pub script: Script,
}

/// A rule matching clients by effective IP.
#[derive(Deserialize, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct NetworkMap {
    pub network: IpNetwork,
    pub script: Script,
}

/// The first hostname rule matching `hostname`. An empty (unknown) hostname matches nothing.
#[must_use]
pub fn find_script_for_hostname<'a>(maps: &'a [HostnameMap], hostname: &str) -> Option<&'a Script> {
    if hostname.is_empty() {
        return None;
    }
    maps.iter()
        .find(|map| map.hostname.is_match(hostname))
        .map(|map| &map.script)
}

/// The first network rule whose network contains `ip`.
#[must_use]
pub fn find_script_for_network(maps: &[NetworkMap], ip: IpAddr) -> Option<&Script> {
    maps.iter()
        .find(|map| map.network.contains(ip))
        .map(|map| &map.script)
}

/// Find the mapping rule that applies to a client that didn't name itself.
///
/// Hostname rules are tried first; network rules are only consulted when no hostname rule
/// matches. Clients with an explicit host never fall back to mappings.
#[must_use]
pub fn fallback_script<'a>(
    hostname_maps: &'a [HostnameMap],
    network_maps: &'a [NetworkMap],
    identity: &ClientIdentity,
) -> Option<&'a Script> {
    if identity.has_explicit_host() {
        return None;
    }
    if let Some(script) = find_script_for_hostname(hostname_maps, &identity.resolved_host) {
        tracing::debug!(
            "hostname \"{}\" mapped to script \"{}\"",
            identity.resolved_host,
            script.name
        );
        return Some(script);
    }
    let ip = identity.effective_ip()?;
    let script = find_script_for_network(network_maps, ip)?;
    tracing::debug!("address {ip} mapped to script \"{}\"", script.name);
    Some(script)
}
