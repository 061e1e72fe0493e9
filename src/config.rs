use crate::dns::{DynReverseLookup, PtrClient};
use crate::error::Error;
use crate::mappings::{HostnameMap, NetworkMap};
use crate::templates::{DirTemplateStore, DynTemplateRenderer};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub type Shared = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    /// The URL clients reach bootcrab at, exposed to templates as `baseURL`.
    pub base_url: String,
    /// The DNS server queried for `PTR` records of clients.
    pub dns_server: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub dns_timeout: Duration,
    /// Whether the first `X-Forwarded-For` entry replaces the transport source address. The
    /// header is not authenticated, disable this unless bootcrab is only reachable through a
    /// proxy that sets it.
    #[serde(default = "default_trust_forwarded_for")]
    pub trust_forwarded_for: bool,
    /// Variable names withheld from the `/params` listing.
    #[serde(default)]
    pub params_blacklist: HashSet<String>,
    pub templates_dir: PathBuf,
    #[serde(default)]
    pub hostname_maps: Vec<HostnameMap>,
    #[serde(default)]
    pub network_maps: Vec<NetworkMap>,
}

fn default_trust_forwarded_for() -> bool {
    true
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }

    /// The `baseURL` for requests made in `environment`, e.g. `http://boot:8081/env/prod`.
    #[must_use]
    pub fn base_url_for_env(&self, environment: Option<&str>) -> String {
        match environment.filter(|e| !e.is_empty()) {
            Some(environment) => format!(
                "{}/env/{environment}",
                self.base_url.trim_end_matches('/')
            ),
            None => self.base_url.clone(),
        }
    }

    pub fn template_store(&self) -> Result<DynTemplateRenderer, Error> {
        Ok(Arc::new(DirTemplateStore::try_from_dir(&self.templates_dir)?))
    }

    #[must_use]
    pub fn reverse_lookup(&self) -> DynReverseLookup {
        Arc::new(PtrClient::new(self.dns_server, self.dns_timeout))
    }
}
