//! A [`ReverseLookup`][super::ReverseLookup] that queries a single DNS server over UDP.
use crate::dns::ReverseLookup;
use crate::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use trust_dns_client::client::{AsyncClient, ClientHandle};
use trust_dns_client::rr::{DNSClass, Name, RData, RecordType};
use trust_dns_client::udp::UdpClientStream;

/// Sends recursive `PTR` queries to [`PtrClient::server`], giving up after
/// [`PtrClient::timeout`].
#[derive(Debug, Clone)]
pub struct PtrClient {
    pub server: SocketAddr,
    pub timeout: Duration,
}

impl PtrClient {
    #[must_use]
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self { server, timeout }
    }
}

#[async_trait::async_trait]
impl ReverseLookup for PtrClient {
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<String, Error> {
        // The reverse name for an address, e.g. 42.0.0.10.in-addr.arpa.
        let reverse_name = Name::from(ip);
        tracing::debug!("querying {} for PTR {reverse_name}", self.server);

        let stream = UdpClientStream::<UdpSocket>::with_timeout(self.server, self.timeout);
        let (mut client, background) = AsyncClient::connect(stream).await?;
        tokio::spawn(background);

        let response = client
            .query(reverse_name, DNSClass::IN, RecordType::PTR)
            .await?;
        response
            .answers()
            .iter()
            .find_map(|record| match record.data() {
                Some(RData::PTR(name)) => Some(name.to_string()),
                _ => None,
            })
            .ok_or(Error::NoPtrRecord(ip))
    }
}
