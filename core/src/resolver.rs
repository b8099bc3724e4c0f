use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use steam_hosts_protocols::dns::{self, DNS_PORT, MAX_UDP_PAYLOAD};
use tokio::net::{self, UdpSocket};
use tracing::{debug, info};

/// Name resolution collaborator used by the editor and the verifier.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Asks `server` for the A records of `domain`.
    async fn query(&self, domain: &str, server: IpAddr) -> anyhow::Result<Vec<Ipv4Addr>>;

    /// Asks the operating system resolver, honoring the hosts file.
    async fn system_lookup(&self, domain: &str) -> anyhow::Result<Vec<Ipv4Addr>>;
}

/// Plain DNS over UDP, one query per call.
pub struct UdpResolver {
    timeout: Duration,
}

impl UdpResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl DnsResolver for UdpResolver {
    async fn query(&self, domain: &str, server: IpAddr) -> anyhow::Result<Vec<Ipv4Addr>> {
        let bind_addr: SocketAddr = match server {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket: UdpSocket = UdpSocket::bind(bind_addr)
            .await
            .context("binding udp socket")?;
        socket
            .connect(SocketAddr::new(server, DNS_PORT))
            .await
            .with_context(|| format!("connecting to {server}"))?;

        let id: u16 = rand::random();
        let packet: Vec<u8> = dns::create_a_packet(domain, id)?;
        socket.send(&packet).await.context("sending dns query")?;

        let mut buffer: Vec<u8> = vec![0u8; MAX_UDP_PAYLOAD];
        let len: usize = tokio::time::timeout(self.timeout, socket.recv(&mut buffer))
            .await
            .with_context(|| format!("no answer from {server} within {:?}", self.timeout))?
            .context("receiving dns answer")?;

        dns::get_ipv4_answers(&buffer[..len], id)
    }

    async fn system_lookup(&self, domain: &str) -> anyhow::Result<Vec<Ipv4Addr>> {
        let addrs = tokio::time::timeout(self.timeout, net::lookup_host((domain, 0)))
            .await
            .with_context(|| format!("system lookup of {domain} timed out"))?
            .with_context(|| format!("system lookup of {domain}"))?;

        Ok(addrs
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .collect())
    }
}

/// Tries each server in order and returns the sorted, deduplicated answer of
/// the first one that yields at least one address. With `system_fallback`
/// set, the OS resolver gets the last word. `None` means nothing worked.
pub async fn resolve_domain(
    resolver: &dyn DnsResolver,
    domain: &str,
    servers: &[IpAddr],
    system_fallback: bool,
) -> Option<Vec<Ipv4Addr>> {
    for server in servers {
        match resolver.query(domain, *server).await {
            Ok(ips) if !ips.is_empty() => return Some(sorted_unique(ips)),
            Ok(_) => debug!("{server} returned no A records for {domain}"),
            Err(e) => debug!("{server} failed for {domain}: {e:#}"),
        }
    }

    if !system_fallback {
        return None;
    }

    match resolver.system_lookup(domain).await {
        Ok(ips) if !ips.is_empty() => {
            info!("resolved {domain} through the system resolver");
            Some(sorted_unique(ips))
        }
        Ok(_) => None,
        Err(e) => {
            debug!("system resolver failed for {domain}: {e:#}");
            None
        }
    }
}

fn sorted_unique(ips: Vec<Ipv4Addr>) -> Vec<Ipv4Addr> {
    ips.into_iter()
        .collect::<BTreeSet<Ipv4Addr>>()
        .into_iter()
        .collect()
}
