//! Checks that the operating system actually answers with the pinned addresses.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::Path;

use steam_hosts_common::{domains::DomainList, error::HostsError};
use tracing::debug;

use crate::editor;
use crate::resolver::DnsResolver;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    /// The system resolver returns the pinned address.
    Pinned { ip: String },
    /// No hosts entry names the domain.
    Missing,
    /// The pinned address is not among the system resolver's answers.
    Mismatch { pinned: String, resolved: Vec<Ipv4Addr> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainCheck {
    pub domain: String,
    pub status: CheckStatus,
}

#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub checks: Vec<DomainCheck>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.checks
            .iter()
            .all(|check| matches!(check.status, CheckStatus::Pinned { .. }))
    }
}

pub async fn verify(
    resolver: &dyn DnsResolver,
    hosts_path: &Path,
    domains: &DomainList,
) -> Result<VerifyReport, HostsError> {
    editor::ensure_exists(hosts_path)?;
    let pinned: BTreeMap<String, String> = editor::load(hosts_path)?.pinned_addresses();

    let mut report: VerifyReport = VerifyReport::default();
    for domain in domains {
        let status: CheckStatus = match pinned.get(domain) {
            None => CheckStatus::Missing,
            Some(ip) => {
                let resolved: Vec<Ipv4Addr> = resolver.system_lookup(domain).await.unwrap_or_else(|e| {
                    debug!("system lookup of {domain} failed: {e:#}");
                    Vec::new()
                });
                if resolved.iter().any(|r| r.to_string() == *ip) {
                    CheckStatus::Pinned { ip: ip.clone() }
                } else {
                    CheckStatus::Mismatch {
                        pinned: ip.clone(),
                        resolved,
                    }
                }
            }
        };
        report.checks.push(DomainCheck {
            domain: domain.clone(),
            status,
        });
    }

    Ok(report)
}
