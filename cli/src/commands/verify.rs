use std::net::Ipv4Addr;
use std::path::Path;
use std::process::ExitCode;

use colored::*;
use steam_hosts_common::{config::DEFAULT_QUERY_TIMEOUT, domains::DomainList};
use steam_hosts_core::resolver::UdpResolver;
use steam_hosts_core::verify::{self as checker, CheckStatus, VerifyReport};

use crate::terminal::{colors, print};

/// Exit status when at least one domain is not pinned.
const EXIT_MISMATCH: u8 = 2;

pub async fn verify(hosts_path: &Path) -> anyhow::Result<ExitCode> {
    let resolver: UdpResolver = UdpResolver::new(DEFAULT_QUERY_TIMEOUT);
    let domains: DomainList = DomainList::steam();

    let report: VerifyReport = checker::verify(&resolver, hosts_path, &domains).await?;

    let width: usize = domains.iter().map(String::len).max().unwrap_or_default();
    for check in &report.checks {
        let value: ColoredString = match &check.status {
            CheckStatus::Pinned { ip } => format!("ok -> {ip}").color(colors::PRIMARY),
            CheckStatus::Missing => "missing from hosts".color(colors::WARNING),
            CheckStatus::Mismatch { pinned, resolved } => {
                format!("hosts={pinned} resolved={}", describe(resolved)).color(colors::WARNING)
            }
        };
        print::aligned_line(&check.domain, value, width);
    }

    if report.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_MISMATCH))
    }
}

fn describe(resolved: &[Ipv4Addr]) -> String {
    if resolved.is_empty() {
        return String::from("none");
    }
    resolved
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}
