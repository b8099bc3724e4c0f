//! # Hosts Update Service
//!
//! Implements the update use case: back up the hosts file, strip what a
//! previous run (or a human) left for the managed domains, resolve them
//! again and write a single fresh managed block.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use steam_hosts_common::{config::Config, domains::DomainList, error::HostsError, stamp::RunStamp};
use tracing::{info, warn};

use crate::backup;
use crate::hosts::{HostsDocument, ResolvedEntry, StripOutcome};
use crate::resolver::{self, DnsResolver};

/// Outcome of one update run.
#[derive(Clone, Debug)]
pub struct UpdateReport {
    pub stamp: RunStamp,
    pub backup_path: PathBuf,
    pub removed_entries: usize,
    pub removed_blocks: usize,
    /// Entries of the new managed block, in domain order.
    pub entries: Vec<ResolvedEntry>,
    /// Domains no server could resolve; absent from the new block.
    pub unresolved: Vec<String>,
    /// False for dry runs.
    pub written: bool,
}

pub struct HostsEditor {
    resolver: Box<dyn DnsResolver>,
    domains: DomainList,
}

impl HostsEditor {
    pub fn new(resolver: Box<dyn DnsResolver>, domains: DomainList) -> Self {
        Self { resolver, domains }
    }

    pub fn domains(&self) -> &DomainList {
        &self.domains
    }

    pub async fn update(&self, cfg: &Config) -> Result<UpdateReport, HostsError> {
        self.update_at(cfg, RunStamp::now()).await
    }

    /// Runs the update with an explicit timestamp for the backup name and the block header.
    ///
    /// 1. **Check**: a missing hosts file aborts before anything is touched.
    /// 2. **Backup**: taken unconditionally, dry runs included.
    /// 3. **Strip**: previous managed blocks, stale markers and legacy entries go.
    /// 4. **Resolve**: domains are resolved in order; failures are only warned about.
    /// 5. **Write**: skipped for dry runs.
    pub async fn update_at(&self, cfg: &Config, stamp: RunStamp) -> Result<UpdateReport, HostsError> {
        let hosts_path: &Path = &cfg.hosts_path;
        ensure_exists(hosts_path)?;

        let backup_path: PathBuf = backup::create_backup(hosts_path, &cfg.backup_dir, &stamp)?;
        info!("backup created: {}", backup_path.display());

        let mut document: HostsDocument = load(hosts_path)?;
        let stripped: StripOutcome = document.strip_managed(&self.domains);
        info!("removed {} existing Steam host entries", stripped.entries);

        let (entries, unresolved) = self.resolve_all(cfg).await;
        document.append_block(&stamp, &entries);

        let mut report: UpdateReport = UpdateReport {
            stamp,
            backup_path,
            removed_entries: stripped.entries,
            removed_blocks: stripped.blocks,
            entries,
            unresolved,
            written: false,
        };

        if cfg.dry_run {
            info!("dry-run enabled, {} left untouched", hosts_path.display());
            return Ok(report);
        }

        fs::write(hosts_path, document.render()).map_err(|source| HostsError::Write {
            path: hosts_path.to_path_buf(),
            source,
        })?;
        info!("hosts updated: {}", hosts_path.display());

        report.written = true;
        Ok(report)
    }

    async fn resolve_all(&self, cfg: &Config) -> (Vec<ResolvedEntry>, Vec<String>) {
        let mut entries: Vec<ResolvedEntry> = Vec::new();
        let mut unresolved: Vec<String> = Vec::new();

        for domain in &self.domains {
            let resolved = resolver::resolve_domain(
                self.resolver.as_ref(),
                domain,
                &cfg.dns_servers,
                cfg.system_fallback,
            )
            .await;

            match resolved {
                Some(ips) => entries.extend(ips.into_iter().map(|ip| ResolvedEntry::new(ip, domain))),
                None => {
                    warn!("failed to resolve {domain} via DNS {}", join_servers(cfg));
                    unresolved.push(domain.clone());
                }
            }
        }

        (entries, unresolved)
    }
}

pub(crate) fn ensure_exists(path: &Path) -> Result<(), HostsError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(HostsError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(HostsError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(HostsError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn load(path: &Path) -> Result<HostsDocument, HostsError> {
    let bytes: Vec<u8> = fs::read(path).map_err(|source| HostsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(HostsDocument::from_bytes(&bytes))
}

fn join_servers(cfg: &Config) -> String {
    cfg.dns_servers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}
