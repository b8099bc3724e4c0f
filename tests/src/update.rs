use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use async_trait::async_trait;

use steam_hosts_common::{domains::DomainList, error::HostsError};
use steam_hosts_core::editor::{HostsEditor, UpdateReport};
use steam_hosts_core::hosts::ResolvedEntry;
use steam_hosts_core::resolver::DnsResolver;

use crate::support::{ScriptedResolver, Sandbox, block_entries, server, stamp};

const QUAD9: IpAddr = IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9));

fn editor(resolver: ScriptedResolver, domains: &[&str]) -> HostsEditor {
    HostsEditor::new(Box::new(resolver), DomainList::new(domains.iter().copied()))
}

#[tokio::test]
async fn legacy_entry_is_replaced_by_managed_block() {
    let sandbox = Sandbox::new("127.0.0.1 localhost\n1.2.3.4 steamcommunity.com\n");
    let resolver = ScriptedResolver::default().answer(
        "steamcommunity.com",
        QUAD9,
        &[Ipv4Addr::new(5, 6, 7, 8)],
    );
    let editor = editor(resolver, &["steamcommunity.com"]);

    let report: UpdateReport = editor
        .update_at(&sandbox.config(&[QUAD9], false), stamp(0))
        .await
        .unwrap();

    assert!(report.written);
    assert_eq!(report.removed_entries, 1);
    assert_eq!(
        sandbox.read_hosts(),
        "127.0.0.1 localhost\n\
         # === Steam hosts (auto-generated) 20250203_040500 ===\n\
         5.6.7.8\tsteamcommunity.com\n\
         # === End Steam hosts ===\n"
    );
}

#[tokio::test]
async fn second_run_reproduces_the_same_block() {
    let sandbox = Sandbox::new("# static table\r\n10.0.0.1 nas\r\n");
    let resolver = ScriptedResolver::default()
        .answer("steamcommunity.com", QUAD9, &[Ipv4Addr::new(5, 6, 7, 9), Ipv4Addr::new(5, 6, 7, 8)])
        .answer("api.steampowered.com", QUAD9, &[Ipv4Addr::new(23, 1, 1, 1)]);
    let editor = editor(resolver, &["steamcommunity.com", "api.steampowered.com"]);
    let cfg = sandbox.config(&[QUAD9], false);

    editor.update_at(&cfg, stamp(1)).await.unwrap();
    let first: String = sandbox.read_hosts();
    let report: UpdateReport = editor.update_at(&cfg, stamp(2)).await.unwrap();
    let second: String = sandbox.read_hosts();

    assert_eq!(report.removed_blocks, 1);
    assert_eq!(report.removed_entries, 3);
    assert_eq!(block_entries(&first), block_entries(&second));
    assert_eq!(
        block_entries(&second),
        vec![
            "5.6.7.8\tsteamcommunity.com",
            "5.6.7.9\tsteamcommunity.com",
            "23.1.1.1\tapi.steampowered.com",
        ]
    );
    assert_eq!(second.matches("# === Steam hosts (auto-generated)").count(), 1);
    assert_eq!(second.matches("# === End Steam hosts ===").count(), 1);
    assert_eq!(first.replace("20250203_040501", "20250203_040502"), second);
    assert!(second.starts_with("# static table\r\n10.0.0.1 nas\r\n"));
    assert_eq!(sandbox.backup_count(), 2);
}

#[tokio::test]
async fn managed_domains_appear_only_inside_the_block() {
    let sandbox = Sandbox::new(
        "1.1.1.1 steamcommunity.com\n\
         # === Steam hosts (auto-generated) 20200101_000000 ===\n\
         2.2.2.2\tsteamcommunity.com\n\
         # === End Steam hosts ===\n\
         3.3.3.3 www.example.org steamcommunity.com\n\
         # === End Steam hosts ===\n\
         203.0.113.5 notsteamcommunity.com\n",
    );
    let resolver = ScriptedResolver::default().answer(
        "steamcommunity.com",
        QUAD9,
        &[Ipv4Addr::new(5, 6, 7, 8)],
    );
    let editor = editor(resolver, &["steamcommunity.com"]);

    editor
        .update_at(&sandbox.config(&[QUAD9], false), stamp(3))
        .await
        .unwrap();
    let content: String = sandbox.read_hosts();

    assert_eq!(
        content,
        "203.0.113.5 notsteamcommunity.com\n\
         # === Steam hosts (auto-generated) 20250203_040503 ===\n\
         5.6.7.8\tsteamcommunity.com\n\
         # === End Steam hosts ===\n"
    );
}

#[tokio::test]
async fn dry_run_backs_up_but_leaves_hosts_alone() {
    let original: &str = "127.0.0.1 localhost\r\n1.2.3.4 steamcommunity.com\r\n";
    let sandbox = Sandbox::new(original);
    let resolver = ScriptedResolver::default().answer(
        "steamcommunity.com",
        QUAD9,
        &[Ipv4Addr::new(5, 6, 7, 8)],
    );
    let editor = editor(resolver, &["steamcommunity.com"]);

    let report: UpdateReport = editor
        .update_at(&sandbox.config(&[QUAD9], true), stamp(4))
        .await
        .unwrap();

    assert!(!report.written);
    assert_eq!(
        report.entries,
        vec![ResolvedEntry::new(Ipv4Addr::new(5, 6, 7, 8), "steamcommunity.com")]
    );
    assert_eq!(sandbox.read_hosts(), original);
    assert_eq!(
        report.backup_path,
        sandbox.backups.join("hosts_20250203_040504.bak")
    );
    assert_eq!(fs::read(&report.backup_path).unwrap(), original.as_bytes());
}

#[tokio::test]
async fn backup_holds_pre_run_bytes() {
    let original: &[u8] = b"\xef\xbb\xbf# bom\n1.2.3.4 api.steampowered.com\n";
    let sandbox = Sandbox::new("");
    fs::write(&sandbox.hosts, original).unwrap();
    let editor = editor(ScriptedResolver::default(), &["api.steampowered.com"]);

    let report: UpdateReport = editor
        .update_at(&sandbox.config(&[QUAD9], false), stamp(5))
        .await
        .unwrap();

    assert_eq!(fs::read(&report.backup_path).unwrap(), original);
    assert_ne!(fs::read(&sandbox.hosts).unwrap(), original);
    assert!(sandbox.read_hosts().starts_with("\u{feff}# bom\n"));
}

#[tokio::test]
async fn unresolvable_domains_are_skipped_not_fatal() {
    let domains: [&str; 8] = [
        "a.steam.test",
        "b.steam.test",
        "c.steam.test",
        "d.steam.test",
        "e.steam.test",
        "f.steam.test",
        "g.steam.test",
        "h.steam.test",
    ];
    let backup = server(8, 8, 8, 8);
    let mut resolver = ScriptedResolver::default();
    for (idx, domain) in domains.iter().enumerate() {
        if idx == 2 || idx == 5 {
            continue;
        }
        resolver = resolver.answer(domain, backup, &[Ipv4Addr::new(10, 0, 0, idx as u8)]);
    }
    let queries = resolver.queries.clone();
    let sandbox = Sandbox::new("127.0.0.1 localhost\n");
    let editor = editor(resolver, &domains);

    let report: UpdateReport = editor
        .update_at(&sandbox.config(&[QUAD9, backup], false), stamp(6))
        .await
        .unwrap();

    assert_eq!(report.unresolved, vec!["c.steam.test", "f.steam.test"]);
    let entries: Vec<String> = block_entries(&sandbox.read_hosts());
    assert_eq!(entries.len(), 6);
    assert!(entries.iter().all(|e| !e.ends_with("c.steam.test") && !e.ends_with("f.steam.test")));
    assert_eq!(queries.lock().unwrap().len(), 16);
}

#[tokio::test]
async fn missing_hosts_file_aborts_before_backup() {
    let sandbox = Sandbox::new("");
    fs::remove_file(&sandbox.hosts).unwrap();
    let editor = editor(ScriptedResolver::default(), &["steamcommunity.com"]);

    let err = editor
        .update_at(&sandbox.config(&[QUAD9], false), stamp(7))
        .await
        .unwrap_err();

    assert!(matches!(err, HostsError::NotFound { .. }));
    assert!(!sandbox.backups.exists());
}

#[tokio::test]
async fn system_fallback_fills_in_when_enabled() {
    let sandbox = Sandbox::new("");
    let resolver =
        ScriptedResolver::default().system("steamcommunity.com", &[Ipv4Addr::new(7, 7, 7, 7)]);
    let editor = editor(resolver, &["steamcommunity.com"]);
    let mut cfg = sandbox.config(&[QUAD9], false);
    cfg.system_fallback = true;

    let report: UpdateReport = editor.update_at(&cfg, stamp(8)).await.unwrap();

    assert!(report.unresolved.is_empty());
    assert_eq!(block_entries(&sandbox.read_hosts()), vec!["7.7.7.7\tsteamcommunity.com"]);
}

/// Replaces the hosts file with a directory while resolution is in flight,
/// so the final write cannot succeed.
struct HostsTurnsIntoDir {
    hosts: PathBuf,
}

#[async_trait]
impl DnsResolver for HostsTurnsIntoDir {
    async fn query(&self, _domain: &str, _server: IpAddr) -> anyhow::Result<Vec<Ipv4Addr>> {
        if self.hosts.is_file() {
            fs::remove_file(&self.hosts)?;
            fs::create_dir(&self.hosts)?;
        }
        Ok(vec![Ipv4Addr::new(5, 6, 7, 8)])
    }

    async fn system_lookup(&self, _domain: &str) -> anyhow::Result<Vec<Ipv4Addr>> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn failed_write_is_fatal_and_backup_is_kept() {
    let original: &str = "127.0.0.1 localhost\n1.2.3.4 steamcommunity.com\n";
    let sandbox = Sandbox::new(original);
    let resolver = HostsTurnsIntoDir {
        hosts: sandbox.hosts.clone(),
    };
    let editor = HostsEditor::new(Box::new(resolver), DomainList::new(["steamcommunity.com"]));

    let err = editor
        .update_at(&sandbox.config(&[QUAD9], false), stamp(9))
        .await
        .unwrap_err();

    assert!(matches!(err, HostsError::Write { .. }), "unexpected error: {err}");
    assert_eq!(sandbox.backup_count(), 1);
    let backup: PathBuf = sandbox.backups.join("hosts_20250203_040509.bak");
    assert_eq!(fs::read_to_string(backup).unwrap(), original);
}

#[tokio::test]
async fn hosts_path_that_is_a_directory_reports_an_io_error() {
    let sandbox = Sandbox::new("");
    fs::remove_file(&sandbox.hosts).unwrap();
    fs::create_dir(&sandbox.hosts).unwrap();
    let editor = editor(ScriptedResolver::default(), &["steamcommunity.com"]);

    let err = editor
        .update_at(&sandbox.config(&[QUAD9], false), stamp(10))
        .await
        .unwrap_err();

    assert!(matches!(err, HostsError::Read { .. }), "unexpected error: {err}");
    assert!(!sandbox.backups.exists());
}
