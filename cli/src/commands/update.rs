use std::process::ExitCode;

use colored::*;
use steam_hosts_common::{config::Config, domains::DomainList};
use steam_hosts_core::editor::{HostsEditor, UpdateReport};
use steam_hosts_core::hosts::ResolvedEntry;
use steam_hosts_core::resolver::UdpResolver;

use crate::terminal::{colors, print};

const KEY_WIDTH: usize = 10;

pub async fn update(cfg: &Config) -> anyhow::Result<ExitCode> {
    let resolver: UdpResolver = UdpResolver::new(cfg.query_timeout);
    let editor: HostsEditor = HostsEditor::new(Box::new(resolver), DomainList::steam());

    let report: UpdateReport = editor.update(cfg).await?;

    if cfg.dry_run {
        print::header("proposed entries");
        print::raw_lines(report.entries.iter().map(ResolvedEntry::to_line));
    }

    print_summary(&report, editor.domains().len());
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &UpdateReport, total_domains: usize) {
    let resolved_domains: usize = total_domains - report.unresolved.len();

    print::fat_separator();
    print::aligned_line("Timestamp", report.stamp.as_str().normal(), KEY_WIDTH);
    print::aligned_line(
        "Backup",
        report.backup_path.display().to_string().normal(),
        KEY_WIDTH,
    );
    print::aligned_line(
        "Removed",
        format!(
            "{} entries, {} managed blocks",
            report.removed_entries, report.removed_blocks
        )
        .normal(),
        KEY_WIDTH,
    );
    print::aligned_line(
        "Resolved",
        format!(
            "{resolved_domains}/{total_domains} domains, {} entries",
            report.entries.len()
        )
        .color(colors::IPV4_ADDR),
        KEY_WIDTH,
    );

    if !report.unresolved.is_empty() {
        print::aligned_line(
            "Unresolved",
            report.unresolved.join(", ").color(colors::WARNING),
            KEY_WIDTH,
        );
    }

    let outcome: ColoredString = if report.written {
        "rewritten".color(colors::PRIMARY).bold()
    } else {
        "unchanged (dry run)".color(colors::WARNING)
    };
    print::aligned_line("Hosts", outcome, KEY_WIDTH);
}
