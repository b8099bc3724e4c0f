//! # Hosts Document
//!
//! In-memory model of a hosts file and the text transformations applied to it:
//! managed-block removal, legacy entry filtering, block assembly and rendering.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use steam_hosts_common::{domains::DomainList, stamp::RunStamp};

pub const HEADER_PREFIX: &str = "# === Steam hosts (auto-generated)";
pub const FOOTER: &str = "# === End Steam hosts ===";

const BOM: char = '\u{feff}';

#[cfg(windows)]
const PLATFORM_LINE_ENDING: LineEnding = LineEnding::CrLf;
#[cfg(not(windows))]
const PLATFORM_LINE_ENDING: LineEnding = LineEnding::Lf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One `<ip>\t<domain>` line of the managed block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub ip: Ipv4Addr,
    pub domain: String,
}

impl ResolvedEntry {
    pub fn new(ip: Ipv4Addr, domain: impl Into<String>) -> Self {
        Self {
            ip,
            domain: domain.into(),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{}\t{}", self.ip, self.domain)
    }
}

/// What [`HostsDocument::strip_managed`] took out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StripOutcome {
    /// Delimited blocks removed as a whole.
    pub blocks: usize,
    /// Host entries removed, inside blocks or as loose legacy lines.
    pub entries: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostsDocument {
    lines: Vec<String>,
    line_ending: LineEnding,
    bom: bool,
}

impl HostsDocument {
    /// Splits `text` on `\n` or `\r\n`. An empty string yields zero lines.
    pub fn parse(text: &str) -> Self {
        let (bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let line_ending: LineEnding = if body.contains("\r\n") {
            LineEnding::CrLf
        } else if body.contains('\n') {
            LineEnding::Lf
        } else {
            PLATFORM_LINE_ENDING
        };

        Self {
            lines: body.lines().map(str::to_string).collect(),
            line_ending,
            bom,
        }
    }

    /// Decodes raw file bytes, dropping any invalid UTF-8 sequences.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text: String = String::from_utf8_lossy(bytes).replace(char::REPLACEMENT_CHARACTER, "");
        Self::parse(&text)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Removes every delimited managed block, stale markers, and any other
    /// host entry naming a managed domain.
    pub fn strip_managed(&mut self, domains: &DomainList) -> StripOutcome {
        let mut outcome: StripOutcome = self.strip_blocks();
        outcome.entries += self.filter_entries(domains);
        outcome
    }

    fn strip_blocks(&mut self) -> StripOutcome {
        let mut outcome: StripOutcome = StripOutcome::default();
        let mut kept: Vec<String> = Vec::with_capacity(self.lines.len());
        let mut idx: usize = 0;

        while idx < self.lines.len() {
            let line: &str = &self.lines[idx];

            if is_header(line) {
                match find_footer(&self.lines, idx) {
                    Some(end) => {
                        outcome.blocks += 1;
                        outcome.entries += self.lines[idx + 1..end]
                            .iter()
                            .filter(|l| is_entry(l))
                            .count();
                        idx = end + 1;
                    }
                    None => idx += 1,
                }
                continue;
            }

            if !is_footer(line) {
                kept.push(self.lines[idx].clone());
            }
            idx += 1;
        }

        self.lines = kept;
        outcome
    }

    fn filter_entries(&mut self, domains: &DomainList) -> usize {
        let before: usize = self.lines.len();
        self.lines.retain(|line| !mentions_domain(line, domains));
        before - self.lines.len()
    }

    /// Appends a fresh managed block stamped with `stamp`.
    pub fn append_block(&mut self, stamp: &RunStamp, entries: &[ResolvedEntry]) {
        self.lines.push(header_line(stamp));
        self.lines.extend(entries.iter().map(ResolvedEntry::to_line));
        self.lines.push(FOOTER.to_string());
    }

    /// Joins the lines with the detected line ending, terminating the last one.
    pub fn render(&self) -> String {
        let eol: &str = self.line_ending.as_str();
        let mut out: String = String::new();
        if self.bom {
            out.push(BOM);
        }
        for line in &self.lines {
            out.push_str(line);
            out.push_str(eol);
        }
        out
    }

    /// Maps each hostname to the IP of the last entry that names it.
    pub fn pinned_addresses(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for line in &self.lines {
            let mut tokens = entry_tokens(line);
            let Some(ip) = tokens.next() else {
                continue;
            };
            for host in tokens {
                map.insert(host.to_ascii_lowercase(), ip.to_string());
            }
        }
        map
    }
}

pub fn header_line(stamp: &RunStamp) -> String {
    format!("{HEADER_PREFIX} {stamp} ===")
}

fn is_header(line: &str) -> bool {
    line.trim().starts_with(HEADER_PREFIX)
}

fn is_footer(line: &str) -> bool {
    line.trim() == FOOTER
}

/// Index of the footer closing the block opened at `start`, unless another
/// header shows up first.
fn find_footer(lines: &[String], start: usize) -> Option<usize> {
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if is_footer(line) {
            return Some(start + 1 + offset);
        }
        if is_header(line) {
            return None;
        }
    }
    None
}

fn is_entry(line: &str) -> bool {
    entry_tokens(line).next().is_some()
}

/// Whitespace-separated tokens of a host entry, inline comment excluded.
/// Blank and comment lines yield nothing.
fn entry_tokens(line: &str) -> std::str::SplitAsciiWhitespace<'_> {
    let trimmed: &str = line.trim();
    let data: &str = if trimmed.starts_with('#') {
        ""
    } else {
        trimmed.split('#').next().unwrap_or_default()
    };
    data.split_ascii_whitespace()
}

pub fn mentions_domain(line: &str, domains: &DomainList) -> bool {
    entry_tokens(line).any(|token| domains.contains(token))
}
