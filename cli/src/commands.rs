pub mod update;
pub mod verify;

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use steam_hosts_common::config::{self, Config};

#[derive(Parser)]
#[command(name = "steam-hosts")]
#[command(about = "Pin Steam endpoints in the hosts file using alternate DNS servers.")]
#[command(version)]
pub struct CommandLine {
    /// Show debug output, including per-server resolution failures
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the Steam domains and rewrite the managed hosts block
    #[command(alias = "u")]
    Update(UpdateArgs),
    /// Check that the system resolver honors the pinned entries
    #[command(alias = "v")]
    Verify(HostsArg),
}

#[derive(Args)]
pub struct HostsArg {
    /// Hosts file to read and rewrite
    #[arg(long = "hosts", value_name = "PATH", default_value_os_t = config::default_hosts_path())]
    pub hosts_path: PathBuf,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub hosts: HostsArg,

    /// Directory receiving hosts_<TIMESTAMP>.bak copies
    #[arg(long, value_name = "DIR", default_value = config::DEFAULT_BACKUP_DIR)]
    pub backup_dir: PathBuf,

    /// Comma-separated DNS servers, tried in order
    #[arg(long = "dns", value_name = "SERVERS", value_delimiter = ',', default_values_t = config::DEFAULT_DNS_SERVERS.to_vec())]
    pub dns_servers: Vec<IpAddr>,

    /// Print the proposed entries without rewriting the hosts file
    #[arg(long)]
    pub dry_run: bool,

    /// Fall back to the system resolver when every DNS server fails
    #[arg(long)]
    pub system_fallback: bool,

    /// Seconds to wait for each DNS answer
    #[arg(
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = config::DEFAULT_QUERY_TIMEOUT.as_secs()
    )]
    pub timeout: u64,
}

impl UpdateArgs {
    pub fn to_config(&self) -> Config {
        Config {
            hosts_path: self.hosts.hosts_path.clone(),
            backup_dir: self.backup_dir.clone(),
            dns_servers: self.dns_servers.clone(),
            dry_run: self.dry_run,
            system_fallback: self.system_fallback,
            query_timeout: Duration::from_secs(self.timeout),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
