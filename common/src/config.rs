use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKUP_DIR: &str = "./hosts_backup";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DNS_SERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
];

#[derive(Clone, Debug)]
pub struct Config {
    pub hosts_path: PathBuf,
    pub backup_dir: PathBuf,
    /// Queried in order; the first server with a non-empty answer wins.
    pub dns_servers: Vec<IpAddr>,
    /// Take the backup and print the proposed entries, but leave the hosts file alone.
    pub dry_run: bool,
    /// Ask the OS resolver when every configured server fails for a domain.
    pub system_fallback: bool,
    pub query_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts_path: default_hosts_path(),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            dns_servers: DEFAULT_DNS_SERVERS.to_vec(),
            dry_run: false,
            system_fallback: false,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

#[cfg(windows)]
pub fn default_hosts_path() -> PathBuf {
    let root: String = std::env::var("SystemRoot").unwrap_or_else(|_| String::from("C:\\Windows"));
    PathBuf::from(root)
        .join("System32")
        .join("drivers")
        .join("etc")
        .join("hosts")
}

#[cfg(not(windows))]
pub fn default_hosts_path() -> PathBuf {
    PathBuf::from("/etc/hosts")
}
