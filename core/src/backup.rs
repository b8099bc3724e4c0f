use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use steam_hosts_common::{error::HostsError, stamp::RunStamp};
use tracing::debug;

/// Copies `hosts_path` byte-for-byte to `<backup_dir>/hosts_<stamp>.bak`,
/// creating `backup_dir` if needed. An existing backup is never overwritten;
/// a `-<n>` suffix is added instead.
pub fn create_backup(
    hosts_path: &Path,
    backup_dir: &Path,
    stamp: &RunStamp,
) -> Result<PathBuf, HostsError> {
    fs::create_dir_all(backup_dir).map_err(|source| HostsError::BackupDir {
        path: backup_dir.to_path_buf(),
        source,
    })?;

    let mut source: File = File::open(hosts_path).map_err(|source| HostsError::Read {
        path: hosts_path.to_path_buf(),
        source,
    })?;
    let (backup_path, mut target) = open_fresh(backup_dir, stamp)?;

    io::copy(&mut source, &mut target)
        .and_then(|_| target.sync_all())
        .map_err(|source| HostsError::Backup {
            path: backup_path.clone(),
            source,
        })?;

    debug!("copied {} to {}", hosts_path.display(), backup_path.display());
    Ok(backup_path)
}

fn open_fresh(backup_dir: &Path, stamp: &RunStamp) -> Result<(PathBuf, File), HostsError> {
    let mut attempt: usize = 0;
    loop {
        let name: String = match attempt {
            0 => format!("hosts_{stamp}.bak"),
            n => format!("hosts_{stamp}-{n}.bak"),
        };
        let path: PathBuf = backup_dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(HostsError::Backup { path, source }),
        }
    }
}
