use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum HostsError {
    #[error("hosts file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot create backup directory {}", path.display())]
    BackupDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write backup {}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read hosts file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write hosts file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
