use std::fmt;

use chrono::{Local, NaiveDateTime};

pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `YYYYMMDD_HHMMSS` timestamp captured once per run.
///
/// The same value names the backup file and goes into the managed block
/// header, so a block can always be traced back to the backup taken before it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunStamp(String);

impl RunStamp {
    pub fn now() -> Self {
        Self(Local::now().format(STAMP_FORMAT).to_string())
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime.format(STAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
