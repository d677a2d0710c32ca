use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::session::ADVANCE_DELAY;

/// How operations treat a bank or question id that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// Listing an unknown bank gives nothing, deleting is a no-op and
    /// updating an unknown question appends it.
    #[default]
    Tolerant,
    /// Unknown ids are reported as `NotFound`.
    Strict,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub id_policy: IdPolicy,
    pub advance_delay: Duration,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>, strict_ids: bool) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            id_policy: if strict_ids {
                IdPolicy::Strict
            } else {
                IdPolicy::Tolerant
            },
            advance_delay: ADVANCE_DELAY,
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "qbank")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".qbank"))
}
