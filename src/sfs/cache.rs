//! Best-effort cache of resource ids for shell completion.
//!
//! Each credential pair (endpoint + token) gets its own directory, named by a
//! UUIDv5 of the pair so the token itself never lands on disk. Inside it, one
//! `<kind>-uuid-cache` file per resource type lists ids seen by earlier
//! commands, one per line.
//!
//! The cache is never authoritative. Every I/O failure is logged at debug
//! level and swallowed, and nothing but the completion helper reads it back.

use directories::ProjectDirs;
use log::debug;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const CACHE_DIR_ENV: &str = "SFS_CACHE_DIR";

#[derive(Debug, Clone)]
pub struct CompletionCache {
    dir: PathBuf,
}

impl CompletionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory for one credential pair below `base`.
    pub fn for_session(base: &Path, endpoint: &str, token: Option<&str>) -> Self {
        let key = format!("{}#{}", endpoint, token.unwrap_or_default());
        let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes());
        Self::new(base.join(id.to_string()))
    }

    /// `$SFS_CACHE_DIR`, else the platform cache directory.
    pub fn default_base() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            return Some(PathBuf::from(dir));
        }
        ProjectDirs::from("org", "sfs", "sfs").map(|dirs| dirs.cache_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{}-uuid-cache", kind))
    }

    /// Appends ids not already cached for `kind`.
    pub fn record<'a, I>(&self, kind: &str, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Err(e) = self.try_record(kind, ids) {
            debug!("Ignoring completion cache failure for {}: {}", kind, e);
        }
    }

    fn try_record<'a, I>(&self, kind: &str, ids: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: HashSet<String> = self.ids(kind).into_iter().collect();
        let fresh: Vec<&str> = ids
            .into_iter()
            .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
            .collect();
        if fresh.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(kind))?;
        for id in fresh {
            writeln!(file, "{}", id)?;
        }
        Ok(())
    }

    /// Cached ids for `kind`; empty when the file is missing or unreadable.
    pub fn ids(&self, kind: &str) -> Vec<String> {
        match fs::read_to_string(self.path(kind)) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!("Ignoring unreadable completion cache for {}: {}", kind, e);
                }
                Vec::new()
            }
        }
    }
}
