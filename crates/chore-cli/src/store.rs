//! Locked access to the on-disk registry.
//!
//! Every command goes through a [`Store`]. Commands that mutate hold an
//! exclusive advisory lock on `<database>.lock` from load to save, so two
//! concurrent invocations never interleave their read-modify-write cycles.
//! Read-only commands take a shared lock.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chore_core::Registry;
use chore_db::{Database, StoreCounts};
use fs2::FileExt;

use crate::Config;

/// How a command intends to use the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// An open database guarded by the lock file.
///
/// The lock is released when the store is dropped.
pub struct Store {
    db: Database,
    path: PathBuf,
    _lock: File,
}

impl Store {
    /// Acquires the lock and opens the database, creating parent directories.
    pub fn open(config: &Config, access: Access) -> Result<Self> {
        let path = config.database_path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("failed to create database directory")?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path(&path))
            .context("failed to create lock file")?;
        match access {
            Access::Read => lock_file.lock_shared(),
            Access::Write => lock_file.lock_exclusive(),
        }
        .context("failed to acquire lock")?;
        tracing::debug!(?access, path = %path.display(), "store locked");

        let db = Database::open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self {
            db,
            path,
            _lock: lock_file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every tracked item.
    pub fn load(&self) -> Result<Registry> {
        self.db.load_registry().context("failed to load tracked items")
    }

    /// Persists the registry. Called once after a batch of mutations.
    pub fn save(&mut self, registry: &Registry) -> Result<()> {
        self.db
            .save_registry(registry)
            .context("failed to save tracked items")
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        Ok(self.db.counts()?)
    }
}

fn lock_path(database_path: &Path) -> PathBuf {
    let mut name = OsString::from(database_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
