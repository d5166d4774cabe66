use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::debug;

use crate::catalog::{CatalogIndex, Entry, EntryRecord, Snapshot};
use crate::error::{CatalogError, ConfigError, JnlError, PersistError};
use crate::repo_path::RepoPathBuf;
use crate::resolver;
use crate::tag::Tag;
use crate::guid;

pub const META_DIRNAME: &str = ".jnl";
pub const SNAPSHOT_FILENAME: &str = "entries.json";
pub const WORKLOGS_DIRNAME: &str = "worklogs";

/// The journal façade: a tag-indexed catalog confined to one root directory.
///
/// Every path argument is resolved and containment-checked before the index
/// is touched, so nothing outside the root can ever be cataloged. A
/// `Journal` is single-threaded and synchronous; callers that need
/// concurrent access must serialize calls to one instance themselves.
#[derive(Debug)]
pub struct Journal {
    root: PathBuf,
    index: CatalogIndex,
}

impl Journal {
    /// Opens an empty journal over `root`, which must be an existing
    /// directory. The root is canonicalized once and is immutable for the
    /// journal's lifetime.
    pub fn open(root: &Path) -> Result<Journal, JnlError> {
        if !root.exists() {
            return Err(ConfigError::RootNotFound(root.to_path_buf()).into());
        }
        if !root.is_dir() {
            return Err(ConfigError::RootNotDirectory(root.to_path_buf()).into());
        }
        let root = std::fs::canonicalize(root)
            .map_err(|_| ConfigError::RootNotFound(root.to_path_buf()))?;
        Ok(Journal {
            root,
            index: CatalogIndex::new(),
        })
    }

    /// Opens the journal at `root`, loading the snapshot from
    /// `.jnl/entries.json` if one exists.
    pub fn open_or_load(root: &Path) -> Result<Journal, JnlError> {
        let journal = Journal::open(root)?;
        let snapshot_path = journal.snapshot_path();
        if !snapshot_path.exists() {
            return Ok(journal);
        }
        let data = std::fs::read_to_string(&snapshot_path)?;
        let snapshot = Snapshot::from_json(&data)?;
        Journal::load(&journal.root, &snapshot)
    }

    /// Rebuilds a journal from a snapshot. Every record is re-validated
    /// against the root; duplicate paths, empty tag names and paths that
    /// escape the root are rejected as corrupt.
    pub fn load(root: &Path, snapshot: &Snapshot) -> Result<Journal, JnlError> {
        let mut journal = Journal::open(root)?;
        for (i, record) in snapshot.entries.iter().enumerate() {
            let corrupt = |reason: &str| PersistError::Corrupt {
                record: i,
                path: record.path.clone(),
                reason: reason.to_string(),
            };

            let repo_path = resolver::resolve(&journal.root, &[record.path.as_str()])
                .map_err(|e| corrupt(&e.to_string()))?;
            journal
                .index
                .register(&repo_path)
                .map_err(|_| corrupt("duplicate path"))?;
            for tag in &record.tags {
                if tag.name.is_empty() {
                    return Err(corrupt("empty tag name").into());
                }
                // NotFound is impossible here; the entry was just registered
                journal.index.tag(&repo_path, &tag.name, &tag.value)?;
            }
        }
        debug!("loaded {} entries from snapshot", journal.len());
        Ok(journal)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIRNAME)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.meta_dir().join(SNAPSHOT_FILENAME)
    }

    /// Resolves path segments against the root without touching the index.
    pub fn resolve<S: AsRef<str>>(&self, parts: &[S]) -> Result<RepoPathBuf, JnlError> {
        Ok(resolver::resolve(&self.root, parts)?)
    }

    /// The absolute on-disk location of a (not necessarily registered) path.
    pub fn full_path(&self, path: &str) -> Result<PathBuf, JnlError> {
        Ok(self.resolve(&[path])?.to_full_path(&self.root))
    }

    pub fn register(&mut self, path: &str) -> Result<&Entry, JnlError> {
        let repo_path = self.resolve(&[path])?;
        Ok(self.index.register(&repo_path)?)
    }

    pub fn get(&self, path: &str) -> Result<&Entry, JnlError> {
        let repo_path = self.resolve(&[path])?;
        Ok(self.index.get(&repo_path)?)
    }

    pub fn tag(&mut self, path: &str, name: &str, value: &str) -> Result<bool, JnlError> {
        let repo_path = self.resolve(&[path])?;
        Ok(self.index.tag(&repo_path, name, value)?)
    }

    pub fn untag(&mut self, path: &str, name: &str, value: &str) -> Result<bool, JnlError> {
        let repo_path = self.resolve(&[path])?;
        Ok(self.index.untag(&repo_path, name, value)?)
    }

    pub fn remove(&mut self, path: &str) -> Result<Entry, JnlError> {
        let repo_path = self.resolve(&[path])?;
        Ok(self.index.remove(&repo_path)?)
    }

    pub fn by_tag_name<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Entry> + use<'a> {
        self.index.by_tag_name(name)
    }

    pub fn by_tag<'a>(&'a self, name: &str, value: &str) -> impl Iterator<Item = &'a Entry> + use<'a> {
        self.index.by_tag(name, value)
    }

    pub fn by_tag_prefix<'a>(
        &'a self,
        name: &'a str,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a Entry> {
        self.index.by_tag_prefix(name, prefix)
    }

    pub fn all_paths(&self) -> impl Iterator<Item = &RepoPathBuf> {
        self.index.all_paths()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.index.iter()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Registers a fresh guid-named entry under `worklogs/` and applies the
    /// given tags.
    pub fn new_entry(&mut self, tags: &[Tag]) -> Result<&Entry, JnlError> {
        let mut repo_path = RepoPathBuf::from(format!("{}/{}.txt", WORKLOGS_DIRNAME, guid::guid()));
        while self.index.get(&repo_path).is_ok() {
            repo_path = RepoPathBuf::from(format!("{}/{}.txt", WORKLOGS_DIRNAME, guid::guid()));
        }
        // Validate tags before registering so a bad tag leaves no entry behind
        if tags.iter().any(|t| t.name.is_empty()) {
            return Err(CatalogError::EmptyTagName(repo_path).into());
        }
        self.index.register(&repo_path)?;
        for tag in tags {
            self.index.tag(&repo_path, &tag.name, &tag.value)?;
        }
        Ok(self.index.get(&repo_path)?)
    }

    /// The entry tagged `@quick(daily/<date>)`, registering a fresh one if
    /// the date has no entry yet.
    pub fn daily_entry(&mut self, date: NaiveDate) -> Result<&Entry, JnlError> {
        let value = format!("daily/{}", date.format("%Y-%m-%d"));
        let existing = self
            .index
            .by_tag("quick", &value)
            .next()
            .map(|e| e.repo_path().clone());
        if let Some(path) = existing {
            return Ok(self.index.get(&path)?);
        }
        self.new_entry(&[Tag::new("quick", &value), Tag::new("ft", "")])
    }

    /// The daily entry just before the most recent one (the most recent is
    /// normally today's). `None` unless at least two daily entries exist.
    pub fn yesterday_entry(&self) -> Option<&Entry> {
        let mut dailies: Vec<(&str, &Entry)> = self
            .index
            .by_tag_prefix("quick", "daily/")
            .filter_map(|e| e.daily().map(|date| (date, e)))
            .collect();
        // ISO dates, so lexical order is date order
        dailies.sort_by_key(|(date, _)| *date);
        if dailies.len() < 2 {
            return None;
        }
        Some(dailies[dailies.len() - 2].1)
    }

    /// Serializes the whole catalog in registration order.
    pub fn save(&self) -> Snapshot {
        Snapshot {
            entries: self
                .index
                .iter()
                .map(|e| EntryRecord {
                    path: e.repo_path().as_str().to_string(),
                    tags: e.tags().iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Writes the snapshot to `.jnl/entries.json`. The write goes through a
    /// temp file and a rename, so a failure never truncates the previous
    /// snapshot.
    pub fn save_to_disk(&self) -> Result<(), JnlError> {
        let meta_dir = self.meta_dir();
        if !meta_dir.exists() {
            std::fs::create_dir(&meta_dir)?;
        }
        let json = self.save().to_json()?;
        let tmp_path = meta_dir.join(format!("{}.tmp", SNAPSHOT_FILENAME));
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, self.snapshot_path())?;
        debug!("saved {} entries to {}", self.len(), self.snapshot_path().display());
        Ok(())
    }
}
