use std::error::Error;
use std::panic::Location;
use std::path::PathBuf;

use crate::repo_path::RepoPathBuf;

/// Construction-time failures. Fatal: no `Journal` is produced.
#[derive(Debug)]
pub enum ConfigError {
    RootNotFound(PathBuf),
    RootNotDirectory(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::RootNotFound(p) => write!(f, "root {} does not exist", p.display()),
            ConfigError::RootNotDirectory(p) => {
                write!(f, "root {} is not a directory", p.display())
            }
        }
    }
}

/// Path resolution failures. Recoverable: the catalog is untouched.
#[derive(Debug, PartialEq, Eq)]
pub enum PathError {
    EmptySegments,
    OutsideRoot(String),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::EmptySegments => write!(f, "no path segments given"),
            PathError::OutsideRoot(p) => write!(f, "path {:?} escapes the journal root", p),
        }
    }
}

/// Index operation failures. Recoverable: the catalog keeps its prior state.
#[derive(Debug, PartialEq, Eq)]
pub enum CatalogError {
    NotFound(RepoPathBuf),
    AlreadyExists(RepoPathBuf),
    EmptyTagName(RepoPathBuf),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(p) => write!(f, "no entry at {}", p),
            CatalogError::AlreadyExists(p) => write!(f, "entry already registered at {}", p),
            CatalogError::EmptyTagName(p) => write!(f, "empty tag name for entry {}", p),
        }
    }
}

/// Snapshot persistence failures.
#[derive(Debug)]
pub enum PersistError {
    /// Structural violation found while loading a snapshot. `record` is the
    /// zero-based index of the offending record.
    Corrupt {
        record: usize,
        path: String,
        reason: String,
    },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Corrupt {
                record,
                path,
                reason,
            } => write!(f, "corrupt snapshot record {} ({:?}): {}", record, path, reason),
            PersistError::Io(e) => write!(f, "snapshot I/O failure: {}", e),
            PersistError::Json(e) => write!(f, "snapshot JSON failure: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum InnerError {
    Config(ConfigError),
    Path(PathError),
    Catalog(CatalogError),
    Persist(PersistError),
}

#[derive(Debug)]
pub struct JnlError {
    pub error: InnerError,
    pub location: &'static Location<'static>,
}

impl JnlError {
    pub fn path_error(&self) -> Option<&PathError> {
        match &self.error {
            InnerError::Path(e) => Some(e),
            _ => None,
        }
    }

    pub fn catalog_error(&self) -> Option<&CatalogError> {
        match &self.error {
            InnerError::Catalog(e) => Some(e),
            _ => None,
        }
    }

    pub fn persist_error(&self) -> Option<&PersistError> {
        match &self.error {
            InnerError::Persist(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(&self.error, InnerError::Catalog(CatalogError::NotFound(_)))
    }
}

impl std::fmt::Display for JnlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let error_name = match &self.error {
            InnerError::Config(_) => "ConfigError",
            InnerError::Path(_) => "PathError",
            InnerError::Catalog(_) => "CatalogError",
            InnerError::Persist(_) => "PersistError",
        };
        write!(f, "{} at {}: ", error_name, self.location)?;
        match &self.error {
            InnerError::Config(e) => e.fmt(f),
            InnerError::Path(e) => e.fmt(f),
            InnerError::Catalog(e) => e.fmt(f),
            InnerError::Persist(e) => e.fmt(f),
        }
    }
}

impl Error for JnlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.error {
            InnerError::Persist(PersistError::Io(e)) => Some(e),
            InnerError::Persist(PersistError::Json(e)) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for JnlError {
    #[track_caller]
    fn from(e: ConfigError) -> Self {
        Self {
            error: InnerError::Config(e),
            location: Location::caller(),
        }
    }
}

impl From<PathError> for JnlError {
    #[track_caller]
    fn from(e: PathError) -> Self {
        Self {
            error: InnerError::Path(e),
            location: Location::caller(),
        }
    }
}

impl From<CatalogError> for JnlError {
    #[track_caller]
    fn from(e: CatalogError) -> Self {
        Self {
            error: InnerError::Catalog(e),
            location: Location::caller(),
        }
    }
}

impl From<PersistError> for JnlError {
    #[track_caller]
    fn from(e: PersistError) -> Self {
        Self {
            error: InnerError::Persist(e),
            location: Location::caller(),
        }
    }
}

impl From<std::io::Error> for JnlError {
    #[track_caller]
    fn from(e: std::io::Error) -> Self {
        Self {
            error: InnerError::Persist(PersistError::Io(e)),
            location: Location::caller(),
        }
    }
}

impl From<serde_json::Error> for JnlError {
    #[track_caller]
    fn from(e: serde_json::Error) -> Self {
        Self {
            error: InnerError::Persist(PersistError::Json(e)),
            location: Location::caller(),
        }
    }
}
