pub mod error;
pub use error::{CatalogError, ConfigError, JnlError, PathError, PersistError};

pub mod repo_path;
pub use repo_path::RepoPathBuf;

pub mod resolver;

pub mod tag;
pub use tag::{Tag, TagSet};

pub mod guid;

pub mod catalog;
pub use catalog::{CatalogIndex, Entry, Snapshot};

pub mod journal;
pub use journal::Journal;

// Helpers for testing
pub mod testing;
