use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A canonical root-relative path: `/`-separated, no leading or trailing
/// separator. This is the identity key of catalog entries. Construct one
/// through [`crate::resolver::resolve`] when the input is untrusted.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoPathBuf(pub String);

impl From<&str> for RepoPathBuf {
    fn from(input: &str) -> Self {
        let trimmed = input.trim_matches('/');
        Self(trimmed.to_string())
    }
}

impl From<&String> for RepoPathBuf {
    fn from(input: &String) -> Self {
        Self::from(input.as_str())
    }
}

impl From<String> for RepoPathBuf {
    fn from(input: String) -> Self {
        Self::from(input.as_str())
    }
}

impl std::fmt::Display for RepoPathBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl RepoPathBuf {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The empty path names the root itself.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn file_name<'a>(&'a self) -> &'a str {
        match self.0.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    pub fn to_full_path(&self, root: &Path) -> PathBuf {
        root.join(Path::new(&self.0))
    }
}
