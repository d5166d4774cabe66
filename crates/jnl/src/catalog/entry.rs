use crate::repo_path::RepoPathBuf;
use crate::tag::TagSet;

/// One catalog record: a root-relative path plus its tags.
///
/// The path is the entry's identity and never changes. Tags are only mutated
/// through [`super::CatalogIndex`], which keeps the secondary indexes in sync;
/// callers outside the crate get read access only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    repo_path: RepoPathBuf,
    pub(crate) tags: TagSet,
}

impl Entry {
    pub(crate) fn new(repo_path: RepoPathBuf) -> Entry {
        Entry {
            repo_path,
            tags: TagSet::new(),
        }
    }

    pub fn repo_path(&self) -> &RepoPathBuf {
        &self.repo_path
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// With `value = None`, matches any tag of that name.
    pub fn has_tag(&self, name: &str, value: Option<&str>) -> bool {
        match value {
            Some(v) => self.tags.contains(name, v),
            None => self.tags.contains_named(name),
        }
    }

    pub fn tag_starts_with(&self, name: &str, prefix: &str) -> bool {
        self.tags.values_of(name).any(|v| v.starts_with(prefix))
    }

    /// The date of this entry's `@quick(daily/<date>)` tag, if it has one.
    pub fn daily(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| t.daily())
    }

    /// Decomposes the entry into its path and final tag snapshot.
    pub fn into_parts(self) -> (RepoPathBuf, TagSet) {
        (self.repo_path, self.tags)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.repo_path)?;
        for tag in &self.tags {
            write!(f, " {}", tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    fn entry_with_tags(tags: &[(&str, &str)]) -> Entry {
        let mut e = Entry::new(RepoPathBuf::from("worklogs/a.txt"));
        for (n, v) in tags {
            e.tags.add(Tag::new(n, v));
        }
        e
    }

    #[test]
    fn test_has_tag() {
        let e = entry_with_tags(&[("project", "x"), ("ft", "")]);
        assert!(e.has_tag("project", Some("x")));
        assert!(e.has_tag("project", None));
        assert!(!e.has_tag("project", Some("y")));
        assert!(!e.has_tag("quick", None));
    }

    #[test]
    fn test_tag_starts_with() {
        let e = entry_with_tags(&[("project", "jnl-core")]);
        assert!(e.tag_starts_with("project", "jnl"));
        assert!(!e.tag_starts_with("project", "core"));
        assert!(!e.tag_starts_with("quick", "jnl"));
    }

    #[test]
    fn test_daily() {
        let e = entry_with_tags(&[("ft", ""), ("quick", "daily/2026-08-26")]);
        assert_eq!(e.daily(), Some("2026-08-26"));
        assert_eq!(entry_with_tags(&[("ft", "")]).daily(), None);
    }

    #[test]
    fn test_display() {
        let e = entry_with_tags(&[("quick", "inbox"), ("ft", "")]);
        assert_eq!(e.to_string(), "worklogs/a.txt: @quick(inbox) @ft");
    }
}
