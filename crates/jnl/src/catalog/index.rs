use std::collections::HashMap;
use std::hash::Hash;

use crate::error::CatalogError;
use crate::repo_path::RepoPathBuf;
use crate::tag::Tag;

use super::Entry;

fn bucket_insert<K: Eq + Hash>(
    map: &mut HashMap<K, Vec<RepoPathBuf>>,
    key: K,
    path: &RepoPathBuf,
) {
    let bucket = map.entry(key).or_default();
    if !bucket.contains(path) {
        bucket.push(path.clone());
    }
}

// Removes `path` from the bucket at `key` and drops the bucket if it ends up
// empty, so unknown tag names never accumulate as empty buckets.
fn bucket_remove<K: Eq + Hash>(
    map: &mut HashMap<K, Vec<RepoPathBuf>>,
    key: &K,
    path: &RepoPathBuf,
) {
    if let Some(bucket) = map.get_mut(key) {
        bucket.retain(|p| p != path);
        if bucket.is_empty() {
            map.remove(key);
        }
    }
}

/// The in-memory entry store plus its secondary indexes.
///
/// Owns every [`Entry`] exclusively; everything outside the crate sees
/// entries by shared reference only. Each mutation updates the tag buckets in
/// the same call, so the indexes are never observably out of sync with the
/// entries: for every entry and every tag (n, v) it holds, the name bucket
/// for n and the (n, v) bucket both reference it, and no bucket references a
/// path that is not registered.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: HashMap<RepoPathBuf, Entry>,
    // Registration order, for deterministic iteration and serialization
    order: Vec<RepoPathBuf>,
    by_name: HashMap<String, Vec<RepoPathBuf>>,
    by_name_value: HashMap<(String, String), Vec<RepoPathBuf>>,
}

impl CatalogIndex {
    pub fn new() -> CatalogIndex {
        CatalogIndex::default()
    }

    /// Creates an entry with an empty tag set. Registering a path twice is an
    /// error; the first registration stays untouched.
    pub fn register(&mut self, path: &RepoPathBuf) -> Result<&Entry, CatalogError> {
        if self.entries.contains_key(path) {
            return Err(CatalogError::AlreadyExists(path.clone()));
        }
        self.order.push(path.clone());
        self.entries.insert(path.clone(), Entry::new(path.clone()));
        Ok(&self.entries[path])
    }

    pub fn get(&self, path: &RepoPathBuf) -> Result<&Entry, CatalogError> {
        self.entries
            .get(path)
            .ok_or_else(|| CatalogError::NotFound(path.clone()))
    }

    /// Adds a tag to the entry at `path`. Returns whether the tag was newly
    /// added; tagging with an identical (name, value) pair again is a no-op
    /// and leaves the indexes untouched. Tag names are never empty.
    pub fn tag(&mut self, path: &RepoPathBuf, name: &str, value: &str) -> Result<bool, CatalogError> {
        if name.is_empty() {
            return Err(CatalogError::EmptyTagName(path.clone()));
        }
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| CatalogError::NotFound(path.clone()))?;
        if !entry.tags.add(Tag::new(name, value)) {
            return Ok(false);
        }
        bucket_insert(&mut self.by_name, name.to_string(), path);
        bucket_insert(
            &mut self.by_name_value,
            (name.to_string(), value.to_string()),
            path,
        );
        Ok(true)
    }

    /// Removes one (name, value) tag. Returns whether it was present.
    pub fn untag(&mut self, path: &RepoPathBuf, name: &str, value: &str) -> Result<bool, CatalogError> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| CatalogError::NotFound(path.clone()))?;
        if !entry.tags.remove(name, value) {
            return Ok(false);
        }
        let still_named = entry.tags.contains_named(name);
        bucket_remove(
            &mut self.by_name_value,
            &(name.to_string(), value.to_string()),
            path,
        );
        // The entry stays in the name bucket while another value of the same
        // name remains on it
        if !still_named {
            bucket_remove(&mut self.by_name, &name.to_string(), path);
        }
        Ok(true)
    }

    /// Removes the entry and every secondary-index reference to it, returning
    /// the entry's final state.
    pub fn remove(&mut self, path: &RepoPathBuf) -> Result<Entry, CatalogError> {
        let entry = self
            .entries
            .remove(path)
            .ok_or_else(|| CatalogError::NotFound(path.clone()))?;
        self.order.retain(|p| p != path);
        for tag in entry.tags() {
            bucket_remove(&mut self.by_name, &tag.name, path);
            bucket_remove(
                &mut self.by_name_value,
                &(tag.name.clone(), tag.value.clone()),
                path,
            );
        }
        Ok(entry)
    }

    /// Entries holding any tag with this name, in bucket insertion order.
    /// Unknown names yield an empty iterator.
    pub fn by_tag_name<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Entry> + use<'a> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|p| self.entries.get(p))
    }

    /// Entries holding exactly this (name, value) tag.
    pub fn by_tag<'a>(&'a self, name: &str, value: &str) -> impl Iterator<Item = &'a Entry> + use<'a> {
        self.by_name_value
            .get(&(name.to_string(), value.to_string()))
            .into_iter()
            .flatten()
            .filter_map(|p| self.entries.get(p))
    }

    /// Entries holding a tag `name` whose value starts with `prefix`.
    /// Linear over the name bucket, in bucket insertion order.
    pub fn by_tag_prefix<'a>(
        &'a self,
        name: &'a str,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a Entry> {
        self.by_tag_name(name)
            .filter(move |e| e.tag_starts_with(name, prefix))
    }

    /// All registered paths, in registration order.
    pub fn all_paths(&self) -> impl Iterator<Item = &RepoPathBuf> {
        self.order.iter()
    }

    /// All entries, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.order.iter().filter_map(|p| self.entries.get(p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> RepoPathBuf {
        RepoPathBuf::from(s)
    }

    // The core correctness property: entries and buckets always agree in
    // both directions.
    fn assert_consistent(index: &CatalogIndex) {
        for entry in index.entries.values() {
            for tag in entry.tags() {
                let name_bucket = index.by_name.get(&tag.name).expect("name bucket exists");
                assert!(name_bucket.contains(entry.repo_path()));
                let pair_bucket = index
                    .by_name_value
                    .get(&(tag.name.clone(), tag.value.clone()))
                    .expect("pair bucket exists");
                assert!(pair_bucket.contains(entry.repo_path()));
            }
        }
        for (name, bucket) in &index.by_name {
            assert!(!bucket.is_empty(), "empty bucket for name {:?}", name);
            for p in bucket {
                let entry = index.entries.get(p).expect("bucketed path is registered");
                assert!(entry.tags().contains_named(name));
            }
        }
        for ((name, value), bucket) in &index.by_name_value {
            assert!(!bucket.is_empty(), "empty bucket for {:?}({:?})", name, value);
            for p in bucket {
                let entry = index.entries.get(p).expect("bucketed path is registered");
                assert!(entry.tags().contains(name, value));
            }
        }
        assert_eq!(index.order.len(), index.entries.len());
    }

    #[test]
    fn test_register_and_get() {
        let mut index = CatalogIndex::new();
        assert!(index.is_empty());

        let entry = index.register(&path("notes/a.txt")).unwrap();
        assert_eq!(entry.repo_path(), &path("notes/a.txt"));
        assert!(entry.tags().is_empty());

        assert_eq!(index.len(), 1);
        assert!(index.get(&path("notes/a.txt")).is_ok());
        assert_eq!(
            index.get(&path("notes/b.txt")).unwrap_err(),
            CatalogError::NotFound(path("notes/b.txt"))
        );
        assert_consistent(&index);
    }

    #[test]
    fn test_duplicate_register_is_error() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();
        index.tag(&path("a.txt"), "ft", "").unwrap();

        assert_eq!(
            index.register(&path("a.txt")).unwrap_err(),
            CatalogError::AlreadyExists(path("a.txt"))
        );
        // The original entry is untouched
        assert!(index.get(&path("a.txt")).unwrap().has_tag("ft", None));
        assert_eq!(index.len(), 1);
        assert_consistent(&index);
    }

    #[test]
    fn test_tag_updates_both_buckets() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();

        assert!(index.tag(&path("a.txt"), "project", "x").unwrap());
        assert_eq!(index.by_tag_name("project").count(), 1);
        assert_eq!(index.by_tag("project", "x").count(), 1);
        assert_eq!(index.by_tag("project", "y").count(), 0);
        assert_consistent(&index);
    }

    #[test]
    fn test_tag_is_idempotent() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();

        assert!(index.tag(&path("a.txt"), "project", "x").unwrap());
        assert!(!index.tag(&path("a.txt"), "project", "x").unwrap());
        assert_eq!(index.get(&path("a.txt")).unwrap().tags().len(), 1);
        assert_eq!(index.by_tag("project", "x").count(), 1);
        assert_consistent(&index);

        // An intervening untag re-arms the add
        assert!(index.untag(&path("a.txt"), "project", "x").unwrap());
        assert!(index.tag(&path("a.txt"), "project", "x").unwrap());
        assert_consistent(&index);
    }

    #[test]
    fn test_empty_tag_name_is_rejected() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();

        assert_eq!(
            index.tag(&path("a.txt"), "", "x").unwrap_err(),
            CatalogError::EmptyTagName(path("a.txt"))
        );
        // Nothing was recorded anywhere
        assert!(index.get(&path("a.txt")).unwrap().tags().is_empty());
        assert_eq!(index.by_tag("", "x").count(), 0);
        assert_consistent(&index);
    }

    #[test]
    fn test_tag_unknown_path() {
        let mut index = CatalogIndex::new();
        assert_eq!(
            index.tag(&path("nope"), "a", "b").unwrap_err(),
            CatalogError::NotFound(path("nope"))
        );
        assert_eq!(
            index.untag(&path("nope"), "a", "b").unwrap_err(),
            CatalogError::NotFound(path("nope"))
        );
    }

    #[test]
    fn test_same_name_two_values() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();
        index.tag(&path("a.txt"), "project", "x").unwrap();
        index.tag(&path("a.txt"), "project", "y").unwrap();

        // One entry, not two, under the bare name
        assert_eq!(index.by_tag_name("project").count(), 1);
        assert_consistent(&index);

        // Untagging one value keeps the entry in the name bucket
        assert!(index.untag(&path("a.txt"), "project", "x").unwrap());
        assert_eq!(index.by_tag_name("project").count(), 1);
        assert_eq!(index.by_tag("project", "x").count(), 0);
        assert_consistent(&index);

        // Untagging the last value prunes the name bucket too
        assert!(index.untag(&path("a.txt"), "project", "y").unwrap());
        assert_eq!(index.by_tag_name("project").count(), 0);
        assert!(index.by_name.is_empty());
        assert!(index.by_name_value.is_empty());
        assert_consistent(&index);
    }

    #[test]
    fn test_untag_missing_tag_is_noop() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();
        assert!(!index.untag(&path("a.txt"), "project", "x").unwrap());
        assert_consistent(&index);
    }

    #[test]
    fn test_remove_cleans_all_buckets() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();
        index.register(&path("b.txt")).unwrap();
        index.tag(&path("a.txt"), "project", "x").unwrap();
        index.tag(&path("b.txt"), "project", "x").unwrap();
        index.tag(&path("a.txt"), "ft", "").unwrap();

        let removed = index.remove(&path("a.txt")).unwrap();
        let (removed_path, tags) = removed.into_parts();
        assert_eq!(removed_path, path("a.txt"));
        assert_eq!(tags.len(), 2);

        assert!(index.get(&path("a.txt")).is_err());
        // b.txt still referenced, ft bucket fully pruned
        assert_eq!(index.by_tag("project", "x").count(), 1);
        assert_eq!(index.by_tag_name("ft").count(), 0);
        assert_consistent(&index);

        assert_eq!(
            index.remove(&path("a.txt")).unwrap_err(),
            CatalogError::NotFound(path("a.txt"))
        );
    }

    #[test]
    fn test_bucket_order_is_insertion_order() {
        let mut index = CatalogIndex::new();
        for name in ["c.txt", "a.txt", "b.txt"] {
            index.register(&path(name)).unwrap();
            index.tag(&path(name), "ft", "").unwrap();
        }
        let order: Vec<&str> = index
            .by_tag_name("ft")
            .map(|e| e.repo_path().as_str())
            .collect();
        assert_eq!(order, vec!["c.txt", "a.txt", "b.txt"]);

        let all: Vec<&str> = index.all_paths().map(|p| p.as_str()).collect();
        assert_eq!(all, vec!["c.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_by_tag_prefix() {
        let mut index = CatalogIndex::new();
        index.register(&path("a.txt")).unwrap();
        index.register(&path("b.txt")).unwrap();
        index.tag(&path("a.txt"), "project", "jnl-core").unwrap();
        index.tag(&path("b.txt"), "project", "house").unwrap();

        let hits: Vec<&str> = index
            .by_tag_prefix("project", "jnl")
            .map(|e| e.repo_path().as_str())
            .collect();
        assert_eq!(hits, vec!["a.txt"]);
        assert_eq!(index.by_tag_prefix("project", "").count(), 2);
        assert_eq!(index.by_tag_prefix("owner", "x").count(), 0);
    }

    #[test]
    fn test_mixed_mutation_sequence_stays_consistent() {
        let mut index = CatalogIndex::new();
        for i in 0..5 {
            index.register(&path(&format!("worklogs/{}.txt", i))).unwrap();
        }
        for i in 0..5 {
            let p = path(&format!("worklogs/{}.txt", i));
            index.tag(&p, "project", if i % 2 == 0 { "even" } else { "odd" }).unwrap();
            index.tag(&p, "ft", "").unwrap();
        }
        assert_consistent(&index);

        index.untag(&path("worklogs/1.txt"), "ft", "").unwrap();
        index.remove(&path("worklogs/2.txt")).unwrap();
        index.tag(&path("worklogs/3.txt"), "project", "extra").unwrap();
        index.remove(&path("worklogs/0.txt")).unwrap();
        assert_consistent(&index);

        assert_eq!(index.len(), 3);
        assert_eq!(index.by_tag("project", "even").count(), 1);
        assert_eq!(index.by_tag_name("ft").count(), 2);
    }
}
