use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// Original journal syntax: "@name" or "@name(value)" anywhere on a line.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        @
            (               # group 1: tag name
                [^(\s]+     # anything other than ( or whitespace
            )
        (?:
            \(
                (           # group 2: tag value
                    [^)]*?  # anything other than )
                )
            \)
        )?
    ",
    )
    .expect("tag regex")
});

/// A (name, value) label. Pure value type: two tags with the same name and
/// value are the same tag. The name is never empty; the value may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: &str, value: &str) -> Tag {
        Tag {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// All tags found on one line of journal text.
    pub fn parse(line: &str) -> Vec<Tag> {
        TAG_RE
            .captures_iter(line)
            .map(|caps| Tag {
                name: caps[1].to_string(),
                value: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            })
            .collect()
    }

    /// The date of a `@quick(daily/<date>)` tag, if this is one.
    pub fn daily(&self) -> Option<&str> {
        if self.name != "quick" || self.value.is_empty() {
            return None;
        }
        self.value.strip_prefix("daily/")
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(f, "@{}", self.name)
        } else {
            write!(f, "@{}({})", self.name, self.value)
        }
    }
}

/// An ordered, duplicate-free collection of tags attached to one entry.
///
/// Insertion order is preserved, which makes iteration and serialization
/// deterministic. Every mutator reports whether it changed anything, so the
/// catalog index can tell a real mutation from a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> TagSet {
        TagSet(Vec::new())
    }

    /// Returns true if the tag was newly inserted, false if the identical
    /// (name, value) pair was already present.
    pub fn add(&mut self, tag: Tag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Returns true if a matching tag was present and removed.
    pub fn remove(&mut self, name: &str, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| !(t.name == name && t.value == value));
        self.0.len() != before
    }

    /// Removes every tag with the given name; returns how many were removed.
    pub fn remove_all_named(&mut self, name: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|t| t.name != name);
        before - self.0.len()
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.0.iter().any(|t| t.name == name && t.value == value)
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.0.iter().any(|t| t.name == name)
    }

    pub fn values_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.0.iter().filter(move |t| t.name == name).map(|t| t.value.as_str())
    }

    pub fn names_with_value<'a>(&'a self, value: &'a str) -> impl Iterator<Item = &'a str> {
        self.0.iter().filter(move |t| t.value == value).map(|t| t.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
