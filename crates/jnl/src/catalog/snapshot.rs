use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::tag::Tag;

/// One serialized entry: its root-relative path and its tags, in tag
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub path: String,
    pub tags: Vec<Tag>,
}

/// The order-preserving serialized form of a whole catalog: one record per
/// entry, in registration order. Record order and tag order are observable
/// through iteration, so any backend must keep them exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entries: Vec<EntryRecord>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, PersistError> {
        serde_json::to_string_pretty(self).map_err(PersistError::Json)
    }

    pub fn from_json(data: &str) -> Result<Snapshot, PersistError> {
        serde_json::from_str(data).map_err(PersistError::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_order() {
        let snapshot = Snapshot {
            entries: vec![
                EntryRecord {
                    path: "worklogs/b.txt".to_string(),
                    tags: vec![Tag::new("project", "x"), Tag::new("ft", "")],
                },
                EntryRecord {
                    path: "worklogs/a.txt".to_string(),
                    tags: vec![],
                },
            ],
        };

        let json = snapshot.to_json().unwrap();
        let back = Snapshot::from_json(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(PersistError::Json(_))
        ));
    }
}
