use std::collections::VecDeque;
use std::path::PathBuf;

use log::warn;

use jnl::journal::META_DIRNAME;
use jnl::{Journal, JnlError, Tag};

// Tags from one file's text, reading line by line and stopping once a
// @noscan tag turns up (that line's tags are still included).
fn tags_from_text(text: &str) -> Vec<Tag> {
    let mut out = Vec::new();
    for line in text.lines() {
        let on_line = Tag::parse(line);
        let stop = on_line.iter().any(|t| t.name == "noscan");
        out.extend(on_line);
        if stop {
            break;
        }
    }
    out
}

/// Walks the journal root on disk, registers every file that is not yet in
/// the catalog, and absorbs `@name(value)` tags found in file contents.
/// The `.jnl` meta directory is skipped. Returns how many entries were
/// newly registered.
pub fn scan_root(journal: &mut Journal) -> Result<usize, JnlError> {
    let mut newly_registered = 0;
    let mut pending: VecDeque<PathBuf> = VecDeque::new();
    pending.push_back(journal.root().to_path_buf());

    while let Some(dir) = pending.pop_front() {
        let mut children: Vec<std::fs::DirEntry> =
            std::fs::read_dir(&dir)?.collect::<Result<_, _>>()?;
        // read_dir order is platform-dependent; sort for a stable catalog
        children.sort_by_key(|d| d.file_name());

        for child in children {
            if child.file_name() == META_DIRNAME {
                continue;
            }
            let file_type = child.file_type()?;
            let child_path = child.path();
            if file_type.is_dir() {
                pending.push_back(child_path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let path_str = match child_path.to_str() {
                Some(s) => s.to_string(),
                None => {
                    // A lossy conversion would register a path that names no
                    // real file
                    warn!("skipping non-UTF-8 file name {}", child_path.display());
                    continue;
                }
            };
            if journal.get(&path_str).is_err() {
                journal.register(&path_str)?;
                newly_registered += 1;
            }

            match std::fs::read_to_string(&child_path) {
                Ok(text) => {
                    for tag in tags_from_text(&text) {
                        journal.tag(&path_str, &tag.name, &tag.value)?;
                    }
                }
                Err(e) => {
                    warn!("skipping tags of {}: {}", child_path.display(), e);
                }
            }
        }
    }

    Ok(newly_registered)
}
