//! Lexical path resolution against the journal root.
//!
//! This is the sole authority on "is this path inside the root". It reasons
//! about strings only: no filesystem access, so it behaves identically for
//! paths that exist and paths that don't.

use std::path::Path;

use crate::error::PathError;
use crate::repo_path::RepoPathBuf;

fn candidate_display<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}

// Appends one slash-separated fragment onto the component stack. `floor` is
// the stack depth `..` must never pop below.
fn push_fragment<'a>(stack: &mut Vec<&'a str>, floor: usize, fragment: &'a str) -> Result<(), ()> {
    for comp in fragment.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                if stack.len() <= floor {
                    return Err(());
                }
                stack.pop();
            }
            c => stack.push(c),
        }
    }
    Ok(())
}

/// Joins `parts` (single components or slash-separated fragments), resolves
/// `.` and `..` lexically, and checks the result stays under `root`.
///
/// A relative candidate is interpreted against `root`; a candidate whose
/// first fragment starts with `/` is interpreted as an absolute path and must
/// still land on `root` or below. Resolving to the root itself yields the
/// empty relative path.
pub fn resolve<S: AsRef<str>>(root: &Path, parts: &[S]) -> Result<RepoPathBuf, PathError> {
    if parts.is_empty() {
        return Err(PathError::EmptySegments);
    }

    let root_str = root.to_string_lossy();
    let root_parts: Vec<&str> = root_str
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();

    let absolute = parts[0].as_ref().starts_with('/');
    let mut stack: Vec<&str> = Vec::new();
    let floor = if absolute {
        0
    } else {
        stack.extend(root_parts.iter());
        root_parts.len()
    };

    for part in parts {
        push_fragment(&mut stack, floor, part.as_ref())
            .map_err(|_| PathError::OutsideRoot(candidate_display(parts)))?;
    }

    if stack.len() < root_parts.len() || stack[..root_parts.len()] != root_parts[..] {
        return Err(PathError::OutsideRoot(candidate_display(parts)));
    }

    Ok(RepoPathBuf(stack[root_parts.len()..].join("/")))
}
