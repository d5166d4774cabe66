use std::path::Path;

use tempfile::TempDir;

/// A fresh empty directory to serve as a journal root.
pub fn temp_root() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// A journal root populated with the given (relative path, contents) files.
/// Parent directories are created as needed.
pub fn temp_root_with_files(files: &[(&str, &str)]) -> TempDir {
    let dir = temp_root();
    for (rel_path, contents) in files {
        let full = dir.path().join(Path::new(rel_path));
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&full, contents).expect("write file");
    }
    dir
}
