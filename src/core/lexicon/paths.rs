//! Lexicon Path Resolution
//!
//! Locates the dictionary corpus, the abbreviation table and the index
//! snapshot, handling both a development checkout (files under `data/`)
//! and an installed layout (user data directory).

use std::path::{Path, PathBuf};

/// Directory of dictionary volumes
pub const CORPUS_DIRNAME: &str = "lsj_xml";

/// Index snapshot filename
pub const SNAPSHOT_FILENAME: &str = "lsj_index.json";

/// Bibliographic abbreviation table filename
pub const ABBREVIATIONS_FILENAME: &str = "abbreviations.json";

/// Resolves the corpus directory.
///
/// Checks locations in order:
/// 1. Configured directory (returned as-is, even when missing, so the
///    build reports it)
/// 2. Development path (`data/`)
/// 3. User data directory
pub fn resolve_corpus_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    find_data_path(CORPUS_DIRNAME).unwrap_or_else(|| user_data_path(CORPUS_DIRNAME))
}

/// Resolves the abbreviation table. `None` means none is available.
pub fn resolve_abbreviations_path(configured: Option<&Path>) -> Option<PathBuf> {
    match configured {
        Some(path) => Some(path.to_path_buf()),
        None => find_data_path(ABBREVIATIONS_FILENAME),
    }
}

/// Resolves where the snapshot is read and written.
///
/// Snapshots are generated, so they default to the user data directory
/// rather than the source tree.
pub fn resolve_snapshot_path(configured: Option<&Path>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| user_data_path(SNAPSHOT_FILENAME))
}

fn find_data_path(name: &str) -> Option<PathBuf> {
    let dev_paths = [
        PathBuf::from("data").join(name),
        PathBuf::from("data").join("dictionaries").join(name),
        std::env::var("CARGO_MANIFEST_DIR")
            .map(|dir| PathBuf::from(dir).join("data").join(name))
            .unwrap_or_default(),
    ];

    for path in &dev_paths {
        if !path.as_os_str().is_empty() && path.exists() {
            return Some(path.clone());
        }
    }

    get_user_data_dir()
        .map(|dir| dir.join(name))
        .filter(|path| path.exists())
}

fn user_data_path(name: &str) -> PathBuf {
    get_user_data_dir()
        .unwrap_or_else(|| PathBuf::from("data"))
        .join(name)
}

/// Gets the user data directory for Etymon.
///
/// Returns `~/.local/share/etymon/` on Linux,
/// `~/Library/Application Support/etymon/` on macOS.
pub fn get_user_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("etymon"))
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
