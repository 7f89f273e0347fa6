use frontier_core::error::DeployError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A local file to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub local_path: PathBuf,
    /// Relative to the asset root, always `/`-separated.
    pub relative_path: String,
}

/// One item found by [`walk_assets`].
#[derive(Debug)]
pub enum WalkEntry {
    File(AssetFile),
    /// An entry below the root that could not be read, e.g. a dangling
    /// symlink or a directory without read permission.
    Unreadable {
        relative_path: String,
        error: DeployError,
    },
}

fn relative_path_of(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collects every regular file below `root`, depth first, siblings sorted by
/// name. Blocking; call it off the async executor.
///
/// Symlinks are followed. A link cycle or an unreadable root aborts with
/// [`DeployError::Walk`]. Any other bad entry is returned as
/// [`WalkEntry::Unreadable`] so the caller can count it and carry on.
pub fn walk_assets(root: &Path) -> Result<Vec<WalkEntry>, DeployError> {
    let walk_error = |message: String| DeployError::Walk {
        root: root.to_path_buf(),
        message,
    };

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(ancestor) = e.loop_ancestor() {
                    return Err(walk_error(format!(
                        "symlink cycle at {} (points back to {})",
                        e.path().map(Path::display).map(|d| d.to_string()).unwrap_or_default(),
                        ancestor.display()
                    )));
                }
                if e.depth() == 0 {
                    return Err(walk_error(e.to_string()));
                }

                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                let message = e.to_string();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other(message));
                entries.push(WalkEntry::Unreadable {
                    relative_path: relative_path_of(root, &path),
                    error: DeployError::FileRead { path, source },
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        entries.push(WalkEntry::File(AssetFile {
            relative_path: relative_path_of(root, entry.path()),
            local_path: entry.into_path(),
        }));
    }

    Ok(entries)
}
