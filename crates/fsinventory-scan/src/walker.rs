//! JWalk-based lazy file walker.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jwalk::{DirEntryIter, Parallelism, WalkDir};
use tracing::{debug, warn};

use fsinventory_core::{FileRecord, ScanError, ScanWarning, WarningKind};

/// Enumerates the regular files under a root path.
///
/// With recursion disabled only the root's immediate children are visited.
/// Directory symlinks are never followed.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    recurse: bool,
}

impl FileWalker {
    /// Create a walker for a root path.
    pub fn new(root: impl Into<PathBuf>, recurse: bool) -> Self {
        Self {
            root: root.into(),
            recurse,
        }
    }

    /// Start a traversal.
    ///
    /// Fails only when the root itself cannot be resolved. Problems with
    /// individual entries become warnings on the returned [`Walk`].
    pub fn walk(&self) -> Result<Walk, ScanError> {
        let root = self
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&self.root, e))?;
        let metadata = std::fs::metadata(&root).map_err(|e| ScanError::io(&root, e))?;

        if metadata.is_file() {
            let record = record_from_metadata(root.clone(), &metadata);
            return Ok(Walk::new(root, WalkSource::Single(Some(record))));
        }

        if !metadata.is_dir() {
            return Err(ScanError::UnsupportedRoot { path: root });
        }

        let max_depth = if self.recurse { usize::MAX } else { 1 };
        let entries = WalkDir::new(&root)
            .parallelism(Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            })
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter();

        Ok(Walk::new(root, WalkSource::Tree(entries)))
    }
}

enum WalkSource {
    Single(Option<FileRecord>),
    Tree(DirEntryIter<((), ())>),
}

/// A single traversal in progress.
///
/// Yields one pending [`FileRecord`] per regular file. Not restartable.
pub struct Walk {
    root: PathBuf,
    source: WalkSource,
    warnings: Vec<ScanWarning>,
    discovered: u64,
}

impl Walk {
    fn new(root: PathBuf, source: WalkSource) -> Self {
        Self {
            root,
            source,
            warnings: Vec::new(),
            discovered: 0,
        }
    }

    /// Canonical root of this traversal.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of records yielded so far.
    pub fn discovered(&self) -> u64 {
        self.discovered
    }

    /// Take the recorded warnings, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<ScanWarning> {
        std::mem::take(&mut self.warnings)
    }
}

impl Iterator for Walk {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        let Walk {
            source,
            warnings,
            discovered,
            ..
        } = self;

        let record = match source {
            WalkSource::Single(record) => record.take(),
            WalkSource::Tree(entries) => next_file(entries, warnings),
        };

        if record.is_some() {
            *discovered += 1;
        }
        record
    }
}

/// Pull entries until the next regular file, recording warnings on the way.
fn next_file(
    entries: &mut DirEntryIter<((), ())>,
    warnings: &mut Vec<ScanWarning>,
) -> Option<FileRecord> {
    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                let warning = match err.io_error().map(|e| e.kind()) {
                    Some(ErrorKind::PermissionDenied) => ScanWarning::permission_denied(path),
                    _ => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                };
                push_warning(warnings, warning);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        match describe_entry(entry.path(), file_type.is_symlink()) {
            Ok(Some(record)) => return Some(record),
            Ok(None) => {}
            Err(warning) => push_warning(warnings, warning),
        }
    }
    None
}

/// Stat an entry, following symlinks. Only regular files produce a record.
fn describe_entry(path: PathBuf, is_symlink: bool) -> Result<Option<FileRecord>, ScanWarning> {
    let metadata = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(err) if is_symlink && err.kind() == ErrorKind::NotFound => {
            let target = std::fs::read_link(&path)
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();
            return Err(ScanWarning::broken_symlink(&path, &target));
        }
        Err(err) => return Err(ScanWarning::metadata_error(&path, &err)),
    };

    if !metadata.is_file() {
        debug!(path = %path.display(), "Skipping entry that is not a regular file");
        return Ok(None);
    }

    Ok(Some(record_from_metadata(path, &metadata)))
}

fn push_warning(warnings: &mut Vec<ScanWarning>, warning: ScanWarning) {
    warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
    warnings.push(warning);
}

fn record_from_metadata(path: PathBuf, metadata: &Metadata) -> FileRecord {
    FileRecord::new(
        path,
        metadata.len(),
        metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
        get_mode(metadata),
    )
}

/// Get the file mode bits from metadata.
#[cfg(unix)]
fn get_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn get_mode(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
