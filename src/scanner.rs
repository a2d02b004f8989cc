use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::cli::Options;
use crate::error::Error;
use crate::utils::{mirror_path, slash_path};

const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// One unit of work: read `source`, write the stripped text to `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl FileTask {
    pub fn new(source: &Path, root: &Path, opts: &Options) -> Self {
        let destination = match &opts.output_dir {
            Some(out) => mirror_path(source, root, out),
            None => source.to_path_buf(),
        };
        FileTask {
            source: source.to_path_buf(),
            destination,
        }
    }

    pub fn in_place(&self) -> bool {
        self.source == self.destination
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Subdirectory of a non-recursive run.
    Directory,
    Excluded,
    Extension,
    OutputDir,
    NotAFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub tasks: Vec<FileTask>,
    pub skipped: Vec<Skipped>,
    pub errors: Vec<Error>,
}

fn is_excluded(rel: &Path, patterns: &[Pattern]) -> bool {
    let name = rel.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let s_rel = slash_path(rel);
    patterns
        .iter()
        .any(|pat| pat.matches(&s_rel) || pat.matches(name))
}

fn extension_allowed(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    extensions.iter().any(|e| *e == ext)
}

fn prune_reason(
    entry: &DirEntry,
    root: &Path,
    patterns: &[Pattern],
    output: Option<&Path>,
) -> Option<SkipReason> {
    let rel = match entry.path().strip_prefix(root) {
        Ok(rel) if rel != Path::new("") => rel,
        _ => return None,
    };

    if entry.file_type().is_dir() {
        let name = entry.file_name().to_str().unwrap_or("");
        if VCS_DIRS.contains(&name) {
            return Some(SkipReason::Excluded);
        }
        if let Some(out) = output {
            if entry.path().canonicalize().ok().as_deref() == Some(out) {
                return Some(SkipReason::OutputDir);
            }
        }
    }
    if is_excluded(rel, patterns) {
        return Some(SkipReason::Excluded);
    }
    None
}

/// Enumerate the file tasks for one input path. Unreadable entries land in
/// `errors` and the walk goes on.
pub fn scan_input(root: &Path, opts: &Options) -> ScanResult {
    let mut result = ScanResult::default();

    let meta = match fs::metadata(root) {
        Ok(meta) => meta,
        Err(source) => {
            result.errors.push(Error::Traversal {
                path: root.to_path_buf(),
                source,
            });
            return result;
        }
    };

    // Explicit files bypass exclusion and extension filters.
    if meta.is_file() {
        result.tasks.push(FileTask::new(root, root, opts));
        return result;
    }
    if !meta.is_dir() {
        result.skipped.push(Skipped {
            path: root.to_path_buf(),
            reason: SkipReason::NotAFile,
        });
        return result;
    }

    let output = opts
        .output_dir
        .as_deref()
        .and_then(|p| p.canonicalize().ok());
    let max_depth = if opts.recursive { usize::MAX } else { 1 };

    let mut pruned = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            match prune_reason(e, root, &opts.exclude_patterns, output.as_deref()) {
                Some(reason) => {
                    pruned.push(Skipped {
                        path: e.path().to_path_buf(),
                        reason,
                    });
                    false
                }
                None => true,
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                result.errors.push(Error::Traversal {
                    path,
                    source: err.into(),
                });
                continue;
            }
        };

        let path = entry.path();
        let file_type = entry.file_type();
        if file_type.is_dir() {
            if !opts.recursive {
                result.skipped.push(Skipped {
                    path: path.to_path_buf(),
                    reason: SkipReason::Directory,
                });
            }
            continue;
        }
        if !file_type.is_file() {
            result.skipped.push(Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::NotAFile,
            });
            continue;
        }
        if !extension_allowed(path, &opts.extensions) {
            result.skipped.push(Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::Extension,
            });
            continue;
        }
        result.tasks.push(FileTask::new(path, root, opts));
    }

    result.skipped.extend(pruned);
    result
}
