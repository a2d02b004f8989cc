use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use similar::TextDiff;

use crate::cli::Options;
use crate::comment::strip_comments;
use crate::error::{Error, Result};
use crate::scanner::{scan_input, FileTask, SkipReason, Skipped};
use crate::utils::{encode_text, read_text_best_effort};

/// Totals for one invocation. Passed through `run` by value.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Entries that could not be enumerated; also counted in `skipped`.
    pub traversal_errors: usize,
    pub comments_removed: usize,
    /// Comments the policy left in place.
    pub comments_kept: usize,
    pub files_changed: usize,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.traversal_errors == 0
    }

    pub fn record(&mut self, report: &FileReport) {
        self.processed += 1;
        self.comments_removed += report.removed;
        self.comments_kept += report.kept;
        if report.changed {
            self.files_changed += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub removed: usize,
    pub kept: usize,
    pub changed: bool,
    /// Unified diff, only computed for `--dry-run --diff`.
    pub diff: Option<String>,
}

pub fn unified_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    diff.unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string()
}

fn write_output(dest: &Path, bytes: &[u8]) -> Result<()> {
    let to_write_err = |source: std::io::Error| Error::Write {
        path: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_write_err)?;
    }
    fs::write(dest, bytes).map_err(to_write_err)
}

/// Read, strip, write. Nothing touches the disk in dry-run mode.
pub fn process_file(task: &FileTask, opts: &Options) -> Result<FileReport> {
    let decoded = read_text_best_effort(&task.source).map_err(|source| Error::Read {
        path: task.source.clone(),
        source,
    })?;

    let stripped = strip_comments(&decoded.text, &opts.policy);
    let diff = (opts.show_diff && stripped.changed()).then(|| {
        unified_diff(
            &decoded.text,
            &stripped.text,
            &task.source.to_string_lossy(),
            &task.destination.to_string_lossy(),
        )
    });

    if !opts.dry_run {
        write_output(
            &task.destination,
            &encode_text(&stripped.text, decoded.encoding),
        )?;
    }

    Ok(FileReport {
        removed: stripped.removed,
        kept: stripped.kept,
        changed: stripped.changed(),
        diff,
    })
}

fn log_skip(skip: &Skipped) {
    let path = skip.path.display();
    match skip.reason {
        SkipReason::Directory => info!("Skipped directory {path} (not recursive)"),
        SkipReason::Excluded => debug!("Excluded {path}"),
        SkipReason::Extension => debug!("Skipped {path} (extension not selected)"),
        SkipReason::OutputDir => debug!("Skipped output directory {path}"),
        SkipReason::NotAFile => info!("Skipped {path} (not a regular file)"),
    }
}

/// Destinations already written in this run, keyed to the source that claimed them.
#[derive(Debug, Default)]
struct Claims(HashMap<PathBuf, PathBuf>);

impl Claims {
    /// Two different sources mapping onto one output file is a write error for
    /// the later one; the earlier result is kept.
    fn claim(&mut self, task: &FileTask) -> Result<()> {
        match self.0.get(&task.destination) {
            Some(owner) if *owner != task.source => Err(Error::Write {
                path: task.destination.clone(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("already written from {}", owner.display()),
                ),
            }),
            Some(_) => Ok(()),
            None => {
                self.0
                    .insert(task.destination.clone(), task.source.clone());
                Ok(())
            }
        }
    }
}

/// Walk every input in order and process each task to completion before the
/// next one. Per-entry failures are logged and counted, never propagated.
pub fn run(inputs: &[PathBuf], opts: &Options, mut summary: Summary) -> Summary {
    let mut claims = Claims::default();
    for root in inputs {
        let scan = scan_input(root, opts);

        for skip in &scan.skipped {
            log_skip(skip);
            summary.skipped += 1;
        }
        for err in &scan.errors {
            warn!("{err}");
            summary.skipped += 1;
            summary.traversal_errors += 1;
        }

        for task in &scan.tasks {
            match claims.claim(task).and_then(|()| process_file(task, opts)) {
                Ok(report) => {
                    if opts.dry_run {
                        info!(
                            "Would remove {} comment(s) from {}",
                            report.removed,
                            task.source.display()
                        );
                    } else if task.in_place() {
                        info!(
                            "Processed file: {} ({} removed)",
                            task.source.display(),
                            report.removed
                        );
                    } else {
                        info!(
                            "Processed file: {} -> {} ({} removed)",
                            task.source.display(),
                            task.destination.display(),
                            report.removed
                        );
                    }
                    if let Some(diff) = &report.diff {
                        print!("{diff}");
                    }
                    summary.record(&report);
                }
                Err(err) => {
                    error!("{err}");
                    summary.failed += 1;
                }
            }
        }
    }
    summary
}
