use std::path::{Path, PathBuf};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use walkdir::WalkDir;

use crate::dispatch::Dispatcher;
use crate::error::SidecarError;
use crate::library::MediaFile;
use crate::sidecar;

pub struct ScanConfig {
    pub media_path: PathBuf,
    pub show_progress: bool,
}

#[derive(Debug)]
pub enum FileOutcome {
    Written { sidecar: PathBuf },
    NoMetadata,
    Unsupported { extension: String },
    Failed { error: SidecarError },
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub files_scanned: u64,
    pub reports: Vec<FileReport>,
}

impl ScanResult {
    pub fn written(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Written { .. }))
    }

    pub fn no_metadata(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::NoMetadata))
    }

    pub fn unsupported(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Unsupported { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Failed { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &SidecarError)> {
        self.reports.iter().filter_map(|report| match &report.outcome {
            FileOutcome::Failed { error } => Some((report.path.as_path(), error)),
            _ => None,
        })
    }

    pub fn report_for(&self, path: &Path) -> Option<&FileReport> {
        self.reports.iter().find(|report| report.path == path)
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.reports.iter().filter(|report| predicate(&report.outcome)).count()
    }
}

pub struct Scanner {
    dispatcher: Dispatcher,
    progress: Option<MultiProgress>,
}

impl Scanner {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            progress: None,
        }
    }

    /// Draws a progress bar on `multi` during scans.
    pub fn with_progress(mut self, multi: MultiProgress) -> Self {
        self.progress = Some(multi);
        self
    }

    pub fn scan(&self, root: &Path) -> Result<ScanResult, SidecarError> {
        if !root.exists() {
            return Err(SidecarError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(SidecarError::NotADirectory(root.to_path_buf()));
        }

        info!("Starting metadata scan at: {}", root.display());

        let progress = match &self.progress {
            Some(multi) => {
                let bar = multi.add(ProgressBar::new(count_files(root)));
                bar.set_style(ProgressStyle::with_template(
                    "[{percent}%] {human_pos}/{human_len} {wide_bar} ({eta} @ {per_sec})",
                )?);
                bar
            }
            None => ProgressBar::hidden(),
        };

        let mut result = ScanResult::default();
        for entry in walk_files(root) {
            let report = match entry {
                Ok(file) => {
                    let outcome = process_file(&self.dispatcher, &file);
                    FileReport {
                        path: file.path,
                        outcome,
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    warn!("Error accessing {}: {}", path.display(), e);
                    FileReport {
                        path,
                        outcome: FileOutcome::Failed { error: e.into() },
                    }
                }
            };
            result.files_scanned += 1;
            result.reports.push(report);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            "Scan completed: {} files scanned, {} sidecars written, {} without metadata, {} unsupported, {} failed",
            result.files_scanned,
            result.written(),
            result.no_metadata(),
            result.unsupported(),
            result.failed()
        );

        Ok(result)
    }
}

/// Every regular file under `root`, depth first, sorted by name within each
/// directory. Symlinks are not descended into but count when they resolve
/// to a regular file.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<MediaFile, walkdir::Error>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
                is_file.then(|| Ok(MediaFile::new(entry.into_path())))
            }
            Err(e) => Some(Err(e)),
        })
}

pub fn count_files(root: &Path) -> u64 {
    walk_files(root).count() as u64
}

/// Runs one file through extraction and, when it yields metadata, writes
/// its sidecar. Failures are contained in the returned outcome.
pub fn process_file(dispatcher: &Dispatcher, file: &MediaFile) -> FileOutcome {
    let Some((kind, extractor)) = dispatcher.route(file) else {
        info!("Unsupported file type: {}", file.dotted_extension());
        return FileOutcome::Unsupported {
            extension: file.dotted_extension(),
        };
    };

    let written = extractor.extract(&file.path).and_then(|metadata| match metadata {
        Some(metadata) => sidecar::write_sidecar(&file.path, &metadata).map(Some),
        None => Ok(None),
    });

    match written {
        Ok(sidecar) => {
            info!("Processing file: {}", file.path.display());
            match sidecar {
                Some(sidecar) => FileOutcome::Written { sidecar },
                None => FileOutcome::NoMetadata,
            }
        }
        Err(e) => {
            error!("Error processing {} file {}: {}", kind, file.path.display(), e);
            FileOutcome::Failed { error: e }
        }
    }
}
