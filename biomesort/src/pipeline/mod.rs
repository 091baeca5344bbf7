//! Screenshot classification pipeline.
//!
//! Walks a source directory of `{x}_{z}_{id}.png` screenshots, resolves the
//! classification at each position and moves the file to
//! `{output}/{category}/{id}.png`.
//!
//! # Per-file flow
//!
//! ```text
//! file ──► decode name ──► resolve ──► destination ──► disambiguate ──► place
//!              │              │
//!              ▼              ▼
//!       SkippedBadName   SkippedNoData (absent, or failed after retry)
//! ```
//!
//! Failures on one file never stop the batch. The run only aborts when the
//! source directory cannot be read, the output directory cannot be created,
//! or lookup failures exceed the configured limit.

mod placement;
mod summary;

pub use placement::move_file;
pub use summary::{PlacementOutcome, RunSummary};

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::naming::{self, ScreenshotRecord};
use crate::resolver::{Classification, Resolver};
use crate::session::{SessionConfig, SessionError, WorldSession};
use crate::store::StoreOpener;

/// Attempts at finding a free name when the chosen one is taken between
/// disambiguation and placement.
const PLACEMENT_ATTEMPTS: usize = 8;

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source directory could not be listed
    #[error("Cannot read source directory {}: {source}", path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output directory could not be created
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Too many positions could not be looked up. `summary` holds the
    /// totals up to the abort.
    #[error("Aborted after {failures} lookup failures (limit {limit})")]
    TooManyLookupFailures {
        failures: usize,
        limit: usize,
        summary: RunSummary,
    },
}

/// Errors from [`sort_screenshots`].
#[derive(Debug, Error)]
pub enum SortError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Where to read screenshots from and where to put them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Report placements without touching the filesystem
    pub dry_run: bool,
    /// Abort once lookup failures exceed this count (`None` = never)
    pub max_lookup_failures: Option<usize>,
}

impl PipelineConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            dry_run: false,
            max_lookup_failures: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_max_lookup_failures(mut self, limit: Option<usize>) -> Self {
        self.max_lookup_failures = limit;
        self
    }
}

/// Sorts screenshots into category directories using an open session.
pub struct ClassificationPipeline<'a> {
    resolver: Resolver<'a>,
    config: PipelineConfig,
    cancel: Option<Arc<AtomicBool>>,
    /// Targets handed out during a dry run
    reserved: HashSet<PathBuf>,
    summary: RunSummary,
}

impl<'a> ClassificationPipeline<'a> {
    pub fn new(session: &'a WorldSession, config: PipelineConfig) -> Self {
        Self {
            resolver: Resolver::new(session),
            config,
            cancel: None,
            reserved: HashSet::new(),
            summary: RunSummary::default(),
        }
    }

    /// Stop at the next file boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every screenshot in the source directory.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        self.summary = RunSummary::default();
        self.reserved.clear();

        if !self.config.dry_run {
            fs::create_dir_all(&self.config.output_dir).map_err(|source| {
                PipelineError::OutputDir {
                    path: self.config.output_dir.clone(),
                    source,
                }
            })?;
        }

        let files = self.list_screenshots()?;
        info!(
            source = %self.config.source_dir.display(),
            output = %self.config.output_dir.display(),
            files = files.len(),
            dry_run = self.config.dry_run,
            "Sorting screenshots"
        );

        for path in files {
            if self.is_cancelled() {
                info!("Cancellation requested, stopping before next file");
                self.summary.cancelled = true;
                break;
            }

            let outcome = self.process_file(&path);
            self.summary.record(&outcome);

            if let Some(limit) = self.config.max_lookup_failures {
                if self.summary.lookup_failures > limit {
                    error!(
                        failures = self.summary.lookup_failures,
                        limit, "Too many lookup failures, aborting run"
                    );
                    return Err(PipelineError::TooManyLookupFailures {
                        failures: self.summary.lookup_failures,
                        limit,
                        summary: self.summary.clone(),
                    });
                }
            }
        }

        info!(
            moved = self.summary.moved,
            dry_run = self.summary.dry_run,
            skipped_name = self.summary.skipped_name,
            skipped_no_data = self.summary.skipped_no_data,
            failed_placement = self.summary.failed_placement,
            lookup_failures = self.summary.lookup_failures,
            cancelled = self.summary.cancelled,
            "Run complete"
        );

        Ok(self.summary.clone())
    }

    /// Classify and place one file.
    ///
    /// Lookup failures are added to the running summary; the returned
    /// outcome is not, callers record it themselves.
    pub fn process_file(&mut self, path: &Path) -> PlacementOutcome {
        let Some(record) = naming::decode(path) else {
            info!(
                file = %display_name(path),
                "Skipping file: name is not {{x}}_{{z}}_{{id}}.png"
            );
            return PlacementOutcome::SkippedBadName;
        };

        let (Ok(x), Ok(z)) = (i32::try_from(record.x), i32::try_from(record.z)) else {
            info!(
                file = %display_name(path),
                x = record.x,
                z = record.z,
                "Skipping file: position is outside the world"
            );
            return PlacementOutcome::SkippedNoData;
        };

        let category = match self.resolver.resolve(x, z) {
            Classification::Named(name) => name,
            Classification::Absent => {
                info!(
                    file = %display_name(path),
                    x,
                    z,
                    "Skipping file: no classification data at position"
                );
                return PlacementOutcome::SkippedNoData;
            }
            Classification::Failed(kind) => {
                self.summary.lookup_failures += 1;
                warn!(
                    file = %display_name(path),
                    x,
                    z,
                    reason = %kind,
                    "Skipping file: lookup failed"
                );
                return PlacementOutcome::SkippedNoData;
            }
        };

        let base = self
            .config
            .output_dir
            .join(naming::encode(&category, &record.random_id));

        let outcome = if self.config.dry_run {
            self.plan(&base)
        } else {
            self.place(&record, &base)
        };

        match &outcome {
            PlacementOutcome::Moved(target) => info!(
                file = %display_name(path),
                target = %target.display(),
                category = %category,
                "Moved screenshot"
            ),
            PlacementOutcome::DryRun(target) => info!(
                file = %display_name(path),
                target = %target.display(),
                category = %category,
                "Dry run: would move screenshot"
            ),
            PlacementOutcome::PlacementFailed(reason) => error!(
                file = %display_name(path),
                reason = %reason,
                "Failed to place screenshot"
            ),
            _ => {}
        }

        outcome
    }

    fn plan(&mut self, base: &Path) -> PlacementOutcome {
        let reserved = &self.reserved;
        let target = naming::disambiguate_by(base, |p| {
            reserved.contains(p) || p.symlink_metadata().is_ok()
        });
        self.reserved.insert(target.clone());
        PlacementOutcome::DryRun(target)
    }

    fn place(&self, record: &ScreenshotRecord, base: &Path) -> PlacementOutcome {
        if let Some(dir) = base.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                return PlacementOutcome::PlacementFailed(format!(
                    "cannot create {}: {}",
                    dir.display(),
                    e
                ));
            }
        }

        let mut last_error = None;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let target = naming::disambiguate(base);
            match placement::move_file(&record.source, &target) {
                Ok(()) => return PlacementOutcome::Moved(target),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(target = %target.display(), "Target taken, picking another name");
                    last_error = Some(e);
                }
                Err(e) => {
                    return PlacementOutcome::PlacementFailed(format!(
                        "{} -> {}: {}",
                        record.source.display(),
                        target.display(),
                        e
                    ))
                }
            }
        }

        PlacementOutcome::PlacementFailed(match last_error {
            Some(e) => format!("no free name for {}: {}", base.display(), e),
            None => format!("no free name for {}", base.display()),
        })
    }

    fn list_screenshots(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let dir = &self.config.source_dir;
        let to_error = |source: io::Error| PipelineError::SourceDir {
            path: dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(to_error)? {
            let path = entry.map_err(to_error)?.path();
            if !naming::has_screenshot_extension(&path) {
                continue;
            }
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => debug!(file = %path.display(), error = %e, "Skipping unreadable entry"),
            }
        }
        Ok(files)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Open a session on `world`, sort the screenshots, then close the session.
///
/// The session is closed on every path. A pipeline error is reported in
/// preference to an error closing the session.
pub fn sort_screenshots(
    world: &Path,
    session_config: &SessionConfig,
    pipeline_config: PipelineConfig,
    opener: &dyn StoreOpener,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RunSummary, SortError> {
    let session = WorldSession::open(world, session_config, opener)?;

    let result = {
        let mut pipeline = ClassificationPipeline::new(&session, pipeline_config);
        if let Some(flag) = cancel {
            pipeline = pipeline.with_cancel_flag(flag);
        }
        pipeline.run()
    };

    let closed = session.close();
    let summary = result?;
    closed?;
    Ok(summary)
}
