//! Per-file outcomes and run totals.

use std::fmt;
use std::path::PathBuf;

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Moved to the given path
    Moved(PathBuf),
    /// Would have been moved to the given path
    DryRun(PathBuf),
    /// The name does not carry a position
    SkippedBadName,
    /// No classification exists at the position
    SkippedNoData,
    /// Moving the file failed
    PlacementFailed(String),
}

/// Totals for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub moved: usize,
    pub dry_run: usize,
    pub skipped_name: usize,
    pub skipped_no_data: usize,
    pub failed_placement: usize,
    /// Lookups that failed after a retry (also counted in `skipped_no_data`)
    pub lookup_failures: usize,
    /// The run stopped early on request
    pub cancelled: bool,
}

impl RunSummary {
    /// Count one file's outcome.
    pub fn record(&mut self, outcome: &PlacementOutcome) {
        match outcome {
            PlacementOutcome::Moved(_) => self.moved += 1,
            PlacementOutcome::DryRun(_) => self.dry_run += 1,
            PlacementOutcome::SkippedBadName => self.skipped_name += 1,
            PlacementOutcome::SkippedNoData => self.skipped_no_data += 1,
            PlacementOutcome::PlacementFailed(_) => self.failed_placement += 1,
        }
    }

    /// Number of files that were processed.
    pub fn processed(&self) -> usize {
        self.moved + self.dry_run + self.skipped_name + self.skipped_no_data + self.failed_placement
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Summary ---")?;
        writeln!(f, "Moved: {}", self.moved)?;
        writeln!(f, "Dry run: {}", self.dry_run)?;
        writeln!(f, "Skipped (name): {}", self.skipped_name)?;
        writeln!(f, "Skipped (nochunk): {}", self.skipped_no_data)?;
        writeln!(f, "Failed (placement): {}", self.failed_placement)?;
        write!(f, "Lookup failures: {}", self.lookup_failures)?;
        if self.cancelled {
            write!(f, "\nCancelled before all files were processed")?;
        }
        Ok(())
    }
}
