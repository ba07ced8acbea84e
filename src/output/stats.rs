//! Run statistics
//!
//! A [`HarvestStats`] is filled in while a harvest runs and printed at the
//! end. Nothing is persisted between runs.

use crate::download::DownloadOutcome;
use crate::state::Termination;
use chrono::{DateTime, Utc};

/// Counters for one harvest run
#[derive(Debug, Clone)]
pub struct HarvestStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// How the result listing walk ended (search or project list)
    pub listing_termination: Option<Termination>,

    /// Result pages read
    pub listing_pages: u32,

    /// Projects to visit (search results or selected list rows)
    pub projects: u64,

    /// Projects whose detail page or folder could not be handled
    pub failed_projects: u64,

    /// Procedure pages walked
    pub procedure_pages: u64,

    /// Procedure walks that stopped before their last page
    pub truncated_procedures: u64,

    pub documents_found: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub bytes_written: u64,
}

impl HarvestStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listing_termination: None,
            listing_pages: 0,
            projects: 0,
            failed_projects: 0,
            procedure_pages: 0,
            truncated_procedures: 0,
            documents_found: 0,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            bytes_written: 0,
        }
    }

    /// Counts one successful save or skip
    pub fn record_outcome(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved { bytes, .. } => {
                self.downloaded += 1;
                self.bytes_written += bytes;
            }
            DownloadOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Counts one procedure walk
    pub fn record_procedure(&mut self, pages: u32, documents: usize, termination: &Termination) {
        self.procedure_pages += u64::from(pages);
        self.documents_found += documents as u64;
        if termination.is_truncated() {
            self.truncated_procedures += 1;
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Elapsed seconds, once the run has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Documents accounted for, whichever way they went
    pub fn documents_handled(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }
}

impl Default for HarvestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStats) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Listing:");
    println!("  Pages read: {}", stats.listing_pages);
    if let Some(termination) = &stats.listing_termination {
        println!("  Stopped: {}", termination);
    }
    println!("  Projects: {}", stats.projects);
    if stats.failed_projects > 0 {
        println!("  Projects failed: {}", stats.failed_projects);
    }
    println!();

    println!("Documents:");
    println!("  Procedure pages: {}", stats.procedure_pages);
    if stats.truncated_procedures > 0 {
        println!("  Procedures cut short: {}", stats.truncated_procedures);
    }
    println!("  Found: {}", stats.documents_found);
    println!("  Downloaded: {}", stats.downloaded);
    println!("  Already on disk: {}", stats.skipped);
    println!("  Failed: {}", stats.failed);
    println!("  Bytes written: {}", stats.bytes_written);
    println!();

    let handled = stats.documents_handled();
    let success_rate = if handled > 0 {
        ((stats.downloaded + stats.skipped) as f64 / handled as f64) * 100.0
    } else {
        0.0
    };
    println!("Success Rate: {:.1}%", success_rate);
}
