//! Document download module
//!
//! This module saves registry documents to disk:
//! - Sanitizing untrusted file names into a single path component
//! - Skipping documents whose destination already exists
//! - Streaming the response body chunk by chunk into a `.part` file
//! - Renaming the finished file onto its destination
//!
//! The destination's existence is the only idempotence check. A download
//! that fails midway leaves its `.part` file behind, which is never mistaken
//! for a finished document and is overwritten by the next attempt.

mod downloader;

pub use downloader::{destination_path, partial_path, DownloadOutcome, Downloader};
