//! Crawl state tracking module
//!
//! This module defines how a paginated listing walk ended. Listing failures
//! are soft: the walk returns what it gathered along with a [`Termination`]
//! so callers can tell "last page reached" apart from "gave up early".

mod termination;

pub use termination::Termination;
