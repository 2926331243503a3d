#![warn(missing_docs)]
//! Shared test fixtures plus the JSONL sink used for conversion reports.

mod fixture;
mod report;

pub use fixture::*;
pub use report::*;
