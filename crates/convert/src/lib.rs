//! Conversion pipeline: one source file through reader, culler and encoder,
//! and a batch driver that runs it over a directory tree.

mod batch;
mod error;
mod paths;
mod processor;

pub use batch::*;
pub use error::*;
pub use paths::*;
pub use processor::*;
