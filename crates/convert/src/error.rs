use std::path::PathBuf;

use thiserror::Error;
use vxmesh_format::FormatError;

/// Failure converting one file, or setting up a batch run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: output would overwrite its own source", path.display())]
    OverwritesSource { path: PathBuf },
    #[error("source root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ConvertError {
    pub(crate) fn format(path: impl Into<PathBuf>, source: FormatError) -> Self {
        ConvertError::Format {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
