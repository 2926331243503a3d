//! Mapping source files under one root to outputs under another.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ConvertError;

/// Default extension of source containers.
pub const SOURCE_EXTENSION: &str = "vox";
/// Default extension of sidecar descriptions.
pub const DESCRIPTION_EXTENSION: &str = "txt";

/// One planned conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub source: PathBuf,
    /// Sidecar that may or may not exist.
    pub description: PathBuf,
    pub destination: PathBuf,
}

/// Mirrors the source tree under the destination root, swapping extensions.
#[derive(Debug, Clone)]
pub struct PathMapper {
    source_root: PathBuf,
    destination_root: PathBuf,
    source_extension: String,
    output_extension: String,
    description_extension: String,
}

impl PathMapper {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            source_extension: SOURCE_EXTENSION.to_string(),
            output_extension: output_extension.into(),
            description_extension: DESCRIPTION_EXTENSION.to_string(),
        }
    }

    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    pub fn with_description_extension(mut self, extension: impl Into<String>) -> Self {
        self.description_extension = extension.into();
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Exact, case-sensitive extension match. Each source stem then maps to
    /// one destination, so no two jobs write the same file.
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.source_extension)
    }

    /// Job for a source file located under the source root.
    pub fn job_for(&self, source: &Path) -> ConversionJob {
        let relative = source.strip_prefix(&self.source_root).unwrap_or(source);
        let mut destination = self.destination_root.join(relative);
        destination.set_extension(&self.output_extension);
        let mut description = source.to_path_buf();
        description.set_extension(&self.description_extension);

        ConversionJob {
            source: source.to_path_buf(),
            description,
            destination,
        }
    }

    /// Every source file under the root, sorted by path.
    pub fn plan(&self) -> Result<Vec<ConversionJob>, ConvertError> {
        if !self.source_root.is_dir() {
            return Err(ConvertError::NotADirectory(self.source_root.clone()));
        }

        let mut jobs = Vec::new();
        for entry in WalkDir::new(&self.source_root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| ConvertError::Walk {
                path: err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.source_root.clone()),
                message: err.to_string(),
            })?;
            if entry.file_type().is_file() && self.is_source(entry.path()) {
                jobs.push(self.job_for(entry.path()));
            }
        }
        Ok(jobs)
    }
}
