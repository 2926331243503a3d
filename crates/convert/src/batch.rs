//! Directory-level driver: plan, convert in parallel, write, summarize.

use std::fs;
use std::io;
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};
use vxmesh_testkit::{BatchMetric, ConversionMetric, ConversionStatus};

use crate::{ConversionJob, ConvertError, ConvertedMesh, FrameProcessor, PathMapper};

/// What was written for one successful job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenMesh {
    pub voxel_counts: Vec<usize>,
    pub output_bytes: usize,
    /// Hex blake3 digest of the written bytes.
    pub hash: String,
}

impl WrittenMesh {
    fn from_mesh(mesh: &ConvertedMesh) -> Self {
        Self {
            voxel_counts: mesh.voxel_counts.clone(),
            output_bytes: mesh.bytes.len(),
            hash: blake3::hash(&mesh.bytes).to_hex().to_string(),
        }
    }
}

/// Outcome of one job.
#[derive(Debug)]
pub struct FileOutcome {
    pub job: ConversionJob,
    pub result: Result<WrittenMesh, ConvertError>,
}

impl FileOutcome {
    pub fn is_converted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of a batch run, in plan order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    /// Voxels written across every converted file and frame.
    pub fn total_voxels(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|written| written.voxel_counts.iter().sum::<usize>())
            .sum()
    }

    /// One report record per file.
    pub fn metrics(&self, variant: &str, optimization: u8) -> Vec<ConversionMetric> {
        self.outcomes
            .iter()
            .map(|outcome| {
                let base = ConversionMetric {
                    source: outcome.job.source.display().to_string(),
                    destination: outcome.job.destination.display().to_string(),
                    variant: variant.to_string(),
                    optimization,
                    status: ConversionStatus::Failed,
                    voxel_counts: Vec::new(),
                    output_bytes: 0,
                    hash: None,
                    error: None,
                };
                match &outcome.result {
                    Ok(written) => ConversionMetric {
                        status: ConversionStatus::Converted,
                        voxel_counts: written.voxel_counts.clone(),
                        output_bytes: written.output_bytes,
                        hash: Some(written.hash.clone()),
                        ..base
                    },
                    Err(err) => ConversionMetric {
                        error: Some(err.to_string()),
                        ..base
                    },
                }
            })
            .collect()
    }

    /// Closing summary record.
    pub fn batch_metric(&self) -> BatchMetric {
        BatchMetric::now(self.converted(), self.failed(), self.total_voxels())
    }
}

/// Converts every source under a root, one independent job per file.
#[derive(Debug, Clone)]
pub struct BatchDriver {
    mapper: PathMapper,
    processor: FrameProcessor,
    jobs: usize,
}

impl BatchDriver {
    pub fn new(mapper: PathMapper, processor: FrameProcessor) -> Self {
        Self {
            mapper,
            processor,
            jobs: 0,
        }
    }

    /// Worker threads; 0 lets rayon decide.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Plan and convert. Only setup problems are returned as errors; per-file
    /// failures are logged and recorded in the summary.
    pub fn run(&self) -> Result<BatchSummary, ConvertError> {
        let plan = self.mapper.plan()?;
        info!(
            source = %self.mapper.source_root().display(),
            destination = %self.mapper.destination_root().display(),
            files = plan.len(),
            variant = self.processor.options().variant.as_str(),
            "starting batch"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;
        let outcomes: Vec<FileOutcome> = pool.install(|| {
            plan.into_par_iter()
                .map(|job| self.convert_job(job))
                .collect()
        });

        let summary = BatchSummary { outcomes };
        info!(
            converted = summary.converted(),
            failed = summary.failed(),
            voxels = summary.total_voxels(),
            "batch finished"
        );
        Ok(summary)
    }

    /// Convert a single job, logging its outcome.
    pub fn convert_job(&self, job: ConversionJob) -> FileOutcome {
        let result = self.try_convert(&job);
        match &result {
            Ok(written) => info!(
                source = %job.source.display(),
                destination = %job.destination.display(),
                frames = written.voxel_counts.len(),
                bytes = written.output_bytes,
                "converted"
            ),
            Err(err) => warn!(source = %job.source.display(), error = %err, "skipped"),
        }
        FileOutcome { job, result }
    }

    fn try_convert(&self, job: &ConversionJob) -> Result<WrittenMesh, ConvertError> {
        if same_file(&job.destination, &job.source) {
            return Err(ConvertError::OverwritesSource {
                path: job.source.clone(),
            });
        }

        let source = fs::read(&job.source).map_err(|err| ConvertError::io(&job.source, err))?;
        let description = read_sidecar(&job.description)?;
        let mesh = self
            .processor
            .process(&source, description.as_deref())
            .map_err(|err| ConvertError::format(&job.source, err))?;

        if let Some(parent) = job.destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
            }
        }
        fs::write(&job.destination, &mesh.bytes)
            .map_err(|err| ConvertError::io(&job.destination, err))?;
        Ok(WrittenMesh::from_mesh(&mesh))
    }
}

/// True when both paths name the same file, however they are spelled.
fn same_file(a: &Path, b: &Path) -> bool {
    a == b
        || matches!(
            (fs::canonicalize(a), fs::canonicalize(b)),
            (Ok(a), Ok(b)) if a == b
        )
}

/// A missing sidecar means "no description".
fn read_sidecar(path: &Path) -> Result<Option<Vec<u8>>, ConvertError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ConvertError::io(path, err)),
    }
}
