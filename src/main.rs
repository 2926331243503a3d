use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use vxmesh_convert::{BatchDriver, BatchSummary, ConvertOptions, FrameProcessor, PathMapper};
use vxmesh_core::OptimizationLevel;
use vxmesh_format::{decode_mesh, DecodedMesh, MeshVariant};
use vxmesh_testkit::JsonlSink;

mod config;

use config::{ConverterConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about = "Voxel scene to engine mesh converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every source container under a directory
    Convert(ConvertArgs),
    /// Decode an emitted mesh and print a summary
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Directory containing source containers
    #[arg(short, long)]
    src: PathBuf,

    /// Directory to write meshes to (mirrors the source tree)
    #[arg(short, long)]
    dst: PathBuf,

    /// Optimization level 0-2
    #[arg(short, long)]
    opt: Option<u8>,

    /// Output layout
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Worker threads (0 = one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write a JSONL conversion report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Converter config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Mesh file to decode
    file: PathBuf,

    /// Layout of the file; inferred from its extension when omitted
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Print the decoded mesh as JSON
    #[arg(long)]
    json: bool,

    /// Converter config file (for extension inference)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Animated,
    Static,
}

impl From<VariantArg> for MeshVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Animated => MeshVariant::Animated,
            VariantArg::Static => MeshVariant::Static,
        }
    }
}

fn main() -> Result<()> {
    // Info by default; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Convert(args) => run_convert(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let mut cfg = ConverterConfig::load_from_path(&args.config);
    if let Some(level) = args.opt {
        cfg.optimization = OptimizationLevel::try_from(level)?;
    }
    if let Some(variant) = args.variant {
        cfg.variant = variant.into();
    }
    if let Some(jobs) = args.jobs {
        cfg.jobs = jobs;
    }
    info!(
        "Converting {} -> {} ({}, level {})",
        args.src.display(),
        args.dst.display(),
        cfg.variant.as_str(),
        cfg.optimization.as_u8()
    );

    let mapper = PathMapper::new(&args.src, &args.dst, cfg.output_extension(cfg.variant))
        .with_source_extension(cfg.source_extension.as_str())
        .with_description_extension(cfg.description_extension.as_str());
    let processor = FrameProcessor::new(ConvertOptions {
        variant: cfg.variant,
        optimization: cfg.optimization,
        bounds_policy: cfg.bounds_policy,
    });
    let summary = BatchDriver::new(mapper, processor)
        .with_jobs(cfg.jobs)
        .run()
        .with_context(|| format!("Failed to convert {}", args.src.display()))?;

    if let Some(report) = &args.report {
        write_report(report, &summary, &cfg)?;
    }

    println!(
        "Converted {} files ({} failed, {} voxels written)",
        summary.converted(),
        summary.failed(),
        summary.total_voxels()
    );
    Ok(())
}

fn write_report(path: &Path, summary: &BatchSummary, cfg: &ConverterConfig) -> Result<()> {
    let mut sink = JsonlSink::create(path)?;
    for metric in summary.metrics(cfg.variant.as_str(), cfg.optimization.as_u8()) {
        sink.write(&metric)?;
    }
    sink.write(&summary.batch_metric())?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let variant = match args.variant {
        Some(variant) => variant.into(),
        None => {
            let cfg = ConverterConfig::load_from_path(&args.config);
            infer_variant(&args.file, &cfg)
        }
    };
    let bytes =
        fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mesh = decode_mesh(&bytes, variant)
        .with_context(|| format!("Failed to decode {} as {}", args.file.display(), variant.as_str()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mesh)?);
    } else {
        print_summary(&args.file, &mesh);
    }
    Ok(())
}

fn infer_variant(path: &Path, cfg: &ConverterConfig) -> MeshVariant {
    let is_static = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(&cfg.static_extension));
    if is_static {
        MeshVariant::Static
    } else {
        MeshVariant::Animated
    }
}

fn print_summary(path: &Path, mesh: &DecodedMesh) {
    println!("{}", path.display());
    println!("  variant:     {}", mesh.variant.as_str());
    println!("  bounds:      {}", mesh.bounds);
    println!("  frames:      {}", mesh.frames.len());
    for (index, count) in mesh.voxel_counts().iter().enumerate() {
        println!("    frame {index}: {count} voxels");
    }
    if !mesh.description.is_empty() {
        println!("  description:");
        for line in mesh.description.lines() {
            println!("    {line}");
        }
    }
}
