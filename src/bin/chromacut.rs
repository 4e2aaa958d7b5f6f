use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chromacut::{
    AuditEngine, AuditOptions, BuildOptions, BuildReport, BuildScheduler, ChromacutError,
    ConfigDefaults, ConfigStore, Correction, OverflowDetector, OverflowOptions,
};

#[derive(Parser, Debug)]
#[command(name = "chromacut", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate stale transparent cut-outs and paper composites.
    Build(BuildArgs),
    /// Regenerate every transparent cut-out, without paper composites.
    Cutout(CutoutArgs),
    /// Print a Markdown quality report of the cut-outs.
    Audit(AuditArgs),
    /// Flag composites bleeding off the paper and shrink their scale.
    Overflow(OverflowArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Blue-screen source directory.
    #[arg(short = 'i', long, default_value = "icons/blue")]
    input: PathBuf,

    /// Transparent cut-out output directory.
    #[arg(short = 't', long, default_value = "icons/transparent")]
    transparent: PathBuf,

    /// Paper composite output directory.
    #[arg(short = 'p', long, default_value = "icons/paper")]
    paper: PathBuf,

    /// Paper backing template.
    #[arg(long, default_value = "icons/raw/paper/paper-base.png")]
    backing: PathBuf,

    /// Default `paper_alpha` for sidecars that do not set one.
    #[arg(long, default_value_t = ConfigDefaults::default().paper_alpha)]
    paper_alpha: f64,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct CutoutArgs {
    /// Blue-screen source directory.
    #[arg(short = 'i', long, default_value = "icons/blue")]
    input: PathBuf,

    /// Transparent cut-out output directory.
    #[arg(short = 'o', long, default_value = "icons/transparent")]
    output: PathBuf,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(clap::Args, Debug)]
struct ThreadingArgs {
    /// Process assets in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct AuditArgs {
    /// Blue-screen source directory.
    #[arg(short = 'i', long, default_value = "icons/blue")]
    input: PathBuf,

    /// Transparent cut-out directory.
    #[arg(short = 'o', long, default_value = "icons/transparent")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct OverflowArgs {
    /// Paper composite directory to scan.
    #[arg(short = 'p', long, default_value = "icons/paper")]
    paper: PathBuf,

    /// Blue-screen source directory holding the sidecars.
    #[arg(short = 'i', long, default_value = "icons/blue")]
    input: PathBuf,

    /// Paper backing template.
    #[arg(long, default_value = "icons/raw/paper/paper-base.png")]
    backing: PathBuf,

    /// Safe-area erosion in pixels.
    #[arg(long, default_value_t = 20)]
    margin: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Cutout(args) => cmd_cutout(args),
        Command::Audit(args) => cmd_audit(args),
        Command::Overflow(args) => cmd_overflow(args),
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let defaults = ConfigDefaults {
        paper_alpha: args.paper_alpha,
        ..ConfigDefaults::default()
    };
    defaults.validate().context("--paper-alpha")?;
    let store = ConfigStore::new(defaults);
    let opts = BuildOptions {
        source_root: args.input,
        transparent_root: args.transparent,
        paper_root: Some(args.paper),
        backing_path: args.backing,
        force: false,
        parallel: args.threading.parallel,
        threads: args.threading.threads,
    };
    let report = BuildScheduler::new(opts, &store)
        .run()
        .context("build run")?;
    print_build_summary(&report);
    Ok(())
}

fn cmd_cutout(args: CutoutArgs) -> anyhow::Result<()> {
    let store = ConfigStore::default();
    let opts = BuildOptions {
        source_root: args.input,
        transparent_root: args.output,
        paper_root: None,
        force: true,
        parallel: args.threading.parallel,
        threads: args.threading.threads,
        ..BuildOptions::default()
    };
    let report = BuildScheduler::new(opts, &store)
        .run()
        .context("cut-out run")?;
    print_build_summary(&report);
    Ok(())
}

fn cmd_audit(args: AuditArgs) -> anyhow::Result<()> {
    let records = AuditEngine::new(AuditOptions {
        source_root: args.input,
        transparent_root: args.output,
    })
    .run()
    .context("audit run")?;
    print!("{}", chromacut::render_markdown(&records));
    Ok(())
}

fn cmd_overflow(args: OverflowArgs) -> anyhow::Result<()> {
    let store = ConfigStore::default();
    let opts = OverflowOptions {
        paper_root: args.paper,
        source_root: args.input,
        backing_path: args.backing,
        margin: args.margin,
        ..OverflowOptions::default()
    };
    let report = match OverflowDetector::new(opts, &store).run() {
        Ok(report) => report,
        Err(e @ ChromacutError::MissingDependency(_)) => {
            tracing::error!(error = %e, "overflow scan not possible");
            return Ok(());
        }
        Err(e) => return Err(anyhow::Error::new(e).context("overflow run")),
    };

    println!("Found {} images needing adjustment:", report.flagged.len());
    for finding in &report.flagged {
        let sidecar = finding
            .sidecar
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            "[OVERFLOW] {} ({} pixels) -> Config: {sidecar}",
            finding.composite.display(),
            finding.overflow_pixels
        );
        match &finding.correction {
            Correction::Applied { to, .. } => println!("  -> Updated to scale {to}"),
            Correction::AlreadyWithinTarget { current } => {
                println!("  -> Skipping update, current {current} already within target")
            }
            Correction::NoSidecar => {}
            Correction::Failed(e) => println!("  -> Failed: {e}"),
        }
    }
    Ok(())
}

fn print_build_summary(report: &BuildReport) {
    eprintln!(
        "{} assets: {} cut-outs regenerated, {} reused; {} composites regenerated, {} reused, {} skipped; {} failed",
        report.assets,
        report.cutouts_regenerated,
        report.cutouts_reused,
        report.composites_regenerated,
        report.composites_reused,
        report.composites_skipped,
        report.failures.len()
    );
}
