use clap::{Parser, Subcommand};
use mediasize::config::{self, MediaConfig};
use mediasize::directive;
use mediasize::imaging::{RustBackend, supported_input_extensions};
use mediasize::media::FsMediaStore;
use mediasize::output;
use mediasize::pipeline::Pipeline;
use mediasize::presets::preset_sizes;
use mediasize::store::{CachedRepository, FileRepository, IndexRepository, StoredFile};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use walkdir::WalkDir;

type MediaPipeline = Pipeline<CachedRepository<IndexRepository>, FsMediaStore, RustBackend>;

fn version_string() -> &'static str {
    if env!("MEDIASIZE_RELEASE") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("MEDIASIZE_GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "mediasize")]
#[command(about = "On-demand image derivatives from size directives in URLs")]
#[command(long_about = "\
On-demand image derivatives from size directives in URLs

Originals are stored once. Resized variants are requested by naming them:

  media/photo.jpg          stored original
  media/photo_w480.jpg     fit to 480px wide
  media/photo_h64.jpg      fit to 64px tall

Derivatives never upscale and keep the original's aspect ratio. JPEG stays
JPEG, PNG stays PNG, GIF becomes PNG, anything else becomes JPEG.

Run 'mediasize gen-config' to generate a documented mediasize.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "mediasize.toml", global = true)]
    config: PathBuf,

    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the stored original a URL refers to
    Resolve { url: String },
    /// Produce the derivatives the given URLs ask for
    Serve {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Record originals (files or directories under the originals root)
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List the preset sizes
    Presets,
    /// Produce every preset derivative for every stored original
    Warm,
    /// Print a stock mediasize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Presets => print_lines(output::format_presets(preset_sizes())),
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        Command::Resolve { url } => {
            let pipeline = build_pipeline(&config::load_config(&cli.config)?)?;
            let file = pipeline.resolve_original(&url);
            print_lines(output::format_resolved(&url, file.as_ref()));
            if file.is_none() {
                std::process::exit(1);
            }
        }
        Command::Serve { urls } => {
            let pipeline = build_pipeline(&config::load_config(&cli.config)?)?;
            let mut failed = 0;
            for url in &urls {
                match pipeline.serve(url) {
                    Ok(served) => print_lines(output::format_served(url, served.as_ref())),
                    Err(e) => {
                        failed += 1;
                        print_lines(output::format_serve_failed(url, &e));
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} of {} requests failed", urls.len()).into());
            }
        }
        Command::Ingest { paths } => {
            let pipeline = build_pipeline(&config::load_config(&cli.config)?)?;
            ingest(&pipeline, &paths)?;
        }
        Command::Warm => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let pipeline = build_pipeline(&config)?;
            print_lines(output::format_warmed(&pipeline.warm(preset_sizes())));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "mediasize=debug"
    } else {
        "mediasize=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn build_pipeline(config: &MediaConfig) -> Result<MediaPipeline, Box<dyn std::error::Error>> {
    let index = IndexRepository::load(&config.storage.index)?;
    let media = FsMediaStore::new(&config.storage.originals, &config.storage.derivatives);
    Ok(Pipeline::new(
        CachedRepository::new(index),
        media,
        RustBackend::new(),
    ))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

/// Ingest everything under `paths`, persist the index, and report.
fn ingest(pipeline: &MediaPipeline, paths: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let (accepted, rejected) = ingest_walk(pipeline, paths);

    let index = pipeline.repository().inner();
    index.flush()?;
    info!(path = %index.path().display(), records = index.all().len(), "index written");
    print_lines(output::format_ingested(&accepted, &rejected));
    Ok(())
}

/// Walk `paths` and ingest every decodable original under the originals
/// root. Failures are collected per file and never stop the walk.
fn ingest_walk(pipeline: &MediaPipeline, paths: &[PathBuf]) -> (Vec<StoredFile>, Vec<String>) {
    let root = pipeline.media().originals_root();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for path in paths {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "walk failed");
                    rejected.push(e.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() || !has_supported_extension(entry.path()) {
                continue;
            }
            let Some(location) = location_under(root, entry.path()) else {
                rejected.push(format!(
                    "{}: not under {}",
                    entry.path().display(),
                    root.display()
                ));
                continue;
            };
            if directive::parse(&location).directive.is_some() {
                debug!(location, "skipping derivative");
                continue;
            }

            let bytes = match std::fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    rejected.push(format!("{}: {e}", entry.path().display()));
                    continue;
                }
            };
            match pipeline.ingest(&location, &bytes) {
                Ok(file) => accepted.push(file),
                Err(e) => {
                    warn!(location, error = %e, "upload rejected");
                    rejected.push(e.to_string());
                }
            }
        }
    }

    (accepted, rejected)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// `/`-separated location of `path` relative to `root`. `.` segments are
/// ignored on both sides.
fn location_under(root: &Path, path: &Path) -> Option<String> {
    let normalize = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    let path = normalize(path);
    let relative = path.strip_prefix(normalize(root)).ok()?;
    let parts: Option<Vec<&str>> = relative.iter().map(|p| p.to_str()).collect();
    Some(parts?.join("/"))
}
