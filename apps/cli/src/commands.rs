//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use nbcookbook_engine::{
    BuildProgress, BuildSummary, Builder, HookRegistry,
};
use nbcookbook_enrich::Enricher;
use nbcookbook_index::populate_context;
use nbcookbook_shared::{
    AppConfig, Docname, SetupConfig, init_config_at, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nbcookbook — build enriched documentation from tutorial notebooks.
#[derive(Parser)]
#[command(
    name = "nbcookbook",
    version,
    about = "Enrich tutorial notebooks with setup cells and a build-wide tag index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a build over the source tree.
    Build {
        /// Source directory (defaults to the config's `build.source_dir`).
        #[arg(short, long)]
        source: Option<String>,

        /// Output directory (defaults to the config's `build.output_dir`).
        #[arg(short, long)]
        out: Option<String>,

        /// Config file path (defaults to `./nbcookbook.toml`).
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Write a default `nbcookbook.toml` into a directory.
    Init {
        /// Target directory (defaults to the current directory).
        #[arg(default_value = ".")]
        dir: String,
    },

    /// Remove the build output directory.
    Clean {
        /// Output directory (defaults to the config's `build.output_dir`).
        #[arg(short, long)]
        out: Option<String>,

        /// Config file path (defaults to `./nbcookbook.toml`).
        #[arg(short, long)]
        config: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nbcookbook=info",
        1 => "nbcookbook=debug",
        _ => "nbcookbook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            source,
            out,
            config,
        } => cmd_build(source.as_deref(), out.as_deref(), config.as_deref()),
        Command::Init { dir } => cmd_init(&dir),
        Command::Clean { out, config } => cmd_clean(out.as_deref(), config.as_deref()),
    }
}

fn load(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(Path::new(path))?,
        None => load_config(Path::new("."))?,
    };
    Ok(config)
}

fn cmd_build(source: Option<&str>, out: Option<&str>, config_path: Option<&str>) -> Result<()> {
    let config = load(config_path)?;
    let source_dir = PathBuf::from(source.unwrap_or(&config.build.source_dir));
    let output_dir = PathBuf::from(out.unwrap_or(&config.build.output_dir));
    let setup = SetupConfig::from(&config);

    info!(
        source = %source_dir.display(),
        output = %output_dir.display(),
        "starting nbcookbook build"
    );

    let builder = Builder::new(&source_dir, &output_dir, env!("CARGO_PKG_VERSION"));
    let build_env = builder.env();

    let enricher = Arc::new(Enricher::new(&source_dir, &output_dir, setup));
    let mut registry = HookRegistry::new();
    registry.connect_source_read(enricher.clone());
    registry.connect_doc_purged(enricher);
    registry.connect_page_context_fn(move |page, context| {
        populate_context(page, &build_env.tag_index, &build_env.titles(), context)
    });

    let progress = CliProgress::new();
    let summary = builder.run(&registry, &progress)?;

    println!(
        "Built {} documents ({} notebooks, {} changed, {} purged, {} tags) in {:.1?}",
        summary.documents,
        summary.notebooks,
        summary.changed,
        summary.purged,
        summary.tags,
        summary.elapsed,
    );
    Ok(())
}

fn cmd_init(dir: &str) -> Result<()> {
    let path = init_config_at(Path::new(dir))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_clean(out: Option<&str>, config_path: Option<&str>) -> Result<()> {
    let config = load(config_path)?;
    let output_dir = PathBuf::from(out.unwrap_or(&config.build.output_dir));

    match std::fs::remove_dir_all(&output_dir) {
        Ok(()) => {
            println!("Removed {}", output_dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("Nothing to clean at {}", output_dir.display());
            Ok(())
        }
        Err(e) => Err(nbcookbook_shared::NbcookbookError::io(output_dir, e).into()),
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl BuildProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn doc_read(&self, docname: &Docname, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Reading [{current}/{total}] {docname}"));
    }

    fn done(&self, _summary: &BuildSummary) {
        self.spinner.finish_and_clear();
    }
}
