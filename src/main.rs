use clap::{Parser, Subcommand};
use folio_gal::config::{self, GalleryConfig, SiteLayout};
use folio_gal::watch::{ChildProcessRunner, EventStream, GalleryWatcher, WatchMessage};
use folio_gal::{gallery, output, raw, watch};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio-gal")]
#[command(about = "Paginated gallery maintenance for a static photo portfolio")]
#[command(long_about = "\
Paginated gallery maintenance for a static photo portfolio

Every image under the asset directory becomes a gallery tile. The first page
is spliced into the hand-written root page between two markers; later pages
are written as standalone files next to a JSON manifest.

Project structure (defaults):

  project/
  ├── folio.toml                   # Optional overrides (see gen-config)
  ├── index.html                   # Root page, page 1 spliced between markers
  └── dist/
      ├── assets/                  # Scanned recursively for images
      │   └── raw/                 # <name>_before.jpg / <name>_after.jpg pairs
      │       └── raw-config.json  # Written by raw-sync / raw-watch
      ├── gallery_page_2.html      # Written by update
      └── gallery-info.json        # Written by update

Set RUST_LOG to change log verbosity (default: info).

Run 'folio-gal gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Project root; all configured paths are relative to it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate the root page region, page files and gallery manifest
    Update,
    /// Update once, then re-run update whenever images change
    Watch,
    /// Rebuild raw-config.json from before/after pairs
    RawSync,
    /// Sync raw pairs once, then again on every .jpg change
    RawWatch,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Update => {
            let config = config::load_config(&cli.root)?;
            let layout = SiteLayout::new(&cli.root, &config);
            let outcome = gallery::update_gallery(&cli.root, &config)?;
            output::print_update_outcome(&outcome, &layout);
        }
        Command::Watch => {
            let config = config::load_config(&cli.root)?;
            run_watch(&cli.root, config)?;
        }
        Command::RawSync => {
            let config = config::load_config(&cli.root)?;
            let dir = cli.root.join(&config.raw.dir);
            let manifest = raw::sync_raw_pairs(&dir, &config.raw)?;
            output::print_raw_manifest(&manifest);
        }
        Command::RawWatch => {
            let config = config::load_config(&cli.root)?;
            let dir = cli.root.join(&config.raw.dir);
            let manifest = raw::sync_raw_pairs(&dir, &config.raw)?;
            output::print_raw_manifest(&manifest);

            let mut events = EventStream::new();
            install_shutdown_handler(&events)?;
            events.watch(&dir, false)?;
            watch::run_raw_watch(&mut events, &dir, &config.raw);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Watch the asset tree and re-run `update` in a child process.
fn run_watch(root: &Path, config: GalleryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let layout = SiteLayout::new(root, &config);
    if !layout.assets_dir.is_dir() {
        return Err(gallery::GalleryError::MissingAssets(layout.assets_dir).into());
    }

    let runner = ChildProcessRunner::new(
        std::env::current_exe()?,
        vec!["--root".into(), root.as_os_str().to_owned(), "update".into()],
        std::env::current_dir()?,
    )?;

    let mut events = EventStream::new();
    install_shutdown_handler(&events)?;

    info!(
        "Watching {} (delay {} ms)",
        layout.assets_dir.display(),
        config.watch.delay_ms
    );
    let mut watcher = GalleryWatcher::new(runner, config);
    watcher.start(&mut events, &layout.assets_dir)?;
    info!("Watcher stopped");
    Ok(())
}

/// Turn SIGINT/SIGTERM into a `Shutdown` message on `events`.
fn install_shutdown_handler(events: &EventStream) -> Result<(), ctrlc::Error> {
    let tx = events.sender();
    ctrlc::set_handler(move || {
        let _ = tx.send(WatchMessage::Shutdown);
    })
}
