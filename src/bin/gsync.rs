use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use golf_sync::cli::{self, ClearMode, ImportConfig};
use golf_sync::entity::EntityKind;
use golf_sync::util::env;
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(name = "gsync", version, about = "Golf data importer for the Convex backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct Common {
    /// Records per remote call (defaults to the entity's fixed size)
    #[arg(long)]
    batch_size: Option<NonZeroUsize>,
    /// Remote endpoint; takes precedence over NEXT_PUBLIC_CONVEX_URL / CONVEX_URL
    #[arg(long)]
    convex_url: Option<String>,
    /// Skip the read-only reporting queries
    #[arg(long, default_value_t = false)]
    no_stats: bool,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Import tournament schedules and results from the scraped JSON file
    Tournaments {
        /// Path to the schedules JSON
        #[arg(long)]
        input: Option<PathBuf>,
        /// Only import these seasons (repeatable)
        #[arg(long = "year")]
        years: Vec<i64>,
        /// Delete existing tournaments first, without asking
        #[arg(long, conflicts_with = "keep")]
        clear: bool,
        /// Never delete existing tournaments
        #[arg(long)]
        keep: bool,
        /// Run the remote fix-up pass after importing
        #[arg(long, default_value_t = false)]
        fix_up: bool,
        #[command(flatten)]
        common: Common,
    },
    /// Patch player biographies from the bios CSV
    PlayerBios {
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        common: Common,
    },
    /// Update player photos and world rankings from the photos CSV
    PlayerPhotos {
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        common: Common,
    },
}

fn config_for(command: Commands) -> ImportConfig {
    let (mut cfg, common) = match command {
        Commands::Tournaments {
            input,
            years,
            clear,
            keep,
            fix_up,
            common,
        } => {
            let mut cfg = ImportConfig::new(EntityKind::Tournament);
            cfg.input = input;
            cfg.years = years;
            cfg.fix_up = fix_up;
            cfg.clear = match (clear, keep) {
                (true, _) => ClearMode::Always,
                (_, true) => ClearMode::Never,
                _ => ClearMode::Ask,
            };
            (cfg, common)
        }
        Commands::PlayerBios { input, common } => {
            let mut cfg = ImportConfig::new(EntityKind::PlayerBio);
            cfg.input = input;
            (cfg, common)
        }
        Commands::PlayerPhotos { input, common } => {
            let mut cfg = ImportConfig::new(EntityKind::PlayerPhoto);
            cfg.input = input;
            (cfg, common)
        }
    };
    cfg.batch_size = common.batch_size;
    cfg.convex_url = common.convex_url;
    cfg.no_stats = common.no_stats;
    cfg
}

#[tokio::main]
async fn main() -> ExitCode {
    env::bootstrap_cli("gsync");
    if let Err(e) = golf_sync::tracing::init_tracing("info") {
        eprintln!("{e}");
    }

    let cli = Cli::parse();
    let mut cfg = config_for(cli.command);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing the current batch");
            flag.store(true, Ordering::SeqCst);
        }
    });
    cfg.stop = Some(stop);

    match cli::import::run(cfg).await {
        Ok(report) if report.interrupted() => ExitCode::from(130),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "import failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
