//! zsnap - Entry Point

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use zsnap::config::{KeyBindings, ResolvedConfig};
use zsnap::executor::{ActionExecutor, ExecutorSettings};
use zsnap::inventory::InventoryService;
use zsnap::model::{AppError, RegistryError};
use zsnap::registry::TargetRegistry;
use zsnap::session::Session;
use zsnap::state::AppState;
use zsnap::view::ColorConfig;
use zsnap::zfs::ZfsCli;

/// Initial page size; replaced by the terminal height before the first draw.
const INITIAL_PAGE_SIZE: usize = 20;

/// zsnap - browse, mount, diff, send and delete ZFS snapshots
#[derive(Parser, Debug)]
#[command(name = "zsnap")]
#[command(version)]
#[command(about = "TUI application for browsing and managing ZFS snapshots")]
pub struct Args {
    /// Pools to list (all pools if none are given)
    pub pools: Vec<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the remote target registry
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Run privileged zfs commands through sudo
    #[arg(long)]
    pub sudo: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "zsnap exited with an error");
            eprintln!("zsnap: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = zsnap::config::load_config_with_precedence(args.config.clone())?;
        let merged = zsnap::config::merge_config(config_file);
        let with_env = zsnap::config::apply_env_overrides(merged);
        let sudo_override = if args.sudo { Some(true) } else { None };
        zsnap::config::apply_cli_overrides(
            with_env,
            args.pools.clone(),
            args.registry.clone(),
            sudo_override,
        )
    };

    zsnap::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    // A corrupt registry stops here, before the terminal is taken over, so the
    // file is never overwritten by a later add.
    let session = build_session(&config)?;

    let colors = ColorConfig::from_env_and_args(args.no_color);
    zsnap::view::run(session, KeyBindings::default(), colors)?;

    info!("Exiting");
    Ok(())
}

/// Assemble the session from resolved configuration.
fn build_session(config: &ResolvedConfig) -> Result<Session<ZfsCli>, RegistryError> {
    let registry = TargetRegistry::load(&config.registry_path)?;
    info!(
        path = %registry.path().display(),
        targets = registry.len(),
        "Loaded remote target registry"
    );

    let state = AppState::new(
        InventoryService::new(config.pools.clone()),
        registry,
        INITIAL_PAGE_SIZE,
        Duration::from_secs(config.status_seconds),
    );
    let settings = ExecutorSettings {
        mount_root: config.mount_root.clone(),
        browsers: config.browsers.clone(),
        pager: config.pager.clone(),
    };
    let executor = ActionExecutor::new(ZfsCli::new(config.use_sudo), settings);

    Ok(Session::new(state, executor))
}
