mod app;
mod attachment;
mod config;
mod post_form;
mod post_store;
mod schedule;
mod scheduled_post;
mod storage;
mod ui;

use app::{Action, App};
use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use config::Config;
use post_store::PostStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use storage::{FileStorage, MemoryStorage};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::UI;

/// Draft social media posts and keep them on a local schedule.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding saved posts and the log (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Keep posts in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let mut config = Config::load(&config_path)?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(log_path) = log_target(&config, args.ephemeral) {
        init_logging(&log_path, &config.log_level)?;
    }
    info!(
        data_dir = %config.data_dir.display(),
        ephemeral = args.ephemeral,
        "starting post scheduler"
    );

    let mut store = if args.ephemeral {
        PostStore::load(MemoryStorage::new())
    } else {
        PostStore::load(FileStorage::new(&config.data_dir).with_quota(config.storage_quota_bytes))
    };
    let mut app = App::new(config.toast_duration());
    let mut ui = UI::new()?;

    loop {
        ui.display(&app, store.list())?;

        if let Some(action) = ui.handle_input(&mut app, store.list())? {
            match action {
                Action::Schedule(draft) => match store.add(draft) {
                    Ok(_) => app.post_scheduled(),
                    Err(e) => app.save_failed(&e),
                },
                Action::Delete(id) => match store.delete(&id) {
                    Ok(()) => app.post_deleted(store.list().len()),
                    Err(e) => app.save_failed(&e),
                },
                Action::Quit => break,
            }
        }
    }

    info!("post scheduler exiting");
    Ok(())
}

/// Where the log goes. Ephemeral runs write nothing, so they get no log file.
fn log_target(config: &Config, ephemeral: bool) -> Option<PathBuf> {
    (!ephemeral).then(|| config.log_path())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(log_path: &Path, log_level: &str) -> Result<()> {
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir).wrap_err_with(|| format!("cannot create {}", dir.display()))?;
    }
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .wrap_err("cannot open log file")?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)?,
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| eyre!("cannot initialise logging: {e}"))?;
    Ok(())
}
