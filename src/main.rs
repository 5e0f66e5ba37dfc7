mod app;
mod bridge;
mod components;
mod config;
mod editor;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod session;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use crate::app::App;
use crate::bridge::Backend;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::event::{Event, EventHandler};
use crate::logging::LogTarget;
use crate::tui::{install_panic_hook, Tui};

/// A terminal note-taking app over a folder of plain-text notes.
#[derive(Parser, Debug)]
#[command(name = "notes", version, about)]
struct Cli {
    /// Notes root (defaults to the configured root, then the current directory)
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Note file extension
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Show dot-files and dot-folders in the tree
    #[arg(long)]
    show_hidden: bool,

    /// Delete without asking first
    #[arg(long)]
    no_confirm_delete: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run only the backend, answering JSON-line commands on stdin
    Serve {
        /// Notes root
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Flags that were actually given, as a partial config.
    fn overrides(&self) -> AppConfig {
        let mut overrides = AppConfig::default();
        overrides.notes.extension = self.extension.clone();
        if self.show_hidden {
            overrides.tree.show_hidden = Some(true);
        }
        if self.no_confirm_delete {
            overrides.general.confirm_delete = Some(false);
        }
        overrides
    }
}

/// CLI path, then the configured root, then the working directory.
fn resolve_root(cli_path: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    let path = cli_path
        .map(Path::to_path_buf)
        .or_else(|| config.general.default_root.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let root = path
        .canonicalize()
        .map_err(|_| AppError::InvalidPath(format!("{} does not exist", path.display())))?;
    if !root.is_dir() {
        return Err(AppError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok(root)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    match &cli.command {
        Some(Mode::Serve { path }) => {
            let root = resolve_root(path.as_deref().or(cli.path.as_deref()), &config)?;
            serve(root, &config).await
        }
        None => {
            let root = resolve_root(cli.path.as_deref(), &config)?;
            run_tui(root, &config).await
        }
    }
}

async fn serve(root: PathBuf, config: &AppConfig) -> Result<()> {
    let _log = logging::init(config.log_filter(), LogTarget::Stderr);
    tracing::info!(root = %root.display(), "serving over stdio");

    let (client, handle) = bridge::spawn(Backend::new(root, config.tree_options()));
    let stdin = BufReader::new(tokio::io::stdin());
    bridge::stdio::serve(&client, stdin, tokio::io::stdout()).await?;

    drop(client);
    handle
        .await
        .map_err(|e| AppError::Bridge(format!("backend task failed: {}", e)))
}

async fn run_tui(root: PathBuf, config: &AppConfig) -> Result<()> {
    let log = logging::init(config.log_filter(), LogTarget::File);
    if let Some(dir) = log.as_ref().and_then(|g| g.log_dir()) {
        tracing::info!(root = %root.display(), log_dir = %dir.display(), "starting");
    }

    let (client, handle) = bridge::spawn(Backend::new(root, config.tree_options()));

    install_panic_hook();
    let mut tui = Tui::new()?;
    let result = event_loop(&mut tui, client, config).await;
    tui.restore()?;

    handle
        .await
        .map_err(|e| AppError::Bridge(format!("backend task failed: {}", e)))?;
    result
}

async fn event_loop(tui: &mut Tui, client: bridge::BridgeClient, config: &AppConfig) -> Result<()> {
    let mut app = App::new(
        client,
        config.extension(),
        config.dirs_first(),
        config.confirm_delete(),
        theme::resolve_theme(config.theme_scheme()),
    )
    .await?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key).await,
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("quitting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cli_flags_become_overrides() {
        let cli = Cli::parse_from(["notes", "--extension", "txt", "--no-confirm-delete"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.notes.extension.as_deref(), Some("txt"));
        assert_eq!(overrides.general.confirm_delete, Some(false));
        assert_eq!(overrides.tree.show_hidden, None);
    }

    #[test]
    fn serve_subcommand_takes_a_path() {
        let cli = Cli::parse_from(["notes", "serve", "/tmp"]);
        match cli.command {
            Some(Mode::Serve { path }) => assert_eq!(path, Some(PathBuf::from("/tmp"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn root_prefers_cli_over_config() {
        let cli_dir = TempDir::new().unwrap();
        let cfg_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.general.default_root = Some(cfg_dir.path().to_string_lossy().to_string());

        let root = resolve_root(Some(cli_dir.path()), &config).unwrap();
        assert_eq!(root, cli_dir.path().canonicalize().unwrap());

        let root = resolve_root(None, &config).unwrap();
        assert_eq!(root, cfg_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = resolve_root(Some(&missing), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidPath(_)));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "").unwrap();
        let err = resolve_root(Some(&file), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidPath(_)));
    }
}
