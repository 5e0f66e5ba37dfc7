//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--extension`, `--show-hidden`, `--no-confirm-delete`)
//! 2. Explicit `--config FILE`
//! 3. `$NOTES_TUI_CONFIG` environment variable (path to config file)
//! 4. Project-local `.notes-tui.toml` in the current working directory
//! 5. Global `~/.config/notes-tui/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::tree::TreeOptions;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Notes root (overridden by CLI positional arg).
    pub default_root: Option<String>,
    /// Ask before deleting notes and folders.
    pub confirm_delete: Option<bool>,
}

/// Note file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NotesConfig {
    /// Note extension, with or without the leading dot.
    pub extension: Option<String>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    pub show_hidden: Option<bool>,
    /// Folders listed before notes.
    pub dirs_first: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// "dark" or "light".
    pub scheme: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub notes: NotesConfig,
    pub tree: TreeConfig,
    pub log: LogConfig,
    pub theme: ThemeConfig,
}

pub const DEFAULT_EXTENSION: &str = "md";
pub const DEFAULT_LOG_FILTER: &str = "notes_tui=info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order, `--config` excluded.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("NOTES_TUI_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".notes-tui.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("notes-tui").join("config.toml"));
    }

    paths
}

/// Read and parse a TOML config file. `None` if the file is missing or bad
/// (a bad file gets a warning on stderr; logging is not up yet).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_root: other
                    .general
                    .default_root
                    .clone()
                    .or(self.general.default_root),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
            },
            notes: NotesConfig {
                extension: other.notes.extension.clone().or(self.notes.extension),
            },
            tree: TreeConfig {
                show_hidden: other.tree.show_hidden.or(self.tree.show_hidden),
                dirs_first: other.tree.dirs_first.or(self.tree.dirs_first),
            },
            log: LogConfig {
                filter: other.log.filter.clone().or(self.log.filter),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so higher sources overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    /// Note extension without the leading dot.
    pub fn extension(&self) -> &str {
        match self.notes.extension.as_deref().map(|e| e.trim_start_matches('.')) {
            Some(ext) if !ext.is_empty() => ext,
            _ => DEFAULT_EXTENSION,
        }
    }

    pub fn show_hidden(&self) -> bool {
        self.tree.show_hidden.unwrap_or(false)
    }

    pub fn dirs_first(&self) -> bool {
        self.tree.dirs_first.unwrap_or(true)
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    /// What the backend's tree walk keeps.
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            extension: self.extension().to_string(),
            show_hidden: self.show_hidden(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(cfg.confirm_delete());
        assert_eq!(cfg.extension(), "md");
        assert!(!cfg.show_hidden());
        assert!(cfg.dirs_first());
        assert_eq!(cfg.log_filter(), "notes_tui=info");
        assert_eq!(cfg.theme_scheme(), "dark");
        assert!(cfg.general.default_root.is_none());
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_root = "/srv/notes"
confirm_delete = false

[notes]
extension = "txt"

[tree]
show_hidden = true
dirs_first = false

[log]
filter = "notes_tui=debug"

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.general.default_root.as_deref(), Some("/srv/notes"));
        assert!(!cfg.confirm_delete());
        assert_eq!(cfg.extension(), "txt");
        assert!(cfg.show_hidden());
        assert!(!cfg.dirs_first());
        assert_eq!(cfg.log_filter(), "notes_tui=debug");
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[tree]
show_hidden = true
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.show_hidden());
        assert!(cfg.confirm_delete());
        assert_eq!(cfg.extension(), "md");
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(!cfg.show_hidden());
        assert!(cfg.confirm_delete());
    }

    #[test]
    fn test_extension_leading_dot_is_stripped() {
        let cfg = AppConfig {
            notes: NotesConfig {
                extension: Some(".org".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(cfg.extension(), "org");

        let blank = AppConfig {
            notes: NotesConfig {
                extension: Some(".".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(blank.extension(), "md");
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                confirm_delete: Some(false),
                ..Default::default()
            },
            tree: TreeConfig {
                show_hidden: Some(false),
                dirs_first: Some(false),
            },
            ..Default::default()
        };
        let over = AppConfig {
            tree: TreeConfig {
                show_hidden: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.show_hidden());
        assert!(!merged.dirs_first());
        assert!(!merged.confirm_delete());
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            log: LogConfig {
                filter: Some("debug".to_string()),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.log_filter(), "debug");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[notes]
extension = "markdown"

[tree]
dirs_first = false
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert_eq!(cfg.extension(), "markdown");
        assert!(!cfg.dirs_first());
        assert!(!cfg.show_hidden());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[notes]
extension = "txt"

[general]
confirm_delete = false
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            notes: NotesConfig {
                extension: Some("md".to_string()),
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert_eq!(cfg.extension(), "md");
        assert!(!cfg.confirm_delete());
    }

    #[test]
    fn test_tree_options_follow_config() {
        let cfg = AppConfig {
            notes: NotesConfig {
                extension: Some("txt".to_string()),
            },
            tree: TreeConfig {
                show_hidden: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let options = cfg.tree_options();
        assert_eq!(options.extension, "txt");
        assert!(options.show_hidden);
    }
}
