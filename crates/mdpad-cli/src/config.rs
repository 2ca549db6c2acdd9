use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::app::{PaneFocus, ThemeChoice};

#[derive(Debug, Parser)]
#[command(name = "mdpad", version, about = "Terminal markdown editor with live preview")]
pub struct Cli {
    /// Markdown file to open at startup
    pub path: Option<PathBuf>,

    /// Directory holding the autosaved document
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Keep the document in memory only
    #[arg(long, default_value_t = false, conflicts_with = "store_dir")]
    pub ephemeral: bool,

    /// Where saves land when no destination is chosen
    #[arg(long, value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Skip the save-as prompt and always download
    #[arg(long, default_value_t = false)]
    pub no_native_save: bool,

    /// Color theme
    #[arg(long, value_enum, default_value_t = CliTheme::Auto)]
    pub theme: CliTheme,

    /// Disable ANSI color
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Initially focused pane
    #[arg(long, value_enum, default_value_t = CliFocus::Editor)]
    pub focus: CliFocus,

    /// Append logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Show perf info in status line
    #[arg(long, default_value_t = false)]
    pub perf: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliTheme {
    Auto,
    Default,
    HighContrast,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliFocus {
    Editor,
    #[value(alias = "preview")]
    View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Dir(PathBuf),
}

/// Flags merged with environment overrides and computed defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub path: Option<PathBuf>,
    pub store: StoreLocation,
    pub downloads_dir: PathBuf,
    pub native_save: bool,
    pub theme: ThemeChoice,
    pub no_color: bool,
    pub focus: PaneFocus,
    pub log_file: Option<PathBuf>,
    pub perf: bool,
    pub force_tui: bool,
    pub user_agent: String,
}

impl Settings {
    pub fn resolve(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|value| !value.is_empty());

        let store = if cli.ephemeral {
            StoreLocation::Memory
        } else {
            let dir = cli
                .store_dir
                .or_else(|| env("MDPAD_STORE_DIR").map(PathBuf::from))
                .unwrap_or_else(|| default_store_dir(&env));
            StoreLocation::Dir(dir)
        };

        let downloads_dir = cli
            .downloads_dir
            .or_else(|| env("MDPAD_DOWNLOADS_DIR").map(PathBuf::from))
            .unwrap_or_else(|| default_downloads_dir(&env));

        let theme = match cli.theme {
            CliTheme::Auto => ThemeChoice::Auto,
            CliTheme::Default => ThemeChoice::Default,
            CliTheme::HighContrast => ThemeChoice::HighContrast,
        };
        let focus = match cli.focus {
            CliFocus::Editor => PaneFocus::Editor,
            CliFocus::View => PaneFocus::Preview,
        };

        Self {
            path: cli.path,
            store,
            downloads_dir,
            native_save: !cli.no_native_save,
            theme,
            no_color: cli.no_color,
            focus,
            log_file: cli
                .log_file
                .or_else(|| env("MDPAD_LOG_FILE").map(PathBuf::from)),
            perf: cli.perf,
            force_tui: env("MDPAD_FORCE_TUI").as_deref() == Some("1"),
            user_agent: terminal_user_agent(&env),
        }
    }
}

fn home_dir(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    env("HOME").or_else(|| env("USERPROFILE")).map(PathBuf::from)
}

fn default_store_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(data) = env("XDG_DATA_HOME") {
        return PathBuf::from(data).join("mdpad");
    }
    #[cfg(target_os = "macos")]
    if let Some(home) = home_dir(env) {
        return home.join("Library/Application Support/mdpad");
    }
    #[cfg(windows)]
    if let Some(app_data) = env("APPDATA") {
        return PathBuf::from(app_data).join("mdpad");
    }
    match home_dir(env) {
        Some(home) => home.join(".local/share/mdpad"),
        None => PathBuf::from(".mdpad"),
    }
}

fn default_downloads_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    home_dir(env)
        .map(|home| home.join("Downloads"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Stand-in for a browser user agent, built from what the terminal
/// environment reveals. Termux reports as Android.
pub fn terminal_user_agent(env: &impl Fn(&str) -> Option<String>) -> String {
    let mut agent = format!("mdpad/{}", env!("CARGO_PKG_VERSION"));
    if env("TERMUX_VERSION").is_some() {
        agent.push_str(" (Linux; Android) Termux");
    }
    if let Some(program) = env("TERM_PROGRAM") {
        agent.push(' ');
        agent.push_str(&program);
    }
    agent
}
