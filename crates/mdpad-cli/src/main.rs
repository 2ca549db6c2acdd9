mod app;
mod config;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use mdpad_core::{
    DEFAULT_DOCUMENT, DirectoryDownloads, FileStore, MemoryStore, PersistentStore, STORAGE_KEY,
    Viewport, read_text_file, render_preview_lines,
};
use tracing_subscriber::EnvFilter;

use app::{App, AppOptions};
use config::{Cli, Settings, StoreLocation};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli, |key| std::env::var(key).ok());
    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    let tui = interactive || settings.force_tui;
    init_logging(settings.log_file.as_deref(), tui)?;

    if !tui {
        let text = print_mode_text(&settings)?;
        print_preview(&text)?;
        return Ok(());
    }

    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let options = AppOptions {
        store: open_store(&settings.store),
        downloads: Box::new(DirectoryDownloads::new(settings.downloads_dir.clone())),
        native_save: settings.native_save,
        user_agent: settings.user_agent.clone(),
        perf_mode: settings.perf,
    };
    let mut app = App::new(options, Viewport::new(width.into(), height.into()));
    app.set_theme(settings.theme);
    app.set_no_color(settings.no_color);
    app.set_initial_focus(settings.focus);
    if let Some(path) = settings.path {
        app.open_on_start(path);
    }
    app.run()
}

/// Logs go to `log_file` when given. Without one, only print mode logs
/// to stderr; the TUI owns the terminal.
fn init_logging(log_file: Option<&Path>, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init()
            .map_err(|e| anyhow!(e))?;
    } else if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow!(e))?;
    }
    Ok(())
}

fn open_store(location: &StoreLocation) -> Box<dyn PersistentStore> {
    match location {
        StoreLocation::Memory => Box::new(MemoryStore::new()),
        StoreLocation::Dir(dir) => Box::new(FileStore::new(dir.clone())),
    }
}

/// Document shown in print mode. The stored document is only read; the
/// welcome text is not written back.
fn print_mode_text(settings: &Settings) -> Result<String> {
    if let Some(path) = &settings.path {
        return read_text_file(path).with_context(|| format!("cannot open {}", path.display()));
    }

    let stored = match &settings.store {
        StoreLocation::Memory => None,
        StoreLocation::Dir(dir) => FileStore::new(dir.clone())
            .get(STORAGE_KEY)
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "could not read stored document");
                None
            }),
    };
    Ok(stored
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT.to_string()))
}

fn print_preview(text: &str) -> io::Result<()> {
    let width = preview_width_from_env();
    let stdout = io::stdout();
    let lock = stdout.lock();
    print_preview_to(text, width, io::BufWriter::new(lock))
}

fn preview_width_from_env() -> u16 {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(80)
}

fn print_preview_to<W: Write>(text: &str, width: u16, mut out: W) -> io::Result<()> {
    let lines = render_preview_lines(text, width);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.write_all(b"\n")?;
        }
        out.write_all(line.as_bytes())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use clap::Parser;
    use mdpad_core::{DEFAULT_DOCUMENT, STORAGE_KEY};

    use super::{preview_width_from_env, print_mode_text, print_preview_to};
    use crate::config::{Cli, Settings};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn settings(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(std::iter::once("mdpad").chain(args.iter().copied()))
            .expect("parse");
        Settings::resolve(cli, |_| None)
    }

    #[test]
    fn preview_width_from_env_handles_valid_invalid_and_missing() {
        let _guard = ENV_LOCK.lock().expect("env lock");

        unsafe { std::env::remove_var("COLUMNS") };
        assert_eq!(preview_width_from_env(), 80);

        unsafe { std::env::set_var("COLUMNS", "120") };
        assert_eq!(preview_width_from_env(), 120);

        unsafe { std::env::set_var("COLUMNS", "oops") };
        assert_eq!(preview_width_from_env(), 80);

        unsafe { std::env::remove_var("COLUMNS") };
    }

    #[test]
    fn print_mode_reads_path_and_errors_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.md");
        fs::write(&path, "# Doc").expect("write");

        let path_arg = path.to_string_lossy().into_owned();
        let text =
            print_mode_text(&settings(&[path_arg.as_str(), "--ephemeral"])).expect("read path");
        assert_eq!(text, "# Doc");

        let missing = dir.path().join("missing.md").to_string_lossy().into_owned();
        let err = print_mode_text(&settings(&[missing.as_str(), "--ephemeral"]))
            .expect_err("missing path");
        assert!(err.to_string().contains("cannot open"));
    }

    #[test]
    fn print_mode_shows_stored_document_without_writing_welcome() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("store");
        let store_arg = store.to_string_lossy().into_owned();

        let text = print_mode_text(&settings(&["--store-dir", store_arg.as_str()])).expect("default");
        assert_eq!(text, DEFAULT_DOCUMENT);
        assert!(!store.exists());

        fs::create_dir_all(&store).expect("store");
        fs::write(store.join(format!("{STORAGE_KEY}.md")), "stored text").expect("seed");
        let text = print_mode_text(&settings(&["--store-dir", store_arg.as_str()])).expect("stored");
        assert_eq!(text, "stored text");

        let text = print_mode_text(&settings(&["--ephemeral"])).expect("ephemeral");
        assert_eq!(text, DEFAULT_DOCUMENT);
    }

    #[test]
    fn print_preview_to_writes_newline_separated_lines() {
        let mut out = Vec::new();
        print_preview_to("# a\nb\n", 80, &mut out).expect("print");
        let s = String::from_utf8(out).expect("utf8");
        assert_eq!(s, "# a\nb");

        let mut out2 = Vec::new();
        print_preview_to("", 80, &mut out2).expect("print2");
        assert_eq!(String::from_utf8(out2).expect("utf8"), "");
    }

    #[test]
    fn print_preview_to_propagates_write_errors() {
        struct FailWriter;
        impl io::Write for FailWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("write fail"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = print_preview_to("x", 80, FailWriter).expect_err("expected write err");
        assert!(err.to_string().contains("write fail"));
    }

    #[test]
    fn settings_keep_startup_path() {
        let settings = settings(&["notes.md"]);
        assert_eq!(settings.path, Some(PathBuf::from("notes.md")));
    }
}
