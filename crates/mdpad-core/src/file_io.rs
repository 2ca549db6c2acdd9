use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_FILENAME: &str = "document.md";
const MAX_STEM_CHARS: usize = 50;
const MAX_DOWNLOAD_SUFFIX: usize = 999;

static BLOCK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:>\s*)*(?:#{1,6}\s+|(?:[-*+]|\d+[.)])\s+(?:\[[ xX]\]\s+)?)?")
        .expect("block marker pattern")
});
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("link pattern"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_~`]").expect("emphasis pattern"));
static ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f\x7f]"#).expect("illegal pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

#[derive(Debug, Error)]
pub enum FileIoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a file as text, replacing invalid UTF-8 sequences.
pub fn read_text_file(path: &Path) -> Result<String, FileIoError> {
    let bytes = fs::read(path).map_err(|source| FileIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Suggested export name built from the first line that still has text
/// once markup and illegal characters are removed.
pub fn derive_filename(document: &str) -> String {
    document
        .lines()
        .find_map(filename_stem)
        .map(|stem| format!("{stem}.md"))
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn filename_stem(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let stripped = BLOCK_MARKER.replace(line, "");
    let stripped = LINK.replace_all(&stripped, "$1");
    let stripped = EMPHASIS.replace_all(&stripped, "");
    let stripped = ILLEGAL.replace_all(&stripped, "");
    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ");

    let stem: String = collapsed.chars().take(MAX_STEM_CHARS).collect();
    let stem = stem.trim_end();
    stem.chars()
        .any(char::is_alphanumeric)
        .then(|| stem.to_string())
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save cancelled")]
    Cancelled,
    #[error("native save unavailable")]
    Unavailable,
    #[error("save failed: {0}")]
    Failed(#[from] io::Error),
}

/// "Pick a location and write" capability.
pub trait NativeSaver {
    fn save(&mut self, suggested_name: &str, text: &str) -> Result<PathBuf, SaveError>;
}

/// Native saver backed by a location the user already picked. `None`
/// means the picker was dismissed.
#[derive(Debug, Clone)]
pub struct ChosenPathSaver {
    choice: Option<PathBuf>,
}

impl ChosenPathSaver {
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self { choice }
    }
}

impl NativeSaver for ChosenPathSaver {
    fn save(&mut self, suggested_name: &str, text: &str) -> Result<PathBuf, SaveError> {
        let Some(choice) = self.choice.take() else {
            return Err(SaveError::Cancelled);
        };
        let path = if choice.is_dir() {
            choice.join(suggested_name)
        } else {
            choice
        };
        write_atomic(&path, text)?;
        Ok(path)
    }
}

/// Always-available export fallback.
pub trait DownloadSink {
    fn download(&mut self, filename: &str, text: &str) -> io::Result<PathBuf>;
}

/// Drops exports into a directory, numbering the name when it is taken.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloads {
    fn download(&mut self, filename: &str, text: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let mut blob = NamedTempFile::new_in(&self.dir)?;
        blob.write_all(text.as_bytes())?;
        blob.flush()?;

        for n in 0..=MAX_DOWNLOAD_SUFFIX {
            let target = self.dir.join(numbered_name(filename, n));
            match blob.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => blob = err.file,
                Err(err) => return Err(err.error),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {filename}"),
        ))
    }
}

fn numbered_name(filename: &str, n: usize) -> String {
    if n == 0 {
        return filename.to_string();
    }
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Downloaded(PathBuf),
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("download failed: {0}")]
    Download(#[from] io::Error),
}

/// Exports `text` through `native` when present, falling back to
/// `fallback` unless the user cancelled.
pub fn export(
    text: &str,
    native: Option<&mut dyn NativeSaver>,
    fallback: &mut dyn DownloadSink,
) -> Result<ExportOutcome, ExportError> {
    let filename = derive_filename(text);

    if let Some(saver) = native {
        match saver.save(&filename, text) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved document");
                return Ok(ExportOutcome::Saved(path));
            }
            Err(SaveError::Cancelled) => {
                tracing::debug!("save cancelled");
                return Ok(ExportOutcome::Cancelled);
            }
            Err(SaveError::Unavailable) => {
                tracing::info!("native save unavailable, using download fallback");
            }
            Err(SaveError::Failed(err)) => {
                tracing::warn!(error = %err, "native save failed, using download fallback");
            }
        }
    }

    let path = fallback.download(&filename, text)?;
    tracing::info!(path = %path.display(), "downloaded document");
    Ok(ExportOutcome::Downloaded(path))
}

fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
