use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use thiserror::Error;

/// Image sources with this prefix are resolved through [`ImageLibrary`].
pub const UPLOAD_SCHEME: &str = "upload:";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported image type: {0}")]
    Unsupported(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub mime: &'static str,
    pub byte_len: usize,
    pub data_uri: String,
}

/// Attached images keyed by file name.
#[derive(Debug, Default, Clone)]
pub struct ImageLibrary {
    images: BTreeMap<String, StoredImage>,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StoredImage> {
        self.images.get(name)
    }

    /// Resolves an image `src`, following `upload:` references.
    pub fn resolve<'a>(&'a self, src: &str) -> Option<&'a StoredImage> {
        src.strip_prefix(UPLOAD_SCHEME)
            .and_then(|name| self.images.get(name))
    }

    pub fn insert_bytes(&mut self, name: &str, mime: &'static str, bytes: &[u8]) -> &StoredImage {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let image = StoredImage {
            mime,
            byte_len: bytes.len(),
            data_uri: format!("data:{mime};base64,{encoded}"),
        };
        self.images.insert(name.to_string(), image);
        &self.images[name]
    }

    /// Reads an image file and stores it under its file name, returning
    /// that name.
    pub fn attach_file(&mut self, path: &Path) -> Result<String, ImageError> {
        let mime = mime_for(path).ok_or_else(|| ImageError::Unsupported(path.to_path_buf()))?;
        let bytes = fs::read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().replace(' ', "-"))
            .unwrap_or_else(|| "image".into());
        self.insert_bytes(&name, mime, &bytes);
        tracing::debug!(%name, bytes = bytes.len(), "attached image");
        Ok(name)
    }
}

/// Markdown referencing an attached image.
pub fn image_markdown(name: &str) -> String {
    format!("![{name}]({UPLOAD_SCHEME}{name})")
}

/// Whether `path` has an extension the library accepts.
pub fn is_image_path(path: &Path) -> bool {
    mime_for(path).is_some()
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}
