//! Asset loading for monolith mode and image previews.
//!
//! An asset reference is whatever a `src` or `href` attribute holds:
//!
//! | Form | Loaded from |
//! |---|---|
//! | `data:[mime][;base64],payload` | decoded in place (base64 or percent-encoded) |
//! | `http://…`, `https://…`, `//…` | blocking `reqwest` GET, unless remote loading is off |
//! | `file:///abs/path` | the filesystem |
//! | anything else | a path relative to the loader's base directory |
//!
//! Failures are never fatal to an assembly: the enhancer reports them as
//! events and leaves the element untouched.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("remote loading is disabled: {0}")]
    RemoteDisabled(String),
    #[error("request for {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("malformed data URI: {0}")]
    InvalidDataUri(String),
}

/// Source of asset bytes.
pub trait AssetLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, AssetError>;
}

/// Loader for `data:` URIs, remote URLs and local files.
#[derive(Debug, Clone)]
pub struct DefaultLoader {
    base_dir: PathBuf,
    remote: bool,
}

impl DefaultLoader {
    pub fn new(base_dir: impl Into<PathBuf>, remote: bool) -> Self {
        Self {
            base_dir: base_dir.into(),
            remote,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        if !self.remote {
            return Err(AssetError::RemoteDisabled(url.to_string()));
        }
        let http_error = |message: String| AssetError::Http {
            url: url.to_string(),
            message,
        };
        let client = Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(|e| http_error(e.to_string()))?;
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| http_error(e.to_string()))?;
        let body = response.bytes().map_err(|e| http_error(e.to_string()))?;
        Ok(body.to_vec())
    }

    fn read_file(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve_path(reference);
        std::fs::read(&path).map_err(|source| AssetError::Io { path, source })
    }

    /// Filesystem path for a local reference. Query and fragment are
    /// dropped; a percent-encoded name is decoded when the literal one does
    /// not exist.
    fn resolve_path(&self, reference: &str) -> PathBuf {
        let file_url = Url::parse(reference)
            .ok()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok());
        if let Some(path) = file_url {
            return path;
        }

        let bare = reference
            .split(['?', '#'])
            .next()
            .unwrap_or(reference);
        let literal = self.base_dir.join(bare);
        if literal.exists() {
            return literal;
        }
        match urlencoding::decode(bare) {
            Ok(decoded) => self.base_dir.join(decoded.as_ref()),
            Err(_) => literal,
        }
    }
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new(".", true)
    }
}

impl AssetLoader for DefaultLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, AssetError> {
        let source = source.trim();
        if is_data_uri(source) {
            return decode_data_uri(source);
        }
        if let Some(rest) = source.strip_prefix("//") {
            return self.fetch(&format!("https://{rest}"));
        }
        if is_remote(source) {
            return self.fetch(source);
        }
        self.read_file(source)
    }
}

pub fn is_data_uri(source: &str) -> bool {
    source
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// `http(s)://` or protocol-relative `//`.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Payload of a `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, AssetError> {
    let invalid = || AssetError::InvalidDataUri(truncate(uri));
    let rest = uri.get(5..).ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;

    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|last| last.trim().eq_ignore_ascii_case("base64"));
    if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let compact = urlencoding::decode(&compact).map_err(|_| invalid())?;
        STANDARD.decode(compact.as_bytes()).map_err(|_| invalid())
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

/// Encode bytes as a base64 `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// MIME type guessed from a reference's file extension.
pub fn mime_from_extension(reference: &str) -> &'static str {
    let bare = reference.split(['?', '#']).next().unwrap_or(reference);
    let ext = Path::new(bare)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Short form of a possibly huge reference, for messages.
pub fn truncate(reference: &str) -> String {
    const LIMIT: usize = 64;
    match reference.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &reference[..cut]),
        None => reference.to_string(),
    }
}
