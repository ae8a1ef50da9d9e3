use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use crate::error::ScriptError;

/// Line in the install script whose value is replaced by the requested version.
pub const VERSION_MARKER: &str = "VERSION=latest";

const PLAIN_TEXT: &str = "text/plain; charset=utf8";
const SHELL_SCRIPT: &str = "text/x-shellscript";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Rewrite `VERSION=latest` with the version taken from the request path.
    Substitute,
    /// Serve the script as-is, whatever the request.
    Verbatim,
}

impl ServeMode {
    pub fn content_type(self) -> &'static str {
        match self {
            ServeMode::Substitute => PLAIN_TEXT,
            ServeMode::Verbatim => SHELL_SCRIPT,
        }
    }
}

struct SharedText(Arc<str>);

impl AsRef<[u8]> for SharedText {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// The install script, read once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    contents: Arc<str>,
}

impl TemplateAsset {
    pub fn new(contents: impl Into<Arc<str>>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::new(contents))
    }

    pub fn as_str(&self) -> &str {
        &self.contents
    }

    /// Body bytes sharing the loaded script, without copying it.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from_owner(SharedText(Arc::clone(&self.contents)))
    }

    /// Returns the script with the first marker line pointing at `version`.
    /// An empty version, or a script without the marker, is returned untouched.
    pub fn render(&self, version: &str) -> Cow<'_, str> {
        if version.is_empty() || !self.contents.contains(VERSION_MARKER) {
            return Cow::Borrowed(self.as_str());
        }

        let replacement = format!("VERSION={version}");
        Cow::Owned(self.contents.replacen(VERSION_MARKER, &replacement, 1))
    }
}

/// Extracts the version label from a request target.
///
/// A missing or empty target is treated as `/`. Origin-form targets
/// (`/v1.2.3?x=1`) and absolute URLs (`https://host/v1.2.3`) are both
/// accepted; the query and fragment are ignored. The path is returned as
/// written: dot segments and percent escapes are left alone.
pub fn version_from_url(url: Option<&str>) -> Result<&str, ScriptError> {
    let raw = match url {
        Some(raw) if !raw.is_empty() => raw,
        _ => "/",
    };

    let parsed = if raw.starts_with('/') {
        Url::parse(&format!("http://localhost{raw}"))
    } else {
        Url::parse(raw)
    }
    .map_err(|e| ScriptError::InvalidRequest(format!("malformed url `{raw}`: {e}")))?;

    if parsed.cannot_be_a_base() {
        return Err(ScriptError::InvalidRequest(format!(
            "url `{raw}` has no path"
        )));
    }

    let path = if raw.starts_with('/') {
        raw
    } else {
        raw_path(raw)
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    Ok(path.strip_prefix('/').unwrap_or(path))
}

/// Path text of an absolute URL, past the scheme and authority.
fn raw_path(url: &str) -> &str {
    let rest = url.split_once(':').map_or(url, |(_, rest)| rest);
    match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find(['/', '?', '#'])
            .map_or("", |at| &authority_and_path[at..]),
        None => rest,
    }
}

#[derive(Debug)]
pub struct ScriptResponse {
    pub payload: Bytes,
    pub content_type: &'static str,
}

pub struct ScriptResponder {
    asset: TemplateAsset,
    mode: ServeMode,
}

impl ScriptResponder {
    pub fn new(asset: TemplateAsset, mode: ServeMode) -> Self {
        Self { asset, mode }
    }

    pub fn handle(&self, url: Option<&str>) -> Result<ScriptResponse, ScriptError> {
        let payload = match self.mode {
            ServeMode::Verbatim => self.asset.to_bytes(),
            ServeMode::Substitute => match self.asset.render(version_from_url(url)?) {
                Cow::Borrowed(_) => self.asset.to_bytes(),
                Cow::Owned(rendered) => Bytes::from(rendered),
            },
        };

        Ok(ScriptResponse {
            payload,
            content_type: self.mode.content_type(),
        })
    }
}
