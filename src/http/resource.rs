//! Mapping of request targets to files under the document root.
//!
//! Classification is a pure function of the target string
//! ([`ResourceKind::classify`]); resolution ([`Resolver::resolve`]) then
//! locates and opens the file, confined to the document root.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;

use crate::config::StaticConfig;

pub const INDEX_PATH: &str = "/";
pub const ICON_PATH: &str = "/favicon.ico";

/// Raster formats served as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Gif,
    Png,
}

/// What a request target names. Every target falls into exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `/`: the welcome page.
    Index,
    /// `/favicon.ico`.
    Icon,
    /// `*.html`, served through template substitution.
    Html,
    /// `*.jpg`, `*.gif`, `*.png`, served verbatim.
    Image(ImageFormat),
    /// Anything else, including an empty target.
    Unsupported,
}

/// How the writer delivers a resource's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Text,
    Binary,
}

impl ImageFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "image/jpg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Png => "image/png",
        }
    }
}

impl ResourceKind {
    /// Classifies a request target.
    ///
    /// `/` and `/favicon.ico` are matched exactly. Otherwise the text after
    /// the last `.` decides; a target without a known extension is
    /// [`ResourceKind::Unsupported`].
    pub fn classify(path: &str) -> Self {
        match path {
            INDEX_PATH => ResourceKind::Index,
            ICON_PATH => ResourceKind::Icon,
            _ => match path.rsplit_once('.').map(|(_, ext)| ext) {
                Some("html") => ResourceKind::Html,
                Some("jpg") => ResourceKind::Image(ImageFormat::Jpg),
                Some("gif") => ResourceKind::Image(ImageFormat::Gif),
                Some("png") => ResourceKind::Image(ImageFormat::Png),
                _ => ResourceKind::Unsupported,
            },
        }
    }

    /// The `Content-Type` sent for this kind, if it can be served at all.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Index | ResourceKind::Html => Some("text/html"),
            ResourceKind::Icon => Some("image/x-icon"),
            ResourceKind::Image(format) => Some(format.content_type()),
            ResourceKind::Unsupported => None,
        }
    }

    pub fn body_mode(&self) -> Option<BodyMode> {
        match self {
            ResourceKind::Index | ResourceKind::Html => Some(BodyMode::Text),
            ResourceKind::Icon | ResourceKind::Image(_) => Some(BodyMode::Binary),
            ResourceKind::Unsupported => None,
        }
    }
}

/// A resolved, opened resource ready to be written out.
#[derive(Debug)]
pub struct Resource {
    pub kind: ResourceKind,
    pub content_type: &'static str,
    pub mode: BodyMode,
    /// Canonical location of the file, for logging.
    pub location: PathBuf,
    pub file: File,
}

/// Outcome of resolving a target.
#[derive(Debug)]
pub enum Resolution {
    Found(Resource),
    /// Missing file, not a regular file, or a location outside the
    /// document root.
    NotFound,
    /// The target's kind cannot be served.
    Unsupported,
}

/// Resolves request targets against one document root.
///
/// Shared read-only between connections.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    welcome_page: PathBuf,
    favicon: PathBuf,
}

impl Resolver {
    /// Builds a resolver for `config.document_root`.
    ///
    /// The root is canonicalized once here, so it must exist.
    pub fn new(config: &StaticConfig) -> io::Result<Self> {
        let root = std::fs::canonicalize(&config.document_root)?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("document root {} is not a directory", root.display()),
            ));
        }

        Ok(Self {
            root,
            welcome_page: config.welcome_page.clone(),
            favicon: config.favicon.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classifies `path` and opens the file it names.
    ///
    /// Lookup failures that mean "no such resource" become
    /// [`Resolution::NotFound`]; other I/O errors are returned.
    pub async fn resolve(&self, path: &str) -> io::Result<Resolution> {
        let kind = ResourceKind::classify(path);

        let (Some(content_type), Some(mode)) = (kind.content_type(), kind.body_mode()) else {
            return Ok(Resolution::Unsupported);
        };

        let relative = match kind {
            ResourceKind::Index => self.welcome_page.as_path(),
            ResourceKind::Icon => self.favicon.as_path(),
            _ => Path::new(path.trim_start_matches('/')),
        };

        let Some(location) = self.confine(relative).await? else {
            return Ok(Resolution::NotFound);
        };

        let file = match File::open(&location).await {
            Ok(file) => file,
            Err(e) if is_missing(&e) => return Ok(Resolution::NotFound),
            Err(e) => return Err(e),
        };

        if !file.metadata().await?.is_file() {
            return Ok(Resolution::NotFound);
        }

        Ok(Resolution::Found(Resource {
            kind,
            content_type,
            mode,
            location,
            file,
        }))
    }

    /// Canonical location of `relative` under the root, or `None` when it
    /// does not exist or resolves outside the root.
    async fn confine(&self, relative: &Path) -> io::Result<Option<PathBuf>> {
        let candidate = self.root.join(relative);

        let location = match tokio::fs::canonicalize(&candidate).await {
            Ok(location) => location,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

        if !location.starts_with(&self.root) {
            tracing::warn!(
                requested = %relative.display(),
                resolved = %location.display(),
                "request escapes document root"
            );
            return Ok(None);
        }

        Ok(Some(location))
    }
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::PermissionDenied
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_after_last_dot() {
        assert_eq!(ResourceKind::classify("/a.b/c.html"), ResourceKind::Html);
        assert_eq!(ResourceKind::classify("/a.html/c"), ResourceKind::Unsupported);
        assert_eq!(ResourceKind::classify("/page.HTML"), ResourceKind::Unsupported);
    }

    #[test]
    fn only_exact_root_is_index() {
        assert_eq!(ResourceKind::classify("/"), ResourceKind::Index);
        assert_eq!(ResourceKind::classify(""), ResourceKind::Unsupported);
        assert_eq!(ResourceKind::classify("//"), ResourceKind::Unsupported);
    }
}
