//! In-flight file records.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::site::ObjectRef;

/// Contents of a record.
///
/// Buffers are reference counted so variant fan-out shares one allocation.
#[derive(Clone, Default)]
pub enum Contents {
    /// No contents (directories, placeholders).
    #[default]
    Null,
    Buffer(Arc<[u8]>),
    /// A streaming source. Rejected by every stage that needs the bytes.
    Stream,
}

impl Contents {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// True for `Null` and zero-length buffers.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_none_or(<[u8]>::is_empty)
    }

    pub fn len(&self) -> usize {
        self.as_bytes().map_or(0, <[u8]>::len)
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(bytes.into())
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Self::Buffer(text.into_bytes().into())
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Self::Buffer(text.as_bytes().into())
    }
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Self::Stream => f.write_str("Stream"),
        }
    }
}

/// One unit of content moving through a stage.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Current logical location (absolute).
    pub path: PathBuf,
    /// Root `path` is relative to. Output lands at `<build>/<path - base>`.
    pub base: PathBuf,
    pub contents: Contents,
    /// Owning site object, if the registry knows this file.
    pub object: Option<ObjectRef>,
    /// Intended output path relative to the build root.
    pub destination: Option<String>,
    pub revision: bool,
    /// Destination before the digest was injected.
    pub original_destination: Option<String>,
    pub hash: Option<String>,
    /// `path` before the destination was first applied.
    pub(super) source_path: Option<PathBuf>,
}

impl FileRecord {
    pub fn new(
        path: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        contents: impl Into<Contents>,
    ) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            contents: contents.into(),
            object: None,
            destination: None,
            revision: false,
            original_destination: None,
            hash: None,
            source_path: None,
        }
    }

    /// Read a source file into a buffered record.
    pub async fn read(path: &Path, base: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(path, base, bytes))
    }

    /// `path` relative to `base`.
    ///
    /// Falls back to the file name when `path` lies outside `base`.
    pub fn relative(&self) -> PathBuf {
        self.path
            .strip_prefix(&self.base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.path.file_name().map(PathBuf::from).unwrap_or_default())
    }

    /// The path the record was read from, regardless of applied destinations.
    pub fn source(&self) -> &Path {
        self.source_path.as_deref().unwrap_or(&self.path)
    }

    /// Attach an object, copying its destination and revision flag.
    pub fn attach(&mut self, object: ObjectRef) {
        {
            let guard = object.read();
            self.destination = Some(guard.base_destination().to_string());
            self.revision = guard.revision;
            self.original_destination = None;
            self.hash = None;
        }
        self.object = Some(object);
    }

    /// Same record bound to another object, sharing the content buffer.
    pub fn fork(&self, object: ObjectRef) -> Self {
        let mut record = Self {
            object: None,
            source_path: None,
            ..self.clone()
        };
        record.path = self.source().to_path_buf();
        record.attach(object);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteObject;

    #[test]
    fn test_contents_empty() {
        assert!(Contents::Null.is_empty());
        assert!(Contents::from("").is_empty());
        assert!(!Contents::from("a").is_empty());
        assert!(Contents::Stream.is_empty());
        assert_eq!(Contents::from("abc").len(), 3);
    }

    #[test]
    fn test_relative() {
        let record = FileRecord::new("/site/src/styles/main.css", "/site/src", "x");
        assert_eq!(record.relative(), PathBuf::from("styles/main.css"));

        let outside = FileRecord::new("/elsewhere/a.css", "/site/src", "x");
        assert_eq!(outside.relative(), PathBuf::from("a.css"));
    }

    #[test]
    fn test_fork_shares_buffer() {
        let record = FileRecord::new("/s/a.html", "/s", "hello");
        let fork = record.fork(SiteObject::new("m/a.html").into_ref());

        let (Contents::Buffer(a), Contents::Buffer(b)) = (&record.contents, &fork.contents) else {
            panic!("expected buffers");
        };
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(fork.destination.as_deref(), Some("m/a.html"));
        assert!(record.object.is_none());
    }
}
