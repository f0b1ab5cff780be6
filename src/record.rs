//! Input file records handed to the engine by an external file source

use std::fmt;
use std::path::PathBuf;

use tokio::io::AsyncRead;

/// Boxed async reader for streamed file contents
pub type ContentReader = Box<dyn AsyncRead + Send + Unpin>;

/// Contents of a file record
pub enum FileContents {
    /// No contents (deletion marker or directory placeholder)
    Empty,
    /// Fully materialized bytes
    Buffer(Vec<u8>),
    /// Non-seekable byte stream with an optional declared length
    Stream {
        reader: ContentReader,
        declared_len: Option<u64>,
    },
}

impl FileContents {
    pub fn is_empty(&self) -> bool {
        matches!(self, FileContents::Empty)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, FileContents::Stream { .. })
    }
}

impl fmt::Debug for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContents::Empty => write!(f, "Empty"),
            FileContents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            FileContents::Stream { declared_len, .. } => {
                write!(f, "Stream(declared_len: {:?})", declared_len)
            }
        }
    }
}

/// A single file offered to the engine, owned by the external source
#[derive(Debug)]
pub struct FileRecord {
    /// Path relative to the sync root; source of the destination key
    pub relative_path: String,
    /// Base directory the relative path is anchored at
    pub base_path: PathBuf,
    pub contents: FileContents,
}

impl FileRecord {
    /// Record with fully materialized contents
    pub fn buffer(relative_path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            relative_path: relative_path.into(),
            base_path: PathBuf::new(),
            contents: FileContents::Buffer(bytes),
        }
    }

    /// Record with streamed contents and an optional declared byte length
    pub fn stream(
        relative_path: impl Into<String>,
        reader: ContentReader,
        declared_len: Option<u64>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            base_path: PathBuf::new(),
            contents: FileContents::Stream {
                reader,
                declared_len,
            },
        }
    }

    /// Record carrying no contents
    pub fn empty(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            base_path: PathBuf::new(),
            contents: FileContents::Empty,
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }
}
