use std::{
    fmt,
    io::Read,
    path::{Path, PathBuf},
};

use crate::registry::Location;

/// Content slot of a pipeline item.
pub enum Contents {
    /// Directory placeholder; passed through untouched.
    Null,
    Buffer(Vec<u8>),
    /// Live stream. The scanner needs random access, so this is rejected.
    Stream(Box<dyn Read + Send>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Null => f.write_str("Null"),
            Contents::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            Contents::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Fixed-answer stat for files that have no filesystem entry yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_directory: bool,
    pub is_block_device: bool,
    pub is_character_device: bool,
    pub is_symbolic_link: bool,
    pub is_fifo: bool,
    pub is_socket: bool,
}

impl FileStat {
    pub fn regular_file() -> Self {
        Self {
            is_file: true,
            is_directory: false,
            is_block_device: false,
            is_character_device: false,
            is_symbolic_link: false,
            is_fifo: false,
            is_socket: false,
        }
    }
}

/// One file flowing through the linker: either an input item handed over by
/// the host, or a shim generated at end of stream.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub cwd: PathBuf,
    pub base: PathBuf,
    pub contents: Contents,
    pub stat: Option<FileStat>,

    /// Set once the scanner has recorded this file as a module descriptor.
    pub moltres: Option<Location>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, cwd: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cwd: cwd.into(),
            base: base.into(),
            contents: Contents::Null,
            stat: None,
            moltres: None,
        }
    }

    pub fn with_contents(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.contents = Contents::Buffer(bytes.into());
        self
    }

    pub fn with_stream(mut self, stream: Box<dyn Read + Send>) -> Self {
        self.contents = Contents::Stream(stream);
        self
    }

    pub fn with_stat(mut self, stat: FileStat) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(b) => Some(b),
            _ => None,
        }
    }

    /// Extension including the leading dot, e.g. `.json`.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// `path` joined onto `cwd` when it is relative.
    pub fn absolute_path(&self) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            self.cwd.join(&self.path)
        }
    }

    /// Path relative to `base`; the full path when it lies outside `base`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }
}
