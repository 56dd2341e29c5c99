//! Core data types shared between the CMS host and backend implementations.

use serde::{Deserialize, Serialize};

use crate::paths::trim_leading_slash;

/// A content collection as configured by the CMS host.
///
/// Folder collections list entries under a repository directory; file
/// collections enumerate explicit file paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Repository folder holding this collection's entries, if folder-based.
    #[serde(default)]
    pub folder: Option<String>,
    /// Explicit entry files, if file-based.
    #[serde(default)]
    pub files: Vec<CollectionFile>,
}

impl Collection {
    pub fn folder(name: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder: Some(folder.into()),
            files: Vec::new(),
        }
    }

    pub fn files(name: impl Into<String>, files: Vec<CollectionFile>) -> Self {
        Self {
            name: name.into(),
            folder: None,
            files,
        }
    }
}

/// One explicit file of a file-based collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionFile {
    /// Repository path of the file.
    pub file: String,
    /// Human-readable label shown by the host.
    #[serde(default)]
    pub label: Option<String>,
}

/// A reference to a repository file used for listing and bulk fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub path: String,
    /// Stable identifier (the blob id) used as the cache key, when known.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl FileHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id: None,
            label: None,
        }
    }

    pub fn with_id(path: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id: Some(id.into()),
            label: None,
        }
    }
}

/// A fetched file together with the handle that requested it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub file: FileHandle,
    pub data: Vec<u8>,
}

/// A file travelling through the persistence pipeline.
///
/// `uploaded` is false until the commit carrying this file succeeds; files
/// already uploaded are skipped when a batch is persisted again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub path: String,
    /// Display name, used in generated commit messages.
    pub name: String,
    pub content: Vec<u8>,
    pub uploaded: bool,
}

impl FilePayload {
    /// Create a payload for `path`, deriving the display name from the last
    /// path segment.
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        let name = trim_leading_slash(&path)
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            path,
            name,
            content: content.into(),
            uploaded: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Consume the payload, marking it as landed in a successful commit.
    pub fn mark_uploaded(mut self) -> Self {
        self.uploaded = true;
        self
    }
}

/// A stored media asset as reported back to the CMS host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Blob id when the record came from a repository listing.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Size in bytes, when known.
    #[serde(default)]
    pub size: Option<u64>,
    /// Raw download URL for the asset.
    pub url: String,
    pub path: String,
}

/// Options for a persist operation.
#[derive(Debug, Clone, Default)]
pub struct PersistOptions {
    pub commit_message: String,
    /// Whether the primary entry is being created rather than updated.
    pub new_entry: bool,
    /// Branch override; the backend's configured branch applies otherwise.
    pub branch: Option<String>,
}

impl PersistOptions {
    pub fn new(commit_message: impl Into<String>) -> Self {
        Self {
            commit_message: commit_message.into(),
            new_entry: false,
            branch: None,
        }
    }

    pub fn new_entry(mut self) -> Self {
        self.new_entry = true;
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}
