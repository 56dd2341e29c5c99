//! Wire types for the GitLab REST API endpoints the client touches.

use serde::{Deserialize, Serialize};

use folio_types::trim_leading_slash;

/// Minimum access level treated as write-capable (GitLab "Developer").
pub const WRITE_ACCESS_LEVEL: u32 = 30;

/// The authenticated identity, from `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Namespace a project lives under.
#[derive(Debug, Clone, Deserialize)]
pub struct Namespace {
    /// `user` or `group`.
    pub kind: String,
    pub full_path: String,
}

/// Project metadata, from `GET /projects/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub id: Option<u64>,
    pub namespace: Namespace,
}

/// A member's record on a project or group.
#[derive(Debug, Clone, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub id: Option<u64>,
    pub access_level: u32,
}

impl Membership {
    pub fn can_write(&self) -> bool {
        self.access_level >= WRITE_ACCESS_LEVEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    /// A file.
    Blob,
    /// A directory.
    Tree,
    #[serde(other)]
    Other,
}

/// One entry of a repository tree listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TreeEntryKind,
    pub path: String,
    #[serde(default)]
    pub mode: Option<String>,
}

/// File metadata and content, from `GET /repository/files/:path`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoFile {
    #[serde(default)]
    pub file_name: Option<String>,
    pub content: String,
    /// Content transfer encoding; GitLab sends `base64`.
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Error body of a non-2xx response.
///
/// GitLab answers with a `message` key for domain errors and an `error` key
/// for routing/validation failures; the distinction matters to the
/// membership check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn describe(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("unknown error")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitActionKind {
    Create,
    Update,
    Delete,
}

/// One file-level operation bundled into a commit request.
///
/// Content-bearing actions always carry base64 content with the matching
/// encoding marker; a delete carries neither.
#[derive(Debug, Clone, Serialize)]
pub struct CommitAction {
    pub action: CommitActionKind,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl CommitAction {
    pub fn create(file_path: &str, content_base64: String) -> Self {
        Self::with_content(CommitActionKind::Create, file_path, content_base64)
    }

    pub fn update(file_path: &str, content_base64: String) -> Self {
        Self::with_content(CommitActionKind::Update, file_path, content_base64)
    }

    pub fn delete(file_path: &str) -> Self {
        Self {
            action: CommitActionKind::Delete,
            file_path: trim_leading_slash(file_path).to_string(),
            content: None,
            encoding: None,
        }
    }

    fn with_content(action: CommitActionKind, file_path: &str, content_base64: String) -> Self {
        Self {
            action,
            file_path: trim_leading_slash(file_path).to_string(),
            content: Some(content_base64),
            encoding: Some("base64".to_string()),
        }
    }
}

/// Payload of `POST /repository/commits`.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRequest {
    pub branch: String,
    pub commit_message: String,
    pub actions: Vec<CommitAction>,
}

/// The created commit, as echoed back by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}
