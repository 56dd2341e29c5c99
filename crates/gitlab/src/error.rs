use thiserror::Error;

use crate::types::ErrorBody;

#[derive(Error, Debug)]
pub enum GitlabError {
    /// Transport-level failure before an HTTP status was available.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response, carrying the status and the parsed error body.
    #[error("GitLab API returned status {status}: {}", .body.describe())]
    Api { status: u16, body: ErrorBody },

    #[error("Cannot list files, path '{path}' is not a directory but a {kind}")]
    NotADirectory { path: String, kind: String },

    /// A paginated endpoint produced something other than a JSON array.
    #[error("Expected a JSON array page, got a {kind}")]
    UnexpectedPayload { kind: String },

    #[error("Invalid base64 content: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cache error: {0}")]
    Cache(#[from] folio_cache::CacheError),
}

pub type Result<T> = std::result::Result<T, GitlabError>;

impl GitlabError {
    /// HTTP status of the failed response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitlabError::Api { status, .. } => Some(*status),
            GitlabError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether this looks like a missing membership record.
    ///
    /// Best-effort heuristic: the members endpoint answers a missing member
    /// with 404 and a body whose `message` is exactly "404 Not found". A 404
    /// carrying an `error` key instead means the URI itself was wrong, so it
    /// does not match. If GitLab ever rewords the message this degrades to
    /// propagating the 404, never to a silent wrong answer.
    pub fn is_missing_member(&self) -> bool {
        match self {
            GitlabError::Api { status: 404, body } => {
                body.message.as_deref() == Some("404 Not found")
            }
            _ => false,
        }
    }
}
