//! GitLab REST client for the folio editorial backend.
//!
//! This crate talks to the subset of the GitLab v4 API a CMS needs to treat
//! a repository as a content store:
//!
//! - identity and membership lookups for the write-access check
//! - paginated repository tree listings
//! - file reads with base64 decoding and an id-keyed cache in front
//! - single-action commits for creates, updates, and deletes
//! - the media-then-entry persistence pipeline
//!
//! There is deliberately no retry, backoff, or timeout layer: every failure
//! surfaces to the caller as a [`GitlabError`].

pub mod client;
pub mod codec;
pub mod error;
pub mod persist;
pub mod types;

pub use client::{Api, ApiBuilder, DEFAULT_API_ROOT, DEFAULT_BRANCH, DEFAULT_PER_PAGE};
pub use error::{GitlabError, Result};
pub use persist::CommitOptions;
pub use types::{
    CommitAction, CommitActionKind, CommitInfo, CommitRequest, ErrorBody, Membership, Namespace,
    ProjectInfo, RepoFile, TreeEntry, TreeEntryKind, UserInfo, WRITE_ACCESS_LEVEL,
};
