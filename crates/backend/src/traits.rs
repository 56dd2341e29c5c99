//! The capability interface a CMS host consumes.

use async_trait::async_trait;

use folio_types::{Collection, FetchedFile, FilePayload, MediaRecord, PersistOptions};

use crate::auth::{AuthenticatedUser, Credentials};
use crate::error::Result;

/// Backend interface exposed to the CMS host.
///
/// Implementations hold an authenticated session between `authenticate`
/// and `logout`; every content operation requires one.
#[async_trait]
pub trait EditorialBackend: Send + Sync {
    /// Open a session from credentials, verifying the user can write to
    /// the configured repository.
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthenticatedUser>;

    /// Re-open a session for a previously authenticated user.
    async fn restore_user(&self, user: AuthenticatedUser) -> Result<AuthenticatedUser>;

    /// Discard the session.
    async fn logout(&self);

    /// Token of the current session, if any.
    async fn token(&self) -> Option<String>;

    /// Entries of a folder collection with the given file extension.
    async fn entries_by_folder(
        &self,
        collection: &Collection,
        extension: &str,
    ) -> Result<Vec<FetchedFile>>;

    /// Entries of a file collection.
    async fn entries_by_files(&self, collection: &Collection) -> Result<Vec<FetchedFile>>;

    /// A single entry, read without caching.
    async fn get_entry(&self, path: &str) -> Result<FetchedFile>;

    /// Media assets under the configured media folder.
    async fn get_media(&self) -> Result<Vec<MediaRecord>>;

    /// Persist an entry and its media files; the entry commit is ordered
    /// after every media upload.
    async fn persist_entry(
        &self,
        entry: FilePayload,
        media: Vec<FilePayload>,
        options: &PersistOptions,
    ) -> Result<FilePayload>;

    /// Persist a single media asset.
    async fn persist_media(
        &self,
        media: FilePayload,
        options: &PersistOptions,
    ) -> Result<MediaRecord>;

    /// Delete a repository file with a commit message.
    async fn delete_file(&self, path: &str, message: &str, branch: Option<&str>) -> Result<()>;
}
