//! Upload and commit pipeline.
//!
//! Media files are committed ahead of the primary entry so the repository
//! never references media that failed to land. Media uploads run
//! concurrently without a bound — the download side is what carries the
//! concurrency cap.

use futures::future::try_join_all;
use tracing::{debug, info};

use folio_types::{FilePayload, PersistOptions};

use crate::client::Api;
use crate::codec;
use crate::error::Result;
use crate::types::{CommitAction, CommitInfo, CommitRequest};

/// Options for a single-file commit.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    pub commit_message: String,
    /// Create rather than update the file.
    pub new_file: bool,
    /// Branch override; the client's configured branch applies otherwise.
    pub branch: Option<String>,
}

impl Api {
    /// Commit one file as a create-or-update action and mark it uploaded.
    pub async fn upload_and_commit(
        &self,
        item: FilePayload,
        options: &CommitOptions,
    ) -> Result<FilePayload> {
        let content = codec::to_base64(&item.content);
        let action = if options.new_file {
            CommitAction::create(&item.path, content)
        } else {
            CommitAction::update(&item.path, content)
        };
        let request = CommitRequest {
            branch: options
                .branch
                .clone()
                .unwrap_or_else(|| self.branch().to_string()),
            commit_message: options.commit_message.clone(),
            actions: vec![action],
        };

        let commits_url = format!("{}/repository/commits", self.project_url());
        let commit: CommitInfo = self.post_json(&commits_url, &request).await?;
        info!("committed {} as {}", item.path, commit.id);
        Ok(item.mark_uploaded())
    }

    /// Upload a batch of media files, then commit the primary entry.
    ///
    /// Media files already marked uploaded pass through untouched. Each new
    /// file gets an existence check to pick create-vs-update semantics, then
    /// all uploads are issued concurrently. The entry commit starts only
    /// once every media upload has succeeded; the first media failure is
    /// returned and the entry is never committed.
    ///
    /// Returns every file the call committed, media first, then the entry
    /// when one was supplied.
    pub async fn persist_files(
        &self,
        entry: Option<FilePayload>,
        media: Vec<FilePayload>,
        options: &PersistOptions,
    ) -> Result<Vec<FilePayload>> {
        let (uploaded, pending): (Vec<_>, Vec<_>) =
            media.into_iter().partition(|file| file.uploaded);
        if !uploaded.is_empty() {
            debug!("skipping {} already-uploaded media files", uploaded.len());
        }

        let uploads = pending.into_iter().map(|file| async move {
            let exists = self.file_exists(&file.path, options.branch.as_deref()).await?;
            let commit = CommitOptions {
                commit_message: format!("{}: create {}.", options.commit_message, file.name),
                new_file: !exists,
                branch: options.branch.clone(),
            };
            self.upload_and_commit(file, &commit).await
        });
        let mut persisted = try_join_all(uploads).await?;
        persisted.extend(uploaded);

        if let Some(entry) = entry {
            let commit = CommitOptions {
                commit_message: options.commit_message.clone(),
                new_file: options.new_entry,
                branch: options.branch.clone(),
            };
            persisted.push(self.upload_and_commit(entry, &commit).await?);
        }
        Ok(persisted)
    }
}
