//! GitLab implementation of the editorial backend.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info};

use folio_cache::{AssetCache, MemoryCache};
use folio_gitlab::Api;
use folio_types::{
    Collection, FetchedFile, FileHandle, FilePayload, MediaRecord, PersistOptions, file_extension,
    trim_leading_slash,
};

use crate::auth::{AuthenticatedUser, Credentials};
use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::traits::EditorialBackend;

/// Cap on simultaneous file downloads in [`GitLabBackend::fetch_files`].
pub const MAX_CONCURRENT_DOWNLOADS: usize = 10;

/// An authenticated session: the token and the client bound to it.
///
/// Constructed whole on login, dropped whole on logout; the client is
/// never mutated in between.
struct Session {
    token: String,
    api: Api,
}

/// Editorial backend over a GitLab repository.
pub struct GitLabBackend {
    config: BackendConfig,
    cache: Arc<dyn AssetCache>,
    session: RwLock<Option<Session>>,
}

impl GitLabBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        Self::with_cache(config, Arc::new(MemoryCache::new()))
    }

    /// Use a host-supplied cache instead of the in-memory default.
    pub fn with_cache(config: BackendConfig, cache: Arc<dyn AssetCache>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache,
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn build_api(&self, token: &str) -> Result<Api> {
        Ok(Api::builder(self.config.repo.as_str())
            .api_root(self.config.api_root())
            .branch(self.config.branch.as_str())
            .per_page(self.config.per_page)
            .token(token)
            .cache(Arc::clone(&self.cache))
            .build()?)
    }

    /// Client of the current session.
    async fn api(&self) -> Result<Api> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.api.clone())
            .ok_or(BackendError::NotAuthenticated)
    }

    async fn open_session(&self, token: String) -> Result<AuthenticatedUser> {
        let api = self.build_api(&token)?;
        let user = api.user().await?;
        if !api.has_write_access(&user).await? {
            return Err(BackendError::NoWriteAccess);
        }
        info!("authenticated as {}", user.username);

        let authenticated = AuthenticatedUser {
            id: user.id,
            username: user.username,
            name: user.name,
            token: token.clone(),
        };
        *self.session.write().await = Some(Session { token, api });
        Ok(authenticated)
    }

    /// Fetch a batch of files with at most [`MAX_CONCURRENT_DOWNLOADS`]
    /// reads in flight.
    ///
    /// Every download settles before the first failure, if any, is
    /// surfaced; in-flight siblings are never cancelled. On success the
    /// result holds one pair per requested file, in no particular order of
    /// completion.
    pub async fn fetch_files(&self, files: Vec<FileHandle>) -> Result<Vec<FetchedFile>> {
        let api = self.api().await?;
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_DOWNLOADS));
        let downloads = files.into_iter().map(|file| {
            let api = api.clone();
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.unwrap();
                let data = api.read_file(&file.path, file.id.as_deref(), None).await?;
                Ok::<FetchedFile, BackendError>(FetchedFile { file, data })
            }
        });
        join_all(downloads).await.into_iter().collect()
    }
}

#[async_trait]
impl EditorialBackend for GitLabBackend {
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthenticatedUser> {
        self.open_session(credentials.token).await
    }

    async fn restore_user(&self, user: AuthenticatedUser) -> Result<AuthenticatedUser> {
        self.open_session(user.token).await
    }

    async fn logout(&self) {
        *self.session.write().await = None;
        debug!("session discarded");
    }

    async fn token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.token.clone())
    }

    async fn entries_by_folder(
        &self,
        collection: &Collection,
        extension: &str,
    ) -> Result<Vec<FetchedFile>> {
        let folder = collection.folder.as_deref().ok_or_else(|| {
            BackendError::InvalidConfiguration(format!(
                "collection '{}' has no folder",
                collection.name
            ))
        })?;
        let api = self.api().await?;
        let handles: Vec<FileHandle> = api
            .list_files(folder)
            .await?
            .into_iter()
            .filter(|entry| file_extension(&entry.name) == extension)
            .map(|entry| FileHandle::with_id(entry.path, entry.id))
            .collect();
        debug!("fetching {} entries from {}", handles.len(), folder);
        self.fetch_files(handles).await
    }

    async fn entries_by_files(&self, collection: &Collection) -> Result<Vec<FetchedFile>> {
        let handles: Vec<FileHandle> = collection
            .files
            .iter()
            .map(|file| FileHandle {
                path: file.file.clone(),
                id: None,
                label: file.label.clone(),
            })
            .collect();
        self.fetch_files(handles).await
    }

    async fn get_entry(&self, path: &str) -> Result<FetchedFile> {
        let api = self.api().await?;
        let data = api.read_file(path, None, None).await?;
        Ok(FetchedFile {
            file: FileHandle::new(path),
            data,
        })
    }

    async fn get_media(&self) -> Result<Vec<MediaRecord>> {
        let api = self.api().await?;
        let entries = api.list_files(&self.config.media_folder).await?;
        Ok(entries
            .into_iter()
            .map(|entry| MediaRecord {
                id: Some(entry.id),
                name: entry.name,
                size: None,
                url: self.config.raw_url(&entry.path),
                path: entry.path,
            })
            .collect())
    }

    async fn persist_entry(
        &self,
        entry: FilePayload,
        media: Vec<FilePayload>,
        options: &PersistOptions,
    ) -> Result<FilePayload> {
        let api = self.api().await?;
        let receipt = entry.clone();
        api.persist_files(Some(entry), media, options).await?;
        Ok(receipt.mark_uploaded())
    }

    async fn persist_media(
        &self,
        media: FilePayload,
        options: &PersistOptions,
    ) -> Result<MediaRecord> {
        let api = self.api().await?;
        let path = trim_leading_slash(&media.path).to_string();
        let name = media.name.clone();
        let size = media.content.len() as u64;
        let url = self.config.raw_url(&media.path);
        api.persist_files(None, vec![media], options).await?;
        Ok(MediaRecord {
            id: None,
            name,
            size: Some(size),
            url,
            path,
        })
    }

    async fn delete_file(&self, path: &str, message: &str, branch: Option<&str>) -> Result<()> {
        let api = self.api().await?;
        Ok(api.delete_file(path, message, branch).await?)
    }
}
