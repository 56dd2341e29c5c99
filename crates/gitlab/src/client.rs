//! GitLab REST client.
//!
//! [`Api`] wraps the handful of GitLab v4 endpoints the editorial backend
//! needs: identity, membership, tree listings, file content, and commits.
//! The client is immutable after construction — the session token is
//! supplied at build time and a new client is built per authenticated
//! session.

use std::sync::Arc;

use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use folio_cache::{AssetCache, MemoryCache};

use crate::codec;
use crate::error::{GitlabError, Result};
use crate::types::{
    ErrorBody, Membership, ProjectInfo, RepoFile, TreeEntry, TreeEntryKind, UserInfo,
};

pub const DEFAULT_API_ROOT: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Response header naming the next page of a paginated listing.
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Everything `encodeURIComponent` escapes, minus the unreserved marks.
const PATH_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single URL path component, `/` included.
pub(crate) fn encode_path_component(value: &str) -> String {
    utf8_percent_encode(value, PATH_COMPONENT).to_string()
}

/// Client for a single GitLab project on a single branch.
#[derive(Clone)]
pub struct Api {
    http: reqwest::Client,
    api_root: String,
    project: String,
    project_segment: String,
    branch: String,
    token: Option<String>,
    per_page: u32,
    cache: Arc<dyn AssetCache>,
}

/// Builder for [`Api`].
pub struct ApiBuilder {
    api_root: String,
    project: String,
    branch: String,
    token: Option<String>,
    per_page: u32,
    cache: Option<Arc<dyn AssetCache>>,
    http: Option<reqwest::Client>,
}

impl ApiBuilder {
    /// Start a builder for the given project path (`group/repo`).
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            project: project.into(),
            branch: DEFAULT_BRANCH.to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            cache: None,
            http: None,
        }
    }

    /// Set the API root, e.g. `https://gitlab.example.com/api/v4`.
    pub fn api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the bearer token for authenticated requests.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Page size requested from listing endpoints.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Cache consulted before file reads keyed by blob id.
    pub fn cache(mut self, cache: Arc<dyn AssetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Api> {
        if self.project.is_empty() {
            return Err(GitlabError::InvalidConfiguration(
                "project path must not be empty".to_string(),
            ));
        }
        let api_root = self.api_root.trim_end_matches('/').to_string();
        Url::parse(&api_root)?;

        let project_segment = encode_path_component(&self.project);
        Ok(Api {
            http: self.http.unwrap_or_default(),
            api_root,
            project: self.project,
            project_segment,
            branch: self.branch.trim().to_string(),
            token: self.token,
            per_page: self.per_page,
            cache: self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new())),
        })
    }
}

impl Api {
    pub fn builder(project: impl Into<String>) -> ApiBuilder {
        ApiBuilder::new(project)
    }

    /// The configured branch.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The configured project path.
    pub fn project_path(&self) -> &str {
        &self.project
    }

    pub(crate) fn project_url(&self) -> String {
        format!("/projects/{}", self.project_segment)
    }

    pub(crate) fn file_url(&self, path: &str) -> String {
        format!(
            "{}/repository/files/{}",
            self.project_url(),
            encode_path_component(path)
        )
    }

    /// Build the request URL: api root + path, a cache-busting `ts`
    /// millisecond timestamp, then the caller's query parameters.
    fn url_for(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.api_root, path))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ts", &Utc::now().timestamp_millis().to_string());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Send a request, mapping any non-2xx response to [`GitlabError::Api`]
    /// with the parsed error body.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            return Err(GitlabError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Fetch a single JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url_for(path, params)?;
        debug!("GET {}", url.path());
        let response = self.execute(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    /// Post a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url_for(path, &[])?;
        debug!("POST {}", url.path());
        let response = self
            .execute(self.request(Method::POST, url).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch every page of a JSON listing, concatenating the pages' items.
    ///
    /// Each page must decode to a top-level array. The `x-next-page` header
    /// value is folded back in as the `page` query parameter until the
    /// header comes back absent or empty.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut accumulated = Vec::new();
        let mut next_page: Option<String> = None;
        loop {
            let page = next_page.take();
            let mut page_params = params.to_vec();
            if let Some(page) = page.as_deref() {
                page_params.push(("page", page));
            }
            let url = self.url_for(path, &page_params)?;
            debug!("GET {} (page {})", url.path(), page.as_deref().unwrap_or("1"));
            let response = self.execute(self.request(Method::GET, url)).await?;
            let next = next_page_of(response.headers());
            let body: serde_json::Value = response.json().await?;
            match body {
                serde_json::Value::Array(items) => {
                    accumulated.reserve(items.len());
                    for item in items {
                        accumulated.push(serde_json::from_value(item)?);
                    }
                }
                other => {
                    let kind = other
                        .get("type")
                        .and_then(|t| t.as_str())
                        .unwrap_or_else(|| json_kind(&other))
                        .to_string();
                    return Err(GitlabError::UnexpectedPayload { kind });
                }
            }
            match next {
                Some(page) if !page.is_empty() => next_page = Some(page),
                _ => return Ok(accumulated),
            }
        }
    }

    /// Fetch every page of a text endpoint, concatenating the bodies in
    /// page order.
    pub async fn get_paginated_text(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut accumulated = String::new();
        let mut next_page: Option<String> = None;
        loop {
            let page = next_page.take();
            let mut page_params = params.to_vec();
            if let Some(page) = page.as_deref() {
                page_params.push(("page", page));
            }
            let url = self.url_for(path, &page_params)?;
            let response = self.execute(self.request(Method::GET, url)).await?;
            let next = next_page_of(response.headers());
            accumulated.push_str(&response.text().await?);
            match next {
                Some(page) if !page.is_empty() => next_page = Some(page),
                _ => return Ok(accumulated),
            }
        }
    }

    /// The authenticated identity.
    pub async fn user(&self) -> Result<UserInfo> {
        self.get_json("/user", &[]).await
    }

    /// Project metadata.
    pub async fn project_info(&self) -> Result<ProjectInfo> {
        self.get_json(&self.project_url(), &[]).await
    }

    /// The group's full path when the project lives in a group namespace.
    pub async fn group_path(&self) -> Result<Option<String>> {
        let project = self.project_info().await?;
        Ok((project.namespace.kind == "group").then_some(project.namespace.full_path))
    }

    /// Whether `user` holds at least Developer access on the project or its
    /// owning group.
    pub async fn has_write_access(&self, user: &UserInfo) -> Result<bool> {
        let members_path = match self.group_path().await? {
            Some(group) => format!(
                "/groups/{}/members/{}",
                encode_path_component(&group),
                user.id
            ),
            None => format!("{}/members/{}", self.project_url(), user.id),
        };
        match self.get_json::<Membership>(&members_path, &[]).await {
            Ok(member) => Ok(member.can_write()),
            // A missing membership is a 404 with a "message" body; a 404
            // with an "error" body means the URI was wrong and propagates.
            Err(err) if err.is_missing_member() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// List the blob entries under `path` on the configured branch.
    pub async fn list_files(&self, path: &str) -> Result<Vec<TreeEntry>> {
        let per_page = self.per_page.to_string();
        let params = [("path", path), ("ref", &self.branch), ("per_page", &per_page)];
        let tree_url = format!("{}/repository/tree", self.project_url());
        let entries = self
            .get_paginated::<TreeEntry>(&tree_url, &params)
            .await
            .map_err(|err| match err {
                GitlabError::UnexpectedPayload { kind } => GitlabError::NotADirectory {
                    path: path.to_string(),
                    kind,
                },
                other => other,
            })?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == TreeEntryKind::Blob)
            .collect())
    }

    /// Read and decode a file's content.
    ///
    /// When `id` is given the cache is consulted first and populated after a
    /// successful read; reads without an id always hit the network.
    pub async fn read_file(
        &self,
        path: &str,
        id: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Vec<u8>> {
        let cache_key = id.map(|id| format!("gl.{id}"));
        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.get(key).await? {
                return Ok(cached);
            }
        }

        let branch = branch.unwrap_or(&self.branch);
        debug!("fetching {} at {}", path, branch);
        let file: RepoFile = self
            .get_json(&self.file_url(path), &[("ref", branch)])
            .await?;
        let content = match file.encoding.as_deref() {
            Some("base64") | None => codec::from_base64(&file.content)?,
            _ => file.content.into_bytes(),
        };

        if let Some(key) = &cache_key {
            self.cache.set(key, content.clone()).await?;
        }
        Ok(content)
    }

    /// Metadata-only existence check: 404 is "does not exist", any other
    /// failure propagates.
    pub async fn file_exists(&self, path: &str, branch: Option<&str>) -> Result<bool> {
        let branch = branch.unwrap_or(&self.branch);
        let url = self.url_for(&self.file_url(path), &[("ref", branch)])?;
        let response = self.request(Method::HEAD, url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status.as_u16() == 404 {
            Ok(false)
        } else {
            Err(GitlabError::Api {
                status: status.as_u16(),
                body: ErrorBody::default(),
            })
        }
    }

    /// Delete a file on `branch` with the given commit message.
    pub async fn delete_file(
        &self,
        path: &str,
        message: &str,
        branch: Option<&str>,
    ) -> Result<()> {
        let branch = branch.unwrap_or(&self.branch);
        let url = self.url_for(
            &self.file_url(path),
            &[("branch", branch), ("commit_message", message)],
        )?;
        debug!("DELETE {}", url.path());
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

fn next_page_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn encodes_project_path_separator() {
        assert_eq!(encode_path_component("group/repo"), "group%2Frepo");
        assert_eq!(
            encode_path_component("posts/2024/hello.md"),
            "posts%2F2024%2Fhello.md"
        );
    }

    #[test]
    fn keeps_unreserved_characters() {
        assert_eq!(encode_path_component("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn builder_applies_defaults() {
        let api = Api::builder("group/repo").build().unwrap();
        assert_eq!(api.branch(), DEFAULT_BRANCH);
        assert_eq!(api.per_page, DEFAULT_PER_PAGE);
        assert_eq!(api.api_root, DEFAULT_API_ROOT);
        assert_eq!(api.project_url(), "/projects/group%2Frepo");
    }

    #[test]
    fn builder_trims_branch_whitespace() {
        let api = Api::builder("g/r").branch(" main ").build().unwrap();
        assert_eq!(api.branch(), "main");
    }

    #[test]
    fn builder_rejects_empty_project() {
        assert!(Api::builder("").build().is_err());
    }

    #[test]
    fn builder_rejects_invalid_api_root() {
        assert!(Api::builder("g/r").api_root("not a url").build().is_err());
    }

    #[test]
    fn file_url_encodes_path() {
        let api = Api::builder("group/repo").build().unwrap();
        assert_eq!(
            api.file_url("posts/hello world.md"),
            "/projects/group%2Frepo/repository/files/posts%2Fhello%20world.md"
        );
    }

    #[test]
    fn url_for_carries_ts_and_params() {
        let api = Api::builder("g/r").build().unwrap();
        let url = api.url_for("/user", &[("ref", "main")]).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0].0, "ts");
        assert!(pairs.contains(&("ref".to_string(), "main".to_string())));
    }

    #[test]
    fn next_page_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page_of(&headers), None);
        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static("2"));
        assert_eq!(next_page_of(&headers), Some("2".to_string()));
        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static(""));
        assert_eq!(next_page_of(&headers), Some(String::new()));
    }
}
