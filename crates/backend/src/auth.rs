//! OAuth authorization for the GitLab backend.
//!
//! The backend does not own a UI. Authorization is abstracted behind
//! [`AuthorizationFlow`]: the host asks for a URL to send the user to,
//! then hands back the redirect it observed, and gets credentials out.

use url::Url;

use crate::error::{BackendError, Result};

/// Credentials for an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// A user identity decorated with its session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: u64,
    pub username: String,
    pub name: Option<String>,
    pub token: String,
}

/// Host-driven authorization capability.
///
/// `begin` yields the URL the host must navigate the user to;
/// `receive_redirect` extracts credentials from the URL the provider
/// redirected the user back to.
pub trait AuthorizationFlow: Send + Sync {
    fn begin(&self) -> Result<Url>;

    fn receive_redirect(&self, redirect_url: &str) -> Result<Credentials>;
}

/// OAuth implicit grant against a GitLab instance.
///
/// The access token comes back in the redirect's URL fragment.
#[derive(Debug, Clone)]
pub struct ImplicitGrantFlow {
    gitlab_root: String,
    client_id: String,
    redirect_uri: String,
}

impl ImplicitGrantFlow {
    pub fn new(
        gitlab_root: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            gitlab_root: gitlab_root.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

impl AuthorizationFlow for ImplicitGrantFlow {
    fn begin(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/oauth/authorize",
            self.gitlab_root.trim_end_matches('/')
        ))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "token")
            .append_pair("scope", "api");
        Ok(url)
    }

    fn receive_redirect(&self, redirect_url: &str) -> Result<Credentials> {
        let url = Url::parse(redirect_url)?;
        let fragment = url.fragment().ok_or_else(|| {
            BackendError::Authorization("redirect carried no URL fragment".to_string())
        })?;
        let token = url::form_urlencoded::parse(fragment.as_bytes())
            .find(|(key, _)| key == "access_token")
            .map(|(_, value)| value.into_owned())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                BackendError::Authorization("no access_token in redirect fragment".to_string())
            })?;
        Ok(Credentials::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> ImplicitGrantFlow {
        ImplicitGrantFlow::new(
            "https://gitlab.com/",
            "abc123",
            "https://cms.example.com/callback",
        )
    }

    #[test]
    fn begin_builds_implicit_grant_url() {
        let url = flow().begin().unwrap();
        assert_eq!(url.host_str(), Some("gitlab.com"));
        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("response_type".to_string(), "token".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "abc123".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "api".to_string())));
    }

    #[test]
    fn redirect_token_extracted_from_fragment() {
        let credentials = flow()
            .receive_redirect(
                "https://cms.example.com/callback#access_token=tok-1&token_type=Bearer&expires_in=7200",
            )
            .unwrap();
        assert_eq!(credentials.token, "tok-1");
    }

    #[test]
    fn redirect_token_found_among_later_params() {
        let credentials = flow()
            .receive_redirect("https://cms.example.com/callback#state=xyz&access_token=tok-2")
            .unwrap();
        assert_eq!(credentials.token, "tok-2");
    }

    #[test]
    fn redirect_without_fragment_is_rejected() {
        let err = flow()
            .receive_redirect("https://cms.example.com/callback?code=abc")
            .unwrap_err();
        assert!(matches!(err, BackendError::Authorization(_)));
    }

    #[test]
    fn redirect_without_token_is_rejected() {
        let err = flow()
            .receive_redirect("https://cms.example.com/callback#error=access_denied")
            .unwrap_err();
        assert!(matches!(err, BackendError::Authorization(_)));
    }
}
