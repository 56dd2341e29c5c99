use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Not authenticated with GitLab")]
    NotAuthenticated,

    #[error("Your GitLab user account does not have access to this repo.")]
    NoWriteAccess,

    #[error("Invalid backend configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Authorization flow error: {0}")]
    Authorization(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Api(#[from] folio_gitlab::GitlabError),
}

pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_pass_through_transparently() {
        let inner = folio_gitlab::GitlabError::InvalidConfiguration("bad".to_string());
        let outer = BackendError::from(inner);
        assert_eq!(outer.to_string(), "Invalid configuration: bad");
    }
}
