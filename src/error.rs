/// Error type returned by this crate.
///
/// Transport failures and HTTP error statuses are never reported here; they
/// are recorded in [`crate::RequestOutcome`]. These variants only cover
/// requests that could not be prepared or executors that could not be built.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// `max_attempts` was zero.
    #[error("max attempts must be at least 1")]
    InvalidAttempts,
    /// Custom request method is not a valid HTTP token.
    #[error("invalid request method '{0}'")]
    InvalidMethod(String),
    /// Form parameters could not be URL-encoded.
    #[error("form encode error: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    /// The underlying HTTP client could not be built.
    #[error("client build error: {0}")]
    Build(reqwest::Error),
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}
