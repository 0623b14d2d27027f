use reqwest::Method;

use crate::{RequestError, RequestSpec};

/// A normalized request, ready for the retry loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PreparedRequest {
    pub method: Method,
    /// URL sent to the transport; carries the query string for non-POST bodies.
    pub url: String,
    /// Form body, only for `POST`.
    pub payload: Option<String>,
    pub max_attempts: u32,
}

impl PreparedRequest {
    /// URL recorded in the outcome, with the POST body appended for diagnostics.
    pub fn diagnostic_url(&self, effective_url: &str) -> String {
        match &self.payload {
            Some(payload) => format!("{effective_url}?{payload}"),
            None => effective_url.to_owned(),
        }
    }
}

pub(crate) fn prepare(spec: RequestSpec) -> Result<PreparedRequest, RequestError> {
    if spec.max_attempts == 0 {
        return Err(RequestError::InvalidAttempts);
    }

    let method = normalize_method(&spec.method)?;
    let encoded = spec.params.encode()?;

    let (url, payload) = if encoded.is_empty() {
        (spec.url, None)
    } else if method == Method::POST {
        (spec.url, Some(encoded))
    } else {
        (format!("{}?{encoded}", spec.url), None)
    };

    Ok(PreparedRequest {
        method,
        url,
        payload,
        max_attempts: spec.max_attempts,
    })
}

fn normalize_method(method: &str) -> Result<Method, RequestError> {
    let trimmed = method.trim();
    if trimmed.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(trimmed.as_bytes())
        .map_err(|_| RequestError::InvalidMethod(method.to_owned()))
}
