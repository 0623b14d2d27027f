use std::{fmt::Write as _, future::Future, time::Duration};

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    redirect, Method,
};

use crate::{outcome::NO_STATUS, ExecutorOptions, RequestError, Result};

/// One transport call, as built by the executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    /// Final URL, including any form query string.
    pub url: String,
    /// Form-encoded body, sent only for `POST`.
    pub payload: Option<String>,
    pub headers: HeaderMap,
    /// Capture a transport trace for this call.
    pub verbose: bool,
}

/// What the transport observed for one call.
///
/// A call that never produced a status (DNS, connect, TLS, timeout) is
/// reported with `status == 0` and an empty body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Body bytes as received, without charset or content decoding.
    pub body: Vec<u8>,
    /// URL after redirects.
    pub effective_url: String,
    pub verbose_trace: Option<String>,
}

/// Performs a single HTTP exchange. Implementations must accept arbitrary verbs.
pub trait Transport: Send + Sync {
    fn perform(&self, request: &TransportRequest) -> impl Future<Output = TransportResponse> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn perform(&self, request: &TransportRequest) -> impl Future<Output = TransportResponse> + Send {
        (**self).perform(request)
    }
}

/// Headers sent with every request.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("text/plain"));
    headers
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with the redirect, timeout and TLS settings from `options`.
    ///
    /// Idle connections are not kept between calls.
    pub fn new(options: &ExecutorOptions) -> Result<Self> {
        if options.accept_invalid_certs {
            #[cfg(feature = "tracing")]
            tracing::warn!("TLS certificate verification is disabled for outbound requests");
        }

        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::limited(options.max_redirects))
            .timeout(Duration::from_millis(options.timeout_ms))
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(RequestError::Build)?;

        Ok(Self { http })
    }

    async fn send(&self, request: &TransportRequest) -> TransportResponse {
        let mut trace = request.verbose.then(|| request_trace(request));

        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(payload) = &request.payload {
            builder = builder.body(payload.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(url = %request.url, "request failed without status: {err}");

                if let Some(trace) = trace.as_mut() {
                    let _ = writeln!(trace, "* {err}");
                }
                return TransportResponse {
                    status: NO_STATUS,
                    body: Vec::new(),
                    effective_url: err
                        .url()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| request.url.clone()),
                    verbose_trace: trace,
                };
            }
        };

        let status = response.status();
        let effective_url = response.url().to_string();
        if let Some(trace) = trace.as_mut() {
            let _ = writeln!(
                trace,
                "< {:?} {} {}",
                response.version(),
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
            write_headers(trace, '<', response.headers());
        }

        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(url = %effective_url, "failed to read response body: {err}");

                if let Some(trace) = trace.as_mut() {
                    let _ = writeln!(trace, "* body read failed: {err}");
                }
                Vec::new()
            }
        };

        TransportResponse {
            status: status.as_u16(),
            body,
            effective_url,
            verbose_trace: trace,
        }
    }
}

impl Transport for ReqwestTransport {
    fn perform(&self, request: &TransportRequest) -> impl Future<Output = TransportResponse> + Send {
        self.send(request)
    }
}

fn request_trace(request: &TransportRequest) -> String {
    let mut trace = String::new();
    let _ = writeln!(trace, "> {} {}", request.method, request.url);
    write_headers(&mut trace, '>', &request.headers);
    if let Some(payload) = &request.payload {
        let _ = writeln!(trace, "> [{} bytes form body]", payload.len());
    }
    trace
}

fn write_headers(trace: &mut String, direction: char, headers: &HeaderMap) {
    for (name, value) in headers {
        let _ = writeln!(
            trace,
            "{direction} {name}: {}",
            value.to_str().unwrap_or("<binary>")
        );
    }
}
