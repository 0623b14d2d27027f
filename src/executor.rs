use std::{fmt, fmt::Write as _, sync::Arc};

use crate::{
    prepare::{prepare, PreparedRequest},
    transport::{default_headers, ReqwestTransport, Transport, TransportRequest, TransportResponse},
    DebugSink, ExecutorOptions, RequestOutcome, RequestSpec, Result,
};

/// Attempt ceiling applied by [`RequestExecutor::post`].
pub const POST_ATTEMPTS: u32 = 5;

/// Issues form-encoded requests and retries them on server errors.
///
/// Holds only configuration; every call produces its own [`RequestOutcome`].
#[derive(Clone)]
pub struct RequestExecutor<T = ReqwestTransport> {
    transport: T,
    sink: Arc<dyn DebugSink>,
    options: ExecutorOptions,
}

impl<T> fmt::Debug for RequestExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &std::any::type_name::<T>())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor<ReqwestTransport> {
    /// Creates an executor with default options and a `reqwest` transport.
    pub fn new() -> Result<Self> {
        Self::with_options(ExecutorOptions::default())
    }

    /// Creates an executor with a `reqwest` transport configured from `options`.
    pub fn with_options(options: ExecutorOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(&options)?;
        Ok(Self::with_transport(transport, options))
    }

    /// Creates an executor whose debug flags come from `FORM_REQUEST_DEBUG`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use form_request::RequestExecutor;
    ///
    /// let executor = RequestExecutor::from_env().expect("invalid FORM_REQUEST_DEBUG");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::with_options(ExecutorOptions::from_env()?)
    }
}

impl<T: Transport> RequestExecutor<T> {
    /// Creates an executor over any [`Transport`].
    pub fn with_transport(transport: T, options: ExecutorOptions) -> Self {
        Self {
            transport,
            sink: default_sink(),
            options,
        }
    }

    /// Replaces the destination of automatic debug traces.
    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Sends `spec` as given: method defaults to `GET`, attempts to 1.
    pub async fn get(&self, spec: RequestSpec) -> Result<RequestOutcome> {
        self.execute(spec).await
    }

    /// Sends `spec` as `POST`, retrying up to [`POST_ATTEMPTS`] times on 5xx.
    ///
    /// The caller's method and attempt count are ignored.
    pub async fn post(&self, spec: RequestSpec) -> Result<RequestOutcome> {
        self.execute(spec.method("POST").max_attempts(POST_ATTEMPTS))
            .await
    }

    /// Sends `spec` as `DELETE`. Form parameters go into the query string.
    pub async fn delete(&self, spec: RequestSpec) -> Result<RequestOutcome> {
        self.execute(spec.method("DELETE")).await
    }

    /// Normalizes `spec`, runs the retry loop and captures the outcome.
    ///
    /// Only pre-flight problems are errors. Transport failures and HTTP error
    /// statuses are reported through the returned outcome.
    pub async fn execute(&self, spec: RequestSpec) -> Result<RequestOutcome> {
        let prepared = prepare(spec)?;
        let request = TransportRequest {
            method: prepared.method.clone(),
            url: prepared.url.clone(),
            payload: prepared.payload.clone(),
            headers: default_headers(),
            verbose: self.options.debug.verbose,
        };

        let (response, attempts) = self.perform_with_retry(&request, prepared.max_attempts).await;
        let outcome = self.capture(&prepared, response, attempts);

        let debug = self.options.debug;
        if debug.is_enabled() {
            if debug.request {
                outcome.emit_debug_trace(&[("Mode", "Request")], self.sink.as_ref());
            }
            if debug.verbose {
                outcome.emit_debug_trace(&[("Mode", "Verbose request")], self.sink.as_ref());
            }
        }

        Ok(outcome)
    }

    /// Runs the attempts. In verbose mode the returned response carries the
    /// traces of every attempt, each introduced by a `* attempt N` line.
    async fn perform_with_retry(
        &self,
        request: &TransportRequest,
        max_attempts: u32,
    ) -> (TransportResponse, u32) {
        let mut attempts = 0u32;
        let mut trace = request.verbose.then(String::new);
        loop {
            let mut response = self.transport.perform(request).await;
            attempts += 1;

            if let Some(trace) = trace.as_mut() {
                let _ = writeln!(trace, "* attempt {attempts} of {max_attempts}");
                if let Some(attempt_trace) = response.verbose_trace.take() {
                    trace.push_str(&attempt_trace);
                    if !attempt_trace.ends_with('\n') {
                        trace.push('\n');
                    }
                }
            }

            if !is_retryable_status(response.status) {
                response.verbose_trace = trace;
                return (response, attempts);
            }
            if attempts >= max_attempts {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    "giving up after {attempts} attempt(s)"
                );
                response.verbose_trace = trace;
                return (response, attempts);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                status = response.status,
                "retrying request, attempt {} of {max_attempts}",
                attempts + 1
            );
        }
    }

    fn capture(
        &self,
        prepared: &PreparedRequest,
        response: TransportResponse,
        attempts: u32,
    ) -> RequestOutcome {
        let effective_url = prepared.diagnostic_url(&response.effective_url);
        let verbose_trace = if self.options.debug.verbose {
            Some(response.verbose_trace.unwrap_or_default())
        } else {
            None
        };

        RequestOutcome::new(
            response.status,
            response.body,
            effective_url,
            prepared.method.as_str().to_owned(),
            verbose_trace,
            attempts,
        )
    }
}

fn is_retryable_status(status: u16) -> bool {
    status >= 500
}

#[cfg(feature = "tracing")]
fn default_sink() -> Arc<dyn DebugSink> {
    Arc::new(crate::TracingSink)
}

#[cfg(not(feature = "tracing"))]
fn default_sink() -> Arc<dyn DebugSink> {
    Arc::new(crate::WriterSink::stderr())
}
