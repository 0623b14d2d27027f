//! `form-request` is a small async helper for form-encoded HTTP APIs.
//!
//! A [`RequestExecutor`] sends one logical request per call:
//! - [`RequestExecutor::get`]
//! - [`RequestExecutor::post`] (always retried up to 5 times on 5xx)
//! - [`RequestExecutor::delete`]
//!
//! Server errors (status >= 500) are retried immediately up to the attempt
//! ceiling. Every other status, including `0` for calls that never got a
//! response, ends the call. The result is an immutable [`RequestOutcome`].

mod error;
mod executor;
mod options;
mod outcome;
mod params;
mod prepare;
mod sink;
pub mod transport;

pub use error::RequestError;
pub use executor::{RequestExecutor, POST_ATTEMPTS};
pub use options::{DebugMode, ExecutorOptions, DEBUG_ENV_VAR};
pub use outcome::{RequestOutcome, NO_STATUS};
pub use params::{FormParams, RequestSpec};
#[cfg(feature = "tracing")]
pub use sink::TracingSink;
pub use sink::{DebugSink, MemorySink, WriterSink};
pub use transport::{ReqwestTransport, Transport};

pub type Result<T> = std::result::Result<T, RequestError>;
