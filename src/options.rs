use crate::{RequestError, Result};

/// Environment variable read by [`DebugMode::from_env`].
pub const DEBUG_ENV_VAR: &str = "FORM_REQUEST_DEBUG";

/// Debug flags consulted after every call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DebugMode {
    /// Capture a transport-level trace and emit it after each call.
    pub verbose: bool,
    /// Emit a debug trace after each call.
    pub request: bool,
}

impl DebugMode {
    /// Parses a comma or whitespace separated flag list, e.g. `"verbose,request"`.
    ///
    /// Unknown flags are rejected so that typos do not silently disable tracing.
    pub fn parse(value: &str) -> Result<Self> {
        let mut mode = Self::default();
        for flag in value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|flag| !flag.is_empty())
        {
            if flag.eq_ignore_ascii_case("verbose") {
                mode.verbose = true;
            } else if flag.eq_ignore_ascii_case("request") {
                mode.request = true;
            } else {
                return Err(RequestError::Config(format!(
                    "unknown debug flag '{flag}' in {DEBUG_ENV_VAR}"
                )));
            }
        }
        Ok(mode)
    }

    /// Reads flags from `FORM_REQUEST_DEBUG`. A missing variable means all flags off.
    pub fn from_env() -> Result<Self> {
        match std::env::var(DEBUG_ENV_VAR) {
            Ok(value) => Self::parse(&value),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(err) => Err(RequestError::Config(format!("{DEBUG_ENV_VAR}: {err}"))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.verbose || self.request
    }
}

/// Configures transport and debug behavior of a [`crate::RequestExecutor`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutorOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of redirects followed per attempt.
    pub max_redirects: usize,
    /// Skip TLS certificate and hostname verification.
    ///
    /// Off by default. Turning it on restores the legacy behavior of the
    /// API this helper was written against and is insecure.
    pub accept_invalid_certs: bool,
    /// Debug flags.
    pub debug: DebugMode,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_redirects: 10,
            accept_invalid_certs: false,
            debug: DebugMode::default(),
        }
    }
}

impl ExecutorOptions {
    /// Default options with debug flags taken from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            debug: DebugMode::from_env()?,
            ..Self::default()
        })
    }
}
