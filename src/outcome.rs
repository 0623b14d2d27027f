use std::borrow::Cow;

use serde::de::DeserializeOwned;

use crate::DebugSink;

/// Status recorded when the transport never produced an HTTP status.
pub const NO_STATUS: u16 = 0;

/// Immutable record of one executed request, including all of its attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOutcome {
    status_code: u16,
    raw_body: Vec<u8>,
    effective_url: String,
    request_method: String,
    verbose_trace: Option<String>,
    attempts: u32,
}

impl RequestOutcome {
    pub(crate) fn new(
        status_code: u16,
        raw_body: Vec<u8>,
        effective_url: String,
        request_method: String,
        verbose_trace: Option<String>,
        attempts: u32,
    ) -> Self {
        Self {
            status_code,
            raw_body,
            effective_url,
            request_method,
            verbose_trace,
            attempts,
        }
    }

    /// Last observed status, or [`NO_STATUS`] when no response arrived.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// `true` only for status `200`. Other 2xx codes are not treated as success.
    pub fn is_successful(&self) -> bool {
        self.status_code == 200
    }

    /// Body bytes exactly as received.
    pub fn raw_result(&self) -> &[u8] {
        &self.raw_body
    }

    /// Body as text. Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_body)
    }

    /// Body parsed as JSON, or `None` when it is not valid JSON.
    pub fn decoded_result(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.raw_body).ok()
    }

    /// Body parsed into `T`, or `None` when it does not match.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(&self.raw_body).ok()
    }

    /// Final URL after redirects. POST bodies are appended as `?<body>`.
    pub fn effective_url(&self) -> &str {
        &self.effective_url
    }

    pub fn request_method(&self) -> &str {
        &self.request_method
    }

    /// Transport trace, present only when verbose mode was on.
    pub fn verbose_trace(&self) -> Option<&str> {
        self.verbose_trace.as_deref()
    }

    /// Number of transport calls made.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Writes a human-readable summary of this outcome to `sink`.
    ///
    /// Line order: `extra` pairs as given, the status line, the method and
    /// URL line, the verbose trace (when captured), the raw body, and a
    /// separator.
    pub fn emit_debug_trace<K, V>(&self, extra: &[(K, V)], sink: &dyn DebugSink) -> &Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (label, value) in extra {
            sink.write_line(&format!("{}: {}", label.as_ref(), value.as_ref()));
        }
        sink.write_line(&format!("HTTP {}", self.status_code));
        sink.write_line(&format!("{}: {}", self.request_method, self.effective_url));
        if let Some(trace) = &self.verbose_trace {
            sink.write_line("Verbose info:");
            for line in trace.lines() {
                sink.write_line(line);
            }
        }
        sink.write_line(&format!("Result: {:?}", self.raw_text()));
        sink.write_line("----");
        self
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::RequestOutcome;
    use crate::MemorySink;

    fn outcome(status: u16, body: &str) -> RequestOutcome {
        RequestOutcome::new(
            status,
            body.as_bytes().to_vec(),
            "https://api.test/items".to_owned(),
            "GET".to_owned(),
            None,
            1,
        )
    }

    #[test]
    fn success_is_exactly_200() {
        assert!(outcome(200, "").is_successful());
        for status in [0, 201, 204, 404, 503] {
            assert!(!outcome(status, "").is_successful(), "status {status}");
        }
    }

    #[test]
    fn decodes_json_body() {
        let decoded = outcome(200, r#"{"a":1}"#)
            .decoded_result()
            .expect("must decode");
        assert_eq!(decoded, json!({"a": 1}));
    }

    #[test]
    fn invalid_json_decodes_to_none_and_keeps_raw() {
        let outcome = outcome(200, "not json");
        assert!(outcome.decoded_result().is_none());
        assert_eq!(outcome.raw_result(), b"not json");
    }

    #[test]
    fn raw_result_keeps_invalid_utf8() {
        let outcome = RequestOutcome::new(
            200,
            vec![0xff, b'a', 0xfe],
            "https://api.test/items".to_owned(),
            "GET".to_owned(),
            None,
            1,
        );
        assert_eq!(outcome.raw_result(), [0xff, b'a', 0xfe]);
        assert_eq!(outcome.raw_text(), "\u{fffd}a\u{fffd}");
        assert!(outcome.decoded_result().is_none());
    }

    #[test]
    fn decode_as_typed() {
        #[derive(Deserialize)]
        struct Item {
            id: u32,
        }

        let outcome = outcome(200, r#"{"id":7,"name":"kit"}"#);
        assert_eq!(outcome.decode_as::<Item>().map(|item| item.id), Some(7));
        assert!(outcome.decode_as::<Vec<u32>>().is_none());
    }

    #[test]
    fn debug_trace_line_order() {
        let sink = MemorySink::new();
        let outcome = RequestOutcome::new(
            404,
            b"missing".to_vec(),
            "https://api.test/items?x=1".to_owned(),
            "DELETE".to_owned(),
            Some("> DELETE /items?x=1\n< HTTP/1.1 404".to_owned()),
            1,
        );

        let returned = outcome.emit_debug_trace(&[("Mode", "Request"), ("Caller", "sync")], &sink);

        assert_eq!(returned, &outcome);
        assert_eq!(
            sink.lines(),
            vec![
                "Mode: Request",
                "Caller: sync",
                "HTTP 404",
                "DELETE: https://api.test/items?x=1",
                "Verbose info:",
                "> DELETE /items?x=1",
                "< HTTP/1.1 404",
                "Result: \"missing\"",
                "----",
            ]
        );
    }

    #[test]
    fn debug_trace_skips_verbose_without_trace() {
        let sink = MemorySink::new();
        outcome(200, "ok").emit_debug_trace::<&str, &str>(&[], &sink);
        assert!(!sink.lines().iter().any(|line| line == "Verbose info:"));
        assert_eq!(sink.lines().len(), 4);
    }
}
