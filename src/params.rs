/// Ordered form parameters, encoded as `application/x-www-form-urlencoded`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams(pub Vec<(String, String)>);

impl FormParams {
    /// Builds parameters from key/value pairs, keeping their order.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Appends one pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form-encodes the pairs; an empty set encodes to `""`.
    pub fn encode(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(&self.0)
    }
}

impl From<()> for FormParams {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<Vec<(String, String)>> for FormParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for FormParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::new(pairs)
    }
}

/// Inputs describing one logical request before execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSpec {
    /// HTTP verb. `GET` unless set; any valid token is accepted.
    pub method: String,
    /// Target URL without the form query string.
    pub url: String,
    /// Body parameters.
    pub params: FormParams,
    /// Attempt ceiling, at least 1.
    pub max_attempts: u32,
}

impl RequestSpec {
    /// A `GET` request with no parameters and a single attempt.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_owned(),
            url: url.into(),
            params: FormParams::default(),
            max_attempts: 1,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn params<P: Into<FormParams>>(mut self, params: P) -> Self {
        self.params = params.into();
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(key, value);
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{FormParams, RequestSpec};

    #[test]
    fn encode_preserves_order() {
        let params = FormParams::from([("x", "1"), ("y", "2")]);
        assert_eq!(params.encode().expect("must encode"), "x=1&y=2");
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        let params = FormParams::from([("q", "a b&c"), ("path", "/x=y")]);
        assert_eq!(
            params.encode().expect("must encode"),
            "q=a+b%26c&path=%2Fx%3Dy"
        );
    }

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert_eq!(FormParams::default().encode().expect("must encode"), "");
    }

    #[test]
    fn spec_defaults() {
        let spec = RequestSpec::new("https://api.test/items");
        assert_eq!(spec.method, "GET");
        assert_eq!(spec.max_attempts, 1);
        assert!(spec.params.is_empty());
    }

    #[test]
    fn spec_builder_appends_params() {
        let spec = RequestSpec::new("https://api.test")
            .params([("a", "1")])
            .param("b", "2");
        assert_eq!(
            spec.params,
            FormParams::new([("a", "1"), ("b", "2")])
        );
    }
}
