//! Inbound OWS request view.

use url::form_urlencoded;

/// KVP request parameters with case-insensitive names.
///
/// Parameter names are matched ignoring ASCII case, as OWS requires for KVP
/// encodings. A name may appear more than once; [`KvpParams::get`] returns the
/// first value and [`KvpParams::set`] replaces them all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvpParams {
    pairs: Vec<(String, String)>,
}

impl KvpParams {
    /// Build from raw name/value pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    /// First value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a parameter, treating an empty value as absent.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Set a parameter, replacing every existing value for that name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.pairs.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.pairs.push((name, value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Immutable view of one inbound OWS call.
///
/// `base_uri` is the scheme and authority the client used (for example
/// `http://localhost:8080`); `path` and `query` are the request target as
/// received. Handlers build every outbound link from these.
#[derive(Debug, Clone)]
pub struct OwsRequest {
    method: String,
    base_uri: String,
    path: String,
    query: String,
    params: KvpParams,
    accept: Option<String>,
}

impl OwsRequest {
    /// Create a request whose parameters are parsed from `query`.
    pub fn new(
        method: impl Into<String>,
        base_uri: impl Into<String>,
        path: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        let query = query.into();
        let params = KvpParams::from_query(&query);
        Self {
            method: method.into(),
            base_uri: base_uri.into().trim_end_matches('/').to_string(),
            path: path.into(),
            query,
            params,
            accept: None,
        }
    }

    /// Shorthand for a GET request against [`crate::OWS_PATH`].
    pub fn get(base_uri: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new("GET", base_uri, crate::OWS_PATH, query)
    }

    /// Replace the parameter set (e.g. with form-encoded POST body pairs),
    /// leaving the request URI untouched.
    pub fn with_params(mut self, params: KvpParams) -> Self {
        self.params = params;
        self
    }

    /// Add or override a parameter without changing the request URI.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.set(name, value);
        self
    }

    /// Attach the client's `Accept` header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Media types from the `Accept` header, in the order given, without parameters.
    pub fn accepted_media_types(&self) -> Vec<&str> {
        self.accept
            .as_deref()
            .map(|accept| {
                accept
                    .split(',')
                    .filter_map(|entry| entry.split(';').next())
                    .map(str::trim)
                    .filter(|media_type| !media_type.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get_non_empty(name)
    }

    /// The SERVICE parameter.
    pub fn service(&self) -> Option<&str> {
        self.param("service")
    }

    /// The VERSION parameter, falling back to the first ACCEPTVERSIONS entry.
    pub fn version(&self) -> Option<&str> {
        self.param("version").or_else(|| {
            self.param("acceptversions")
                .and_then(|versions| versions.split(',').map(str::trim).find(|v| !v.is_empty()))
        })
    }

    /// The REQUEST parameter (the operation name).
    pub fn operation(&self) -> Option<&str> {
        self.param("request")
    }

    /// The full URI the client requested.
    pub fn absolute_uri(&self) -> String {
        if self.query.is_empty() {
            format!("{}{}", self.base_uri, self.path)
        } else {
            format!("{}{}?{}", self.base_uri, self.path, self.query)
        }
    }

    /// Absolute URI for `path` on this server, with `pairs` as its encoded query.
    pub fn build_absolute_uri(&self, path: &str, pairs: &[(&str, &str)]) -> String {
        if pairs.is_empty() {
            return format!("{}{}", self.base_uri, path);
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}{}?{}", self.base_uri, path, query)
    }

    /// The request's own URI with one query parameter replaced (or added).
    pub fn absolute_uri_with(&self, name: &str, value: &str) -> String {
        let mut params = KvpParams::from_query(&self.query);
        params.set(name, value);
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        format!("{}{}?{}", self.base_uri, self.path, query)
    }
}
