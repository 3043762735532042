//! Read-only snapshot of an inbound request.
//!
//! Framework adapters build a [`RequestView`] once per request, either field by
//! field through the builder, from an absolute [`url::Url`], or from an
//! [`http::Request`].

use std::collections::HashMap;

use url::Url;

/// Header name to ordered values.
///
/// Names are stored in lowercase, the canonical form `http` uses, so every
/// lookup matches regardless of how the transport or the caller spelled the
/// name. Values for the same name keep their arrival order.
///
/// ```rust
/// use httptrace::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.append("X-Req-Id", " a ");
/// headers.append("x-req-id", "b");
///
/// assert_eq!(headers.get_all("X-REQ-ID").map(|v| v.len()), Some(2));
/// assert_eq!(headers.get("x-req-id"), Some(" a "));
/// assert_eq!(headers.get_joined("X-Req-Id").as_deref(), Some(" a ,b"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: HashMap<String, Vec<String>>,
}

impl HeaderMap {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, keeping any existing values for the name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(canonical_name(name.into()))
            .or_default()
            .push(value.into());
    }

    /// Replaces all values for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(canonical_name(name.into()), vec![value.into()]);
    }

    /// Returns every value for the header name.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .get(name.to_ascii_lowercase().as_str())
            .map(Vec::as_slice)
    }

    /// Returns the first value for the header name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns all values for the header name joined with `,`.
    pub fn get_joined(&self, name: &str) -> Option<String> {
        self.get_all(name).map(|values| values.join(","))
    }

    /// Returns `true` if the header name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over lowercase header names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

fn canonical_name(mut name: String) -> String {
    name.make_ascii_lowercase();
    name
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl From<&http::HeaderMap> for HeaderMap {
    fn from(headers: &http::HeaderMap) -> Self {
        let mut map = Self::new();
        for (name, value) in headers {
            // Non-visible-ASCII values are kept lossily rather than dropped.
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            map.append(name.as_str(), value);
        }
        map
    }
}

/// Immutable snapshot of an inbound HTTP request.
///
/// `path` and `fragment` are stored already escaped; nothing in this crate
/// decodes them.
///
/// ## Example
///
/// ```rust
/// use httptrace::RequestView;
///
/// let view = RequestView::builder()
///     .method("GET")
///     .host("example.com")
///     .path("/items")
///     .query("page=2")
///     .secure(true)
///     .build();
///
/// assert_eq!(view.method(), "GET");
/// assert_eq!(view.scheme(), "");
/// assert!(view.is_secure());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct RequestView {
    /// HTTP method.
    #[builder(into, default)]
    method: String,
    /// Scheme from the request URL, empty when the server did not see one.
    #[builder(into, default)]
    scheme: String,
    /// Host, possibly with port; empty when unknown.
    #[builder(into, default)]
    host: String,
    /// Escaped path.
    #[builder(into, default)]
    path: String,
    /// Raw query without the leading `?`.
    #[builder(into, default)]
    query: String,
    /// Escaped fragment without the leading `#`.
    #[builder(into, default)]
    fragment: String,
    /// Request headers.
    #[builder(default)]
    headers: HeaderMap,
    /// Peer address, usually `ip:port`.
    #[builder(into, default)]
    remote_addr: String,
    /// Whether the connection was made over TLS.
    #[builder(default)]
    secure: bool,
}

impl RequestView {
    /// Builds a view from an absolute URL.
    ///
    /// ```rust
    /// use httptrace::RequestView;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://example.com:8443/items?token=abc#frag").unwrap();
    /// let view = RequestView::from_url("GET", &url);
    /// assert_eq!(view.host(), "example.com:8443");
    /// assert_eq!(view.query(), "token=abc");
    /// assert_eq!(view.fragment(), "frag");
    /// ```
    pub fn from_url(method: impl Into<String>, url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        Self {
            method: method.into(),
            scheme: url.scheme().to_string(),
            host,
            path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
            fragment: url.fragment().unwrap_or_default().to_string(),
            secure: url.scheme() == "https",
            ..Self::default()
        }
    }

    /// Builds a view from an `http::Request`.
    ///
    /// The host comes from the URI authority without any userinfo, falling
    /// back to the `Host` header. Server-side request URIs usually carry only
    /// a path and query, in which case the scheme stays empty. Set the peer address and TLS flag
    /// with [`with_remote_addr`](Self::with_remote_addr) and
    /// [`with_secure`](Self::with_secure).
    pub fn from_http_request<B>(request: &http::Request<B>) -> Self {
        let uri = request.uri();
        let headers = HeaderMap::from(request.headers());
        // Userinfo in an absolute-form URI never reaches the span.
        let host = match uri.authority() {
            Some(authority) => match authority.port_u16() {
                Some(port) => format!("{}:{}", authority.host(), port),
                None => authority.host().to_string(),
            },
            None => headers.get("host").unwrap_or_default().to_string(),
        };
        Self {
            method: request.method().as_str().to_string(),
            scheme: uri.scheme_str().unwrap_or_default().to_string(),
            host,
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
            fragment: String::new(),
            secure: uri.scheme() == Some(&http::uri::Scheme::HTTPS),
            headers,
            remote_addr: String::new(),
        }
    }

    /// Sets the peer address.
    #[must_use]
    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = remote_addr.into();
        self
    }

    /// Sets whether the connection was made over TLS.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the URL scheme, possibly empty.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host, possibly empty.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the escaped path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the escaped fragment.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the peer address.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Returns `true` if the connection was made over TLS.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns the first `User-Agent` value, or `""`.
    pub fn user_agent(&self) -> &str {
        self.headers.get("user-agent").unwrap_or_default()
    }
}
