//! Client IP resolution from forwarding headers and the peer address.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};
use crate::request::HeaderMap;
use crate::span::ext;

/// Resolves client IP tags for a request.
pub trait ClientIpResolver: Send + Sync {
    /// Returns the tags to merge into the request span.
    ///
    /// With `collect_all`, implementations may also report every inspected
    /// forwarding header. An error means nothing could be resolved; callers
    /// add no tags in that case.
    fn client_ip_tags(
        &self,
        headers: &HeaderMap,
        collect_all: bool,
        remote_addr: &str,
    ) -> Result<HashMap<String, String>>;
}

/// Forwarding headers inspected for the client address, in priority order.
pub const DEFAULT_IP_HEADERS: &[&str] = &[
    "x-forwarded-for",
    "x-real-ip",
    "true-client-ip",
    "x-client-ip",
    "x-forwarded",
    "forwarded-for",
    "x-cluster-client-ip",
    "fastly-client-ip",
    "cf-connecting-ip",
    "cf-connecting-ipv6",
];

/// Resolves the client IP from well-known forwarding headers.
///
/// The first global address found wins. Without one, the first parsable
/// address from the headers is used, then the peer address.
///
/// ## Example
///
/// ```rust
/// use httptrace::{ClientIpResolver, HeaderClientIpResolver, HeaderMap};
///
/// let headers: HeaderMap = vec![("X-Forwarded-For", "10.0.0.1, 203.0.113.7")]
///     .into_iter()
///     .collect();
/// let tags = HeaderClientIpResolver::default()
///     .client_ip_tags(&headers, false, "192.0.2.1:5000")
///     .unwrap();
///
/// assert_eq!(tags["http.client_ip"], "203.0.113.7");
/// assert_eq!(tags["network.client.ip"], "192.0.2.1");
/// ```
#[derive(Debug, Clone)]
pub struct HeaderClientIpResolver {
    headers: Vec<String>,
}

impl Default for HeaderClientIpResolver {
    fn default() -> Self {
        Self {
            headers: DEFAULT_IP_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl HeaderClientIpResolver {
    /// Creates a resolver that only trusts the given header.
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            headers: vec![header.into().to_ascii_lowercase()],
        }
    }

    /// Returns the inspected header names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl ClientIpResolver for HeaderClientIpResolver {
    fn client_ip_tags(
        &self,
        headers: &HeaderMap,
        collect_all: bool,
        remote_addr: &str,
    ) -> Result<HashMap<String, String>> {
        let mut tags = HashMap::new();
        let mut global = None;
        let mut fallback = None;

        for name in &self.headers {
            let Some(values) = headers.get_all(name) else {
                continue;
            };
            if collect_all {
                tags.insert(
                    format!("{}{}", ext::HTTP_REQUEST_HEADERS_PREFIX, name),
                    values.join(","),
                );
            }
            for candidate in values.iter().flat_map(|value| value.split(',')) {
                let Some(ip) = parse_ip(candidate) else {
                    continue;
                };
                if is_global(&ip) {
                    global.get_or_insert(ip);
                } else {
                    fallback.get_or_insert(ip);
                }
            }
        }

        let peer = parse_ip(remote_addr);
        if let Some(peer) = peer {
            tags.insert(ext::NETWORK_CLIENT_IP.to_string(), peer.to_string());
        }

        let client = global.or(fallback).or(peer).ok_or_else(|| {
            Error::client_ip(format!("no client address in headers or peer {:?}", remote_addr))
        })?;
        tags.insert(ext::HTTP_CLIENT_IP.to_string(), client.to_string());
        Ok(tags)
    }
}

/// Parses `ip`, `ip:port`, `[v6]:port` and `[v6]`.
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ip) = raw.parse::<IpAddr>() {
        return Some(ip);
    }
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    raw.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse().ok())
}

/// Public, routable address.
fn is_global(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.octets()[0] == 100 && (64..128).contains(&v4.octets()[1]))
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_global(&IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}
