//! Header mapping and the header builder.
//!
//! [`HeaderSet`] is the only header type accepted at the API boundary. Names
//! compare case-insensitively and keep the spelling of their first insertion.
//! Richer collections such as [`http::HeaderMap`] are normalized into a
//! `HeaderSet` once, through [`HeaderSet::from_header_map`].

use std::collections::BTreeMap;

use http::HeaderMap;

use super::request::BodyEncoding;

/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Authorization` header name.
pub const AUTHORIZATION: &str = "Authorization";
/// `Cache-Control` header name.
pub const CACHE_CONTROL: &str = "Cache-Control";
/// Tenant scoping header carried by district-scoped operations.
pub const DISTRICT_ID: &str = "X-District-ID";
/// Content type of every JSON-speaking request.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Responses must never be served from an intermediate or local cache.
pub const NO_STORE: &str = "no-store";

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    value: String,
}

/// Case-insensitive header name to value mapping.
///
/// # Examples
/// ```
/// use precheck_client::domain::HeaderSet;
///
/// let headers = HeaderSet::new().with("X-Custom", "1");
/// assert_eq!(headers.get("x-custom"), Some("1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: BTreeMap<String, HeaderEntry>,
}

impl HeaderSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`HeaderSet::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name` to `value`, replacing any existing value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.entries
            .entry(name.to_ascii_lowercase())
            .and_modify(|entry| entry.value.clone_from(&value))
            .or_insert(HeaderEntry { name, value });
    }

    /// Set `name` only when no value exists yet. Returns whether it was set.
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.contains(name) {
            return false;
        }
        self.insert(name, value);
        true
    }

    /// Value stored for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|entry| entry.value.as_str())
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|entry| entry.value)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    /// Copy every entry of `other` into `self`; `other` wins on collisions.
    pub fn extend_from(&mut self, other: &HeaderSet) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Normalize an [`http::HeaderMap`] into a `HeaderSet`.
    ///
    /// Repeated names are joined with `", "`. Values that are not valid UTF-8
    /// are decoded lossily.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::new();
        for name in map.keys() {
            let joined = map
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            headers.insert(name.as_str(), joined);
        }
        headers
    }
}

impl From<&HeaderMap> for HeaderSet {
    fn from(map: &HeaderMap) -> Self {
        Self::from_header_map(map)
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Produce the final header set for one request.
///
/// Caller headers win on every collision. Defaults are added only when the
/// caller left them out:
/// - `Content-Type: application/json` for JSON-shaped requests;
/// - `Authorization: Bearer <token>` when `token` is non-empty.
///
/// Multipart requests never carry a content type from here, caller-supplied
/// or not: the transport writes its own boundary.
///
/// # Examples
/// ```
/// use precheck_client::domain::{build_headers, BodyEncoding, HeaderSet};
///
/// let caller = HeaderSet::new().with("X-Custom", "1");
/// let headers = build_headers(Some(&caller), "tok", BodyEncoding::Json);
/// assert_eq!(headers.get("X-Custom"), Some("1"));
/// assert_eq!(headers.get("Authorization"), Some("Bearer tok"));
/// ```
pub fn build_headers(
    caller: Option<&HeaderSet>,
    token: &str,
    encoding: BodyEncoding,
) -> HeaderSet {
    let mut headers = caller.cloned().unwrap_or_default();
    match encoding {
        BodyEncoding::Json => {
            headers.insert_if_absent(CONTENT_TYPE, JSON_CONTENT_TYPE);
        }
        BodyEncoding::Multipart => {
            headers.remove(CONTENT_TYPE);
        }
    }
    if !token.is_empty() {
        headers.insert_if_absent(AUTHORIZATION, format!("Bearer {token}"));
    }
    headers
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use http::header::{ACCEPT, HeaderValue};
    use rstest::rstest;

    #[test]
    fn names_compare_case_insensitively_and_keep_first_spelling() {
        let mut headers = HeaderSet::new().with("X-District-ID", "d1");
        headers.insert("x-district-id", "d2");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-DISTRICT-ID"), Some("d2"));
        assert_eq!(headers.iter().next(), Some(("X-District-ID", "d2")));
    }

    #[test]
    fn caller_headers_are_merged_with_bearer_token() {
        let caller = HeaderSet::new().with("X-Custom", "1");

        let headers = build_headers(Some(&caller), "tok", BodyEncoding::Json);

        assert_eq!(headers.get("X-Custom"), Some("1"));
        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer tok"));
        assert_eq!(headers.get(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
    }

    #[rstest]
    #[case::same_case("Authorization")]
    #[case::lower_case("authorization")]
    fn caller_authorization_wins(#[case] name: &str) {
        let caller = HeaderSet::new().with(name, "Bearer caller");

        let headers = build_headers(Some(&caller), "tok", BodyEncoding::Json);

        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer caller"));
    }

    #[test]
    fn caller_content_type_wins_for_json_requests() {
        let caller = HeaderSet::new().with("content-type", "text/csv");

        let headers = build_headers(Some(&caller), "", BodyEncoding::Json);

        assert_eq!(headers.get(CONTENT_TYPE), Some("text/csv"));
    }

    #[test]
    fn empty_token_adds_no_authorization() {
        let headers = build_headers(None, "", BodyEncoding::Json);

        assert!(!headers.contains(AUTHORIZATION));
        assert_eq!(headers.get(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
    }

    #[rstest]
    #[case::no_caller_headers(None)]
    #[case::caller_json_type(Some(HeaderSet::new().with(CONTENT_TYPE, JSON_CONTENT_TYPE)))]
    fn multipart_requests_never_carry_a_content_type(#[case] caller: Option<HeaderSet>) {
        let headers = build_headers(caller.as_ref(), "tok", BodyEncoding::Multipart);

        assert!(!headers.contains(CONTENT_TYPE));
        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer tok"));
    }

    #[test]
    fn header_map_is_normalized_once_at_the_edge() {
        let mut map = HeaderMap::new();
        map.insert(ACCEPT, HeaderValue::from_static("text/csv"));
        map.append(ACCEPT, HeaderValue::from_static("application/json"));
        map.insert("x-district-id", HeaderValue::from_static("d1"));

        let headers = HeaderSet::from(&map);

        assert_eq!(headers.get("Accept"), Some("text/csv, application/json"));
        assert_eq!(headers.get(DISTRICT_ID), Some("d1"));

        let built = build_headers(Some(&headers), "tok", BodyEncoding::Json);
        assert_eq!(built.get(DISTRICT_ID), Some("d1"));
        assert_eq!(built.get(AUTHORIZATION), Some("Bearer tok"));
    }
}
