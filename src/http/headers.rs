//! HTTP header map with exact-case name lookup.
//!
//! Names are stored as received and compared byte-for-byte: `User-Agent` and
//! `user-agent` are different keys. The encoder needs a few case-insensitive
//! operations of its own, which are exposed separately.

use std::fmt;

/// A single-value HTTP header map.
///
/// Inserting a name that is already present replaces its value in place, so the
/// last occurrence of a duplicated request header wins. Iteration follows
/// first-insertion order.
///
/// # Examples
///
/// ```
/// use courier::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("User-Agent", "curl/7.6");
/// headers.insert("User-Agent", "curl/8.0");
///
/// assert_eq!(headers.get("User-Agent"), Some("curl/8.0"));
/// assert_eq!(headers.get("user-agent"), None);
/// assert_eq!(headers.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any existing entry with the exact same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the value for the given header name (exact case), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the last entry whose name matches `name` ignoring ASCII case.
    pub fn last_ignore_case(&self, name: &str) -> Option<(&str, &str)> {
        self.inner
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Removes every entry whose name matches `name` ignoring ASCII case.
    ///
    /// Returns `true` if any entries were removed.
    pub fn remove_ignore_case(&mut self, name: &str) -> bool {
        let before = self.inner.len();
        self.inner.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.inner.len() < before
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over all `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.inner {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}
