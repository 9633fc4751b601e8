//! Raw request values handed to the binder.
//!
//! - [`PathParams`]: the text captured by a route's placeholders, in template order
//! - [`QueryParams`]: the decoded `key=value` pairs of the query string
//!
//! Both look names up case-insensitively.

use std::borrow::Cow;

/// Decodes `%XX` escapes, invalid UTF-8 in the decoded bytes is replaced.
///
/// `+` is left untouched, it only means a space in form bodies.
pub fn percent_decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }

    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Owned(String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()),
    }
}

/// Path parameters captured by a matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    pub fn new(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name. Captures come from the decoded path,
    /// so the value needs no further decoding.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// The parsed query string of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Splits `a=1&b=2` into decoded pairs. A bare key has an empty value, empty pieces are
    /// ignored.
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .split('&')
            .filter(|piece| !piece.is_empty())
            .map(|piece| {
                let (key, value) = piece.split_once('=').unwrap_or((piece, ""));
                (percent_decode(key).into_owned(), percent_decode(value).into_owned())
            })
            .collect();

        Self { pairs }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Gets a decoded value by name, the last occurrence of a repeated key wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().rev().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }
}
