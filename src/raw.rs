//! Decoded query parameters, before compilation.

use crate::parser::key_path;
use chumsky::Parser;
use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};

/// Bracket segments of a key beyond this depth are kept together as one literal segment.
pub const MAX_KEY_DEPTH: usize = 16;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawValue {
    Single(String),
    /// Repeated keys or `key[]` syntax.
    Multiple(Vec<String>),
    /// `key[sub]` syntax.
    Nested(RawQuery),
}

impl RawValue {
    /// The scalar value, or the first one of a sequence.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
            Self::Nested(_) => None,
        }
    }

    /// All scalar values, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value],
            Self::Multiple(values) => values.iter().map(String::as_str).collect(),
            Self::Nested(_) => vec![],
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(current) => {
                *self = Self::Multiple(vec![std::mem::take(current), value]);
            }
            Self::Multiple(values) => values.push(value),
            Self::Nested(_) => *self = Self::Single(value),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl<const N: usize> From<[&str; N]> for RawValue {
    fn from(values: [&str; N]) -> Self {
        Self::Multiple(values.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<RawQuery> for RawValue {
    fn from(query: RawQuery) -> Self {
        Self::Nested(query)
    }
}

/// Query parameters as produced by query-string decoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawQuery(pub IndexMap<String, RawValue>);

impl Deref for RawQuery {
    type Target = IndexMap<String, RawValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RawQuery {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a URL query string, with or without a leading `?`.
    ///
    /// Repeated keys and `key[]` produce [`RawValue::Multiple`], `key[sub]` produces
    /// [`RawValue::Nested`]. Keys which don't match the bracket syntax are taken verbatim.
    ///
    /// Nesting stops at [`MAX_KEY_DEPTH`], deeper segments stay in the last key as written:
    /// `a[b]...[p][q][r]` nests down to `q`, holding the key `[r]`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut result = Self::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key_path().parse(key.as_ref()).into_result() {
                Ok((base, path)) if path.len() > MAX_KEY_DEPTH => {
                    let (path, rest) = path.split_at(MAX_KEY_DEPTH);
                    let rest = rest.iter().map(|s| format!("[{s}]")).collect::<String>();
                    let path = path
                        .iter()
                        .copied()
                        .chain([rest.as_str()])
                        .collect::<Vec<_>>();
                    result.append(base, &path, value.into_owned());
                }
                Ok((base, path)) => result.append(base, &path, value.into_owned()),
                Err(_) => result.append(&key, &[], value.into_owned()),
            }
        }

        result
    }

    /// Scalar value of a key, the first one if the key was repeated.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RawValue::first)
    }

    fn append(&mut self, key: &str, path: &[&str], value: String) {
        match path {
            [] => match self.get_mut(key) {
                Some(current) => current.push(value),
                None => {
                    self.insert(key.to_string(), RawValue::Single(value));
                }
            },
            [""] => match self.get_mut(key) {
                Some(current) if matches!(current, RawValue::Nested(_)) => {
                    *current = RawValue::Multiple(vec![value])
                }
                Some(current) => current.push(value),
                None => {
                    self.insert(key.to_string(), RawValue::Multiple(vec![value]));
                }
            },
            [sub, rest @ ..] => {
                let entry = self
                    .entry(key.to_string())
                    .or_insert_with(|| RawValue::Nested(RawQuery::new()));
                if !matches!(entry, RawValue::Nested(_)) {
                    *entry = RawValue::Nested(RawQuery::new());
                }
                if let RawValue::Nested(nested) = entry {
                    nested.append(sub, rest, value);
                }
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RawQuery
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawQuery {
    fn from(value: [(&str, &str); N]) -> Self {
        value.into_iter().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple() {
        assert_eq!(
            RawQuery::parse("?name=jo&age=%7Bgt%7D18"),
            RawQuery::from([("name", "jo"), ("age", "{gt}18")])
        );
    }

    #[test]
    fn test_repeated() {
        let query = RawQuery::parse("tag=a&tag=b&tag=c");
        assert_eq!(query.get("tag"), Some(&RawValue::from(["a", "b", "c"])));
        assert_eq!(query.scalar("tag"), Some("a"));
    }

    #[test]
    fn test_brackets() {
        let query = RawQuery::parse("tag[]=a&address[city]=Berlin&address[geo][lat]=1");

        let mut geo = RawQuery::new();
        geo.insert("lat".into(), "1".into());
        let mut address = RawQuery::new();
        address.insert("city".into(), "Berlin".into());
        address.insert("geo".into(), geo.into());

        let mut expected = RawQuery::new();
        expected.insert("tag".into(), ["a"].into());
        expected.insert("address".into(), address.into());

        assert_eq!(query, expected);
    }

    #[test]
    fn test_plus_and_percent() {
        let query = RawQuery::parse("q=hello+world&x=50%25");
        assert_eq!(query.scalar("q"), Some("hello world"));
        assert_eq!(query.scalar("x"), Some("50%"));
    }

    #[test]
    fn test_broken_brackets() {
        let query = RawQuery::parse("a[b=1");
        assert_eq!(query.scalar("a[b"), Some("1"));
    }

    #[test]
    fn test_key_depth() {
        let query = RawQuery::parse(&format!("a{}=1", "[b]".repeat(1000)));

        let mut depth = 0;
        let mut current = &query;
        let leaf = loop {
            let (key, value) = current.first().unwrap();
            match value {
                RawValue::Nested(nested) => {
                    depth += 1;
                    current = nested;
                }
                value => break (key, value),
            }
        };

        assert_eq!(depth, MAX_KEY_DEPTH + 1);
        assert_eq!(leaf.0, &"[b]".repeat(1000 - MAX_KEY_DEPTH));
        assert_eq!(leaf.1, &RawValue::from("1"));
    }

    #[test]
    fn test_key_depth_limit() {
        let query = RawQuery::parse(&format!("a{}=1", "[b]".repeat(MAX_KEY_DEPTH)));

        let mut current = &query;
        for _ in 0..MAX_KEY_DEPTH {
            match current.first() {
                Some((_, RawValue::Nested(nested))) => current = nested,
                other => panic!("Expected nesting: {other:?}"),
            }
        }
        assert_eq!(current.get("b"), Some(&RawValue::from("1")));
    }

    #[test]
    fn test_empty() {
        assert_eq!(RawQuery::parse(""), RawQuery::new());
        assert_eq!(RawQuery::parse("?"), RawQuery::new());
    }
}
