//! Pagination, projection, sorting and population.

use crate::compiler::{Compiler, Options};
use crate::error::Error;
use crate::node::FilterTree;
use crate::raw::{RawQuery, RawValue};
use crate::sanitize::KeyPolicy;
use indexmap::IndexMap;
use serde::Serialize;

/// Field path to `1` (include) or `0` (exclude).
pub type Projection = IndexMap<String, u8>;

/// Field path to `1` (ascending) or `-1` (descending).
pub type Sorting = IndexMap<String, i8>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pagination {
    pub limit: u64,
    pub skip: u64,
}

/// Resolve `limit`, `skip` and `page`.
///
/// A `page` greater than one replaces any `skip`. Unusable values fall back to the defaults,
/// unless running in strict mode.
pub fn paginate(raw: &RawQuery, options: &Options) -> Result<Pagination, Error> {
    let mut limit = match integer(raw, "limit", options)? {
        Some(limit) if limit >= 1 => limit as u64,
        Some(limit) if options.strict => return Err(invalid("limit", limit)),
        _ => options.default_limit,
    };

    if let Some(max) = options.max_limit {
        limit = limit.min(max);
    }

    let mut skip = match integer(raw, "skip", options)? {
        Some(skip) if skip >= 0 => skip as u64,
        Some(skip) if options.strict => return Err(invalid("skip", skip)),
        _ => 0,
    };

    if let Some(page) = integer(raw, "page", options)? {
        if page > 1 {
            skip = (page as u64 - 1).saturating_mul(limit);
        }
    }

    Ok(Pagination { limit, skip })
}

fn integer(raw: &RawQuery, key: &str, options: &Options) -> Result<Option<i64>, Error> {
    let value = match raw.scalar(key) {
        Some(value) => value,
        None => return Ok(None),
    };

    match value.trim().parse::<i64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) if options.strict => Err(invalid(key, value)),
        Err(_) => {
            log::debug!("Ignoring non-numeric '{key}': {value:?}");
            Ok(None)
        }
    }
}

fn invalid(key: &str, value: impl ToString) -> Error {
    Error::Pagination {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Split a comma separated field list into sanitized paths, flagging the `-` prefixed ones.
fn fields<'a>(
    value: Option<&'a RawValue>,
    policy: KeyPolicy,
) -> impl Iterator<Item = (String, bool)> + 'a {
    value
        .map(RawValue::values)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter_map(move |field| {
            let (negated, field) = match field.strip_prefix('-') {
                Some(field) => (true, field),
                None => (false, field),
            };
            let path = policy.sanitize(field);
            (!path.is_empty()).then_some((path, negated))
        })
}

pub fn projection(value: Option<&RawValue>, policy: KeyPolicy) -> Projection {
    fields(value, policy)
        .map(|(path, exclude)| (path, if exclude { 0 } else { 1 }))
        .collect()
}

pub fn sorting(value: Option<&RawValue>, policy: KeyPolicy) -> Sorting {
    fields(value, policy)
        .map(|(path, descending)| (path, if descending { -1 } else { 1 }))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopulateSpec {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Projection>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterTree>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Populate {
    One(PopulateSpec),
    Many(Vec<PopulateSpec>),
}

impl Compiler {
    /// Build population instructions from `path;select;filter` strings.
    pub fn build_populate(&self, value: &RawValue) -> Result<Option<Populate>, Error> {
        Ok(match value {
            RawValue::Single(value) => self.populate_spec(value)?.map(Populate::One),
            RawValue::Multiple(values) => {
                let mut specs = Vec::with_capacity(values.len());
                for value in values {
                    specs.extend(self.populate_spec(value)?);
                }
                (!specs.is_empty()).then_some(Populate::Many(specs))
            }
            RawValue::Nested(_) => None,
        })
    }

    fn populate_spec(&self, value: &str) -> Result<Option<PopulateSpec>, Error> {
        let mut parts = value.splitn(3, ';');

        let path = self
            .options()
            .key_policy
            .sanitize(parts.next().unwrap_or_default());
        if path.is_empty() {
            return Ok(None);
        }

        let select = parts
            .next()
            .filter(|select| !select.is_empty())
            .map(|select| projection(Some(&RawValue::from(select)), self.options().key_policy));

        let filter = match parts.next().filter(|filter| !filter.is_empty()) {
            Some(filter) => {
                let tree = self.compile_filter_at(&RawQuery::parse(filter), 1)?;
                (!tree.is_empty()).then_some(tree)
            }
            None => None,
        };

        Ok(Some(PopulateSpec {
            path,
            select,
            filter,
        }))
    }
}
