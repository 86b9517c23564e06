use crate::builders::{paginate, projection, sorting, Pagination, Populate, Projection, Sorting};
use crate::error::Error;
use crate::node::FilterTree;
use crate::raw::RawQuery;
use crate::sanitize::KeyPolicy;
use serde::Serialize;

pub const DEFAULT_LIMIT: u64 = 100;

/// Maximum nesting of sub-expressions and of bracketed keys.
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Fail on malformed input instead of dropping it.
    pub strict: bool,
    pub max_depth: usize,
    pub default_limit: u64,
    pub max_limit: Option<u64>,
    pub key_policy: KeyPolicy,
    /// Evaluate the `populate` key.
    pub populate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
            key_policy: KeyPolicy::default(),
            populate: false,
        }
    }
}

impl Options {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn with_max_limit(mut self, limit: impl Into<Option<u64>>) -> Self {
        self.max_limit = limit.into().map(|limit| limit.max(1));
        self
    }

    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }

    pub fn with_populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }
}

/// The compiled query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Descriptor {
    pub limit: u64,
    pub skip: u64,
    pub select: Projection,
    pub sort: Sorting,
    pub filter: FilterTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub populate: Option<Populate>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
            select: Default::default(),
            sort: Default::default(),
            filter: Default::default(),
            populate: None,
        }
    }
}

impl Descriptor {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Compiler {
    options: Options,
}

impl Compiler {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compile a raw query into a descriptor.
    ///
    /// Only fails in strict mode.
    pub fn compile(&self, raw: &RawQuery) -> Result<Descriptor, Error> {
        let Pagination { limit, skip } = paginate(raw, &self.options)?;

        let populate = match (self.options.populate, raw.get("populate")) {
            (true, Some(value)) => self.build_populate(value)?,
            _ => None,
        };

        Ok(Descriptor {
            limit,
            skip,
            select: projection(raw.get("select"), self.options.key_policy),
            sort: sorting(raw.get("sort"), self.options.key_policy),
            filter: self.compile_filter(raw)?,
            populate,
        })
    }
}
