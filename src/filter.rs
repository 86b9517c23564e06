use crate::compiler::Compiler;
use crate::error::Error;
use crate::node::{merge_operators, FilterTree, Node};
use crate::raw::{RawQuery, RawValue};

/// Keys consumed by pagination, projection, sorting and population. Never a filter field.
pub const RESERVED: &[&str] = &["limit", "skip", "page", "select", "sort", "populate"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED.contains(&key)
}

impl Compiler {
    /// Compile all non-reserved keys of a raw query into a filter tree.
    pub fn compile_filter(&self, raw: &RawQuery) -> Result<FilterTree, Error> {
        self.compile_filter_at(raw, 0)
    }

    pub(crate) fn compile_filter_at(&self, raw: &RawQuery, depth: usize) -> Result<FilterTree, Error> {
        self.fold_entries(FilterTree::new(), None, raw, depth)
    }

    fn fold_entries(
        &self,
        tree: FilterTree,
        parent: Option<&str>,
        raw: &RawQuery,
        depth: usize,
    ) -> Result<FilterTree, Error> {
        raw.iter().try_fold(tree, |mut tree, (key, value)| {
            let path = self.options().key_policy.sanitize(key);
            if parent.is_none() && (is_reserved(key) || is_reserved(&path)) {
                return Ok(tree);
            }

            let path = match parent {
                Some(parent) => format!("{parent}.{path}"),
                None => path,
            };

            let node = match value {
                RawValue::Single(token) => self.compile_value(&path, token, depth)?,
                RawValue::Multiple(tokens) => self.compile_values(&path, tokens, depth)?,
                RawValue::Nested(nested) if depth < self.options().max_depth => {
                    return self.fold_entries(tree, Some(&path), nested, depth + 1);
                }
                RawValue::Nested(_) => self.too_deep(&path)?,
            };

            if let Some(node) = node {
                tree.insert(path, node);
            }

            Ok(tree)
        })
    }

    fn compile_value(&self, key: &str, token: &str, depth: usize) -> Result<Option<Node>, Error> {
        match self.classify_at(token, depth) {
            Ok(Some(node)) => Ok(Some(node)),
            Ok(None) if self.options().strict => Err(Error::Malformed {
                key: key.to_string(),
                token: token.to_string(),
            }),
            Err(err) if self.options().strict => Err(err),
            Ok(None) => {
                log::debug!("Dropping malformed filter '{key}': {token:?}");
                Ok(None)
            }
            Err(err) => {
                log::debug!("Dropping filter '{key}': {err}");
                Ok(None)
            }
        }
    }

    fn too_deep(&self, key: &str) -> Result<Option<Node>, Error> {
        let max_depth = self.options().max_depth;
        if self.options().strict {
            return Err(Error::DepthExceeded(max_depth));
        }
        log::debug!("Dropping filter '{key}': nested deeper than {max_depth} levels");
        Ok(None)
    }

    /// Compile the values of a repeated key.
    ///
    /// Operator expressions get merged into one (implicit AND), anything else is kept as a list.
    fn compile_values(
        &self,
        key: &str,
        tokens: &[String],
        depth: usize,
    ) -> Result<Option<Node>, Error> {
        let mut nodes = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(node) = self.compile_value(key, token, depth)? {
                nodes.push(node);
            }
        }

        if nodes.is_empty() {
            return Ok(None);
        }

        if nodes.iter().all(|node| node.as_operators().is_some()) {
            Ok(merge_operators(nodes).map(Node::Operators))
        } else {
            Ok(Some(Node::Array(nodes)))
        }
    }
}
