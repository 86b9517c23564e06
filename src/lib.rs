//! Compile URL query parameters into document database queries.
//!
//! ```
//! use qsfilter::prelude::*;
//!
//! let query = compile(&RawQuery::parse("age={gte}18{lte}65&status=active|pending&limit=10"));
//!
//! assert_eq!(query.limit, 10);
//! assert_eq!(
//!     query.to_value()["filter"],
//!     serde_json::json!({
//!         "age": { "$gte": 18, "$lte": 65 },
//!         "status": { "$or": ["active", "pending"] },
//!     })
//! );
//! ```

extern crate self as qsfilter;

pub mod builders;
pub mod classify;
pub mod compiler;
pub mod error;
pub mod filter;
pub mod node;
pub mod parser;
pub mod raw;
pub mod sanitize;
pub mod vocabulary;

pub mod prelude {
    pub use crate::compiler::{Compiler, Descriptor, Options};
    pub use crate::error::Error;
    pub use crate::node::{FilterTree, Literal, Node};
    pub use crate::raw::{RawQuery, RawValue};
    pub use crate::sanitize::{sanitize, KeyPolicy};
    pub use crate::vocabulary::{BsonType, Operator};
    pub use crate::{classify, compile, compile_filter};
}

pub use qsfilter_macros::Vocabulary;

pub use ::chumsky;

use crate::prelude::*;

// The functions below use the lenient default options, which never report an error.

/// Compile a raw query with the default options.
pub fn compile(raw: &RawQuery) -> Descriptor {
    Compiler::default().compile(raw).unwrap_or_default()
}

/// Compile the filter part of a raw query with the default options.
pub fn compile_filter(raw: &RawQuery) -> FilterTree {
    Compiler::default().compile_filter(raw).unwrap_or_default()
}

/// Classify a single token with the default options, `None` if it is malformed.
pub fn classify(token: &str) -> Option<Node> {
    Compiler::default().classify(token).ok().flatten()
}
