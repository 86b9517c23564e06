//! Static tables of the document database vocabulary.
//!
//! Only part of the query operators is reachable through bracket tags. The remaining entries, as
//! well as update operators and aggregation stages, are published for the host application.

use crate::Vocabulary;
use serde::{Serialize, Serializer};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Family {
    Comparison,
    Logical,
    Element,
    Evaluation,
    Geospatial,
    Array,
    Comment,
    /// Modifies another operator, like `$options` for `$regex`.
    Modifier,
}

/// Query operators.
#[derive(Vocabulary, Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[vocabulary(prefix = "$")]
pub enum Operator {
    #[vocabulary(family = "Comparison")]
    Eq,
    #[vocabulary(family = "Comparison")]
    Gt,
    #[vocabulary(family = "Comparison")]
    Gte,
    #[vocabulary(family = "Comparison")]
    In,
    #[vocabulary(family = "Comparison")]
    Lt,
    #[vocabulary(family = "Comparison")]
    Lte,
    #[vocabulary(family = "Comparison")]
    Ne,
    #[vocabulary(family = "Comparison")]
    Nin,

    #[vocabulary(family = "Logical")]
    And,
    #[vocabulary(family = "Logical")]
    Not,
    #[vocabulary(family = "Logical")]
    Nor,
    #[vocabulary(family = "Logical")]
    Or,

    #[vocabulary(family = "Element")]
    Exists,
    #[vocabulary(family = "Element")]
    Type,

    #[vocabulary(family = "Evaluation")]
    Expr,
    #[vocabulary(family = "Evaluation")]
    Mod,
    #[vocabulary(family = "Evaluation")]
    Regex,
    #[vocabulary(family = "Evaluation")]
    Text,
    #[vocabulary(family = "Evaluation")]
    Where,

    #[vocabulary(family = "Geospatial")]
    GeoIntersects,
    #[vocabulary(family = "Geospatial")]
    GeoWithin,
    #[vocabulary(family = "Geospatial")]
    Near,
    #[vocabulary(family = "Geospatial")]
    NearSphere,

    #[vocabulary(family = "Array")]
    All,
    #[vocabulary(family = "Array")]
    ElemMatch,
    #[vocabulary(family = "Array")]
    Size,

    #[vocabulary(family = "Comment")]
    Comment,

    #[vocabulary(family = "Modifier")]
    Options,
}

impl Operator {
    /// All operators of one family, in declaration order.
    pub fn family_members(family: Family) -> impl Iterator<Item = Operator> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |op| op.family() == family)
    }

    /// Operators which may be written as a bracket tag in front of a value.
    pub fn is_taggable(&self) -> bool {
        matches!(
            self.family(),
            Family::Comparison | Family::Logical | Family::Element
        ) || matches!(self, Self::ElemMatch | Self::Regex)
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Names accepted by `{type}`.
#[derive(Vocabulary, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BsonType {
    Double,
    String,
    Object,
    Array,
    BinData,
    ObjectId,
    Bool,
    Date,
    Null,
    Regex,
    Javascript,
    Int,
    Timestamp,
    Long,
    Decimal,
    MinKey,
    MaxKey,
}

#[derive(Vocabulary, Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[vocabulary(prefix = "$")]
pub enum UpdateOperator {
    CurrentDate,
    Inc,
    Min,
    Max,
    Mul,
    Rename,
    Set,
    SetOnInsert,
    Unset,

    #[vocabulary(rename = "")]
    Positional,
    #[vocabulary(rename = "[]")]
    AllPositional,
    #[vocabulary(rename = "[<identifier>]")]
    FilteredPositional,
    AddToSet,
    Pop,
    Pull,
    Push,
    PullAll,

    Each,
    Position,
    Slice,
    Sort,

    Bit,
}

/// Aggregation pipeline stages.
#[derive(Vocabulary, Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[vocabulary(prefix = "$")]
pub enum Stage {
    AddFields,
    Bucket,
    BucketAuto,
    CollStats,
    Count,
    Facet,
    GeoNear,
    GraphLookup,
    Group,
    IndexStats,
    Limit,
    ListSessions,
    Lookup,
    Match,
    Merge,
    Out,
    PlanCacheStats,
    Project,
    Redact,
    ReplaceRoot,
    ReplaceWith,
    Sample,
    Search,
    Set,
    Skip,
    Sort,
    SortByCount,
    UnionWith,
    Unset,
    Unwind,
}
