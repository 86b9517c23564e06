use crate::vocabulary::Operator;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// Filter tree, keyed by sanitized field path or logical operator symbol.
pub type FilterTree = IndexMap<String, Node>;

/// Operator objects, single or merged.
pub type OperatorMap = IndexMap<Operator, Node>;

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Bool(bool),
    /// Normalized ISO-8601 timestamp, in UTC.
    Date(String),
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(value) | Self::Date(value) => serializer.serialize_str(value),
            Self::Number(value) => value.serialize(serializer),
            Self::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Literal(Literal),
    /// A single operator object, or several merged into one (implicit AND).
    Operators(OperatorMap),
    Array(Vec<Node>),
    /// The sub-filter of `$elemMatch`.
    Filter(FilterTree),
    /// A JSON object or array, passed through verbatim.
    Json(Value),
}

impl Node {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    pub fn operator(operator: Operator, value: Node) -> Self {
        Self::Operators(IndexMap::from([(operator, value)]))
    }

    pub fn as_operators(&self) -> Option<&OperatorMap> {
        match self {
            Self::Operators(operators) => Some(operators),
            _ => None,
        }
    }

    /// Convert into the JSON representation expected by the document database.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Literal> for Node {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(literal) => literal.serialize(serializer),
            Self::Operators(operators) => {
                let mut map = serializer.serialize_map(Some(operators.len()))?;
                for (operator, value) in operators {
                    map.serialize_entry(operator.name(), value)?;
                }
                map.end()
            }
            Self::Array(nodes) => {
                let mut seq = serializer.serialize_seq(Some(nodes.len()))?;
                for node in nodes {
                    seq.serialize_element(node)?;
                }
                seq.end()
            }
            Self::Filter(tree) => tree.serialize(serializer),
            Self::Json(value) => value.serialize(serializer),
        }
    }
}

/// Merge operator objects into one, later entries replace earlier ones with the same operator.
///
/// Returns `None` if any of the nodes is not an operator object.
pub fn merge_operators<I>(nodes: I) -> Option<OperatorMap>
where
    I: IntoIterator<Item = Node>,
{
    nodes.into_iter().try_fold(OperatorMap::new(), |mut acc, node| {
        match node {
            Node::Operators(operators) => {
                acc.extend(operators);
                Some(acc)
            }
            _ => None,
        }
    })
}
