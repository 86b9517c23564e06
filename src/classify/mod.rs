//! Classification of single raw tokens into filter nodes.
//!
//! A token is checked against an ordered list of shapes, the first one matching wins. Several
//! shapes are syntactic subsets of later ones, so the order of [`RULES`] must not change.

#[cfg(any(feature = "time", test))]
mod time;

#[cfg(any(feature = "time", test))]
use self::time::normalize_date;

use crate::compiler::Compiler;
use crate::error::Error;
use crate::node::{merge_operators, Literal, Node};
use crate::parser::{brace_groups, number, pipe_list, tagged};
use crate::raw::RawQuery;
use crate::vocabulary::{BsonType, Family, Operator};
use chumsky::Parser;
use serde_json::{Number, Value};

#[cfg(not(any(feature = "time", test)))]
fn normalize_date(_: &str) -> Option<String> {
    None
}

/// Result of checking a token against one shape.
#[derive(Clone, Debug, PartialEq)]
enum Outcome {
    /// Not this shape, try the next one.
    Pass,
    /// This shape, but unusable. The filter gets dropped.
    Malformed,
    Matched(Node),
}

type Rule = fn(&Compiler, &str, usize) -> Result<Outcome, Error>;

const RULES: &[(&str, Rule)] = &[
    ("json", Compiler::json_literal),
    ("elemMatch", Compiler::element_match),
    ("logical", Compiler::logical),
    ("pipe", Compiler::pipe_or),
    ("braces", Compiler::brace_and),
    ("comparison", Compiler::comparison),
    ("element", Compiler::element),
    ("date", Compiler::date),
    ("number", Compiler::number),
    ("boolean", Compiler::boolean),
    ("regex", Compiler::plain_or_regex),
];

const REGEX_TAG: &str = "{regex}";

/// Split a token into a known operator tag and its operand.
fn operator_tag(token: &str) -> Option<(Operator, &str)> {
    let (keyword, operand) = tagged().parse(token).into_result().ok()?;
    let operator = Operator::from_keyword(keyword)?;
    operator.is_taggable().then_some((operator, operand))
}

impl Compiler {
    /// Classify a single raw token.
    ///
    /// `Ok(None)` means the token is malformed and the filter should be dropped. Errors are only
    /// reported in strict mode.
    pub fn classify(&self, token: &str) -> Result<Option<Node>, Error> {
        match self.classify_at(token, 0) {
            Err(err) if !self.options().strict => {
                log::debug!("Dropping token {token:?}: {err}");
                Ok(None)
            }
            result => result,
        }
    }

    pub(crate) fn classify_at(&self, token: &str, depth: usize) -> Result<Option<Node>, Error> {
        if depth > self.options().max_depth {
            return Err(Error::DepthExceeded(self.options().max_depth));
        }

        for (name, rule) in RULES {
            match rule(self, token, depth)? {
                Outcome::Pass => continue,
                Outcome::Malformed => {
                    log::trace!("{name}: malformed token {token:?}");
                    return Ok(None);
                }
                Outcome::Matched(node) => {
                    log::trace!("{name}: {token:?}");
                    return Ok(Some(node));
                }
            }
        }

        Ok(Some(Node::string(token)))
    }

    fn classify_operand(&self, operand: &str, depth: usize) -> Result<Option<Node>, Error> {
        match operand.is_empty() {
            true => Ok(None),
            false => self.classify_at(operand, depth + 1),
        }
    }

    fn json_literal(&self, token: &str, _: usize) -> Result<Outcome, Error> {
        if !token.trim_start().starts_with(['{', '[']) {
            return Ok(Outcome::Pass);
        }

        Ok(match serde_json::from_str::<Value>(token) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Outcome::Matched(Node::Json(value)),
            _ => Outcome::Pass,
        })
    }

    fn element_match(&self, token: &str, depth: usize) -> Result<Outcome, Error> {
        let query = match operator_tag(token) {
            Some((Operator::ElemMatch, query)) => query,
            _ => return Ok(Outcome::Pass),
        };

        let query = RawQuery::parse(&query.replace('#', "&"));
        if query.is_empty() {
            return Ok(Outcome::Malformed);
        }

        let filter = self.compile_filter_at(&query, depth + 1)?;
        Ok(match filter.is_empty() {
            true => Outcome::Malformed,
            false => Outcome::Matched(Node::operator(Operator::ElemMatch, Node::Filter(filter))),
        })
    }

    fn logical(&self, token: &str, depth: usize) -> Result<Outcome, Error> {
        let (operator, operand) = match operator_tag(token) {
            Some((operator, operand)) if operator.family() == Family::Logical => (operator, operand),
            _ => return Ok(Outcome::Pass),
        };

        Ok(match self.classify_operand(operand, depth)? {
            Some(node) => Outcome::Matched(Node::operator(operator, node)),
            None => Outcome::Malformed,
        })
    }

    fn pipe_or(&self, token: &str, depth: usize) -> Result<Outcome, Error> {
        if !token.contains('|') {
            return Ok(Outcome::Pass);
        }

        let segments = match pipe_list().parse(token).into_result() {
            Ok(segments) => segments,
            Err(_) => return Ok(Outcome::Pass),
        };

        let mut nodes = Vec::with_capacity(segments.len());
        for segment in segments {
            if let Some(node) = self.classify_at(segment, depth + 1)? {
                nodes.push(node);
            }
        }

        Ok(match nodes.is_empty() {
            true => Outcome::Malformed,
            false => Outcome::Matched(Node::operator(Operator::Or, Node::Array(nodes))),
        })
    }

    fn brace_and(&self, token: &str, depth: usize) -> Result<Outcome, Error> {
        let groups = match brace_groups().parse(token).into_result() {
            Ok(groups) => groups,
            Err(_) => return Ok(Outcome::Pass),
        };

        let mut nodes = Vec::with_capacity(groups.len());
        for group in groups {
            if let Some(node) = self.classify_at(group, depth + 1)? {
                nodes.push(node);
            }
        }

        if nodes.is_empty() {
            return Ok(Outcome::Malformed);
        }

        Ok(match merge_operators(nodes) {
            Some(operators) => Outcome::Matched(Node::Operators(operators)),
            // at least one group is no operator expression, keep the token as it is
            None => Outcome::Pass,
        })
    }

    fn comparison(&self, token: &str, depth: usize) -> Result<Outcome, Error> {
        let (operator, operand) = match operator_tag(token) {
            Some((operator, operand)) if operator.family() == Family::Comparison => {
                (operator, operand)
            }
            _ => return Ok(Outcome::Pass),
        };

        Ok(match self.classify_operand(operand, depth)? {
            Some(node) => Outcome::Matched(Node::operator(operator, node)),
            None => Outcome::Malformed,
        })
    }

    fn element(&self, token: &str, _: usize) -> Result<Outcome, Error> {
        Ok(match operator_tag(token) {
            Some((Operator::Exists, "true")) => {
                Outcome::Matched(Node::operator(Operator::Exists, Literal::Bool(true).into()))
            }
            Some((Operator::Exists, "false")) => {
                Outcome::Matched(Node::operator(Operator::Exists, Literal::Bool(false).into()))
            }
            Some((Operator::Type, name)) => match BsonType::from_name(name) {
                Some(bson_type) => {
                    Outcome::Matched(Node::operator(Operator::Type, Node::string(bson_type.name())))
                }
                None => Outcome::Malformed,
            },
            Some((Operator::Exists, _)) => Outcome::Malformed,
            _ => Outcome::Pass,
        })
    }

    fn date(&self, token: &str, _: usize) -> Result<Outcome, Error> {
        Ok(match normalize_date(token) {
            Some(date) => Outcome::Matched(Literal::Date(date).into()),
            None => Outcome::Pass,
        })
    }

    fn number(&self, token: &str, _: usize) -> Result<Outcome, Error> {
        if number().parse(token).has_errors() {
            return Ok(Outcome::Pass);
        }

        Ok(match to_number(token) {
            Some(number) => Outcome::Matched(Literal::Number(number).into()),
            None => Outcome::Pass,
        })
    }

    fn boolean(&self, token: &str, _: usize) -> Result<Outcome, Error> {
        Ok(match token {
            "true" => Outcome::Matched(Literal::Bool(true).into()),
            "false" => Outcome::Matched(Literal::Bool(false).into()),
            _ => Outcome::Pass,
        })
    }

    fn plain_or_regex(&self, token: &str, _: usize) -> Result<Outcome, Error> {
        if !token.contains('*') && !token.starts_with(REGEX_TAG) {
            return Ok(Outcome::Matched(Node::string(token)));
        }

        let source = token.strip_prefix(REGEX_TAG).unwrap_or(token);
        let pattern = source
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || "_@.-}".contains(*c))
            .collect::<String>();

        let pattern = match (source.starts_with('*'), source.ends_with('*')) {
            (true, false) => format!("^{pattern}"),
            (false, true) => format!("{pattern}$"),
            _ => pattern,
        };

        Ok(Outcome::Matched(Node::Operators(
            [
                (Operator::Regex, Node::string(pattern)),
                (Operator::Options, Node::string("i")),
            ]
            .into_iter()
            .collect(),
        )))
    }
}

/// Convert a numeric string, preferring integers over floating point values.
fn to_number(token: &str) -> Option<Number> {
    if !token.contains(['.', 'e', 'E']) {
        if let Ok(value) = token.parse::<i64>() {
            return Some(value.into());
        }
    }

    token.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::Options;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn assert_classify(token: &str, expected: Value) {
        let node = Compiler::default().classify(token).unwrap();
        assert_eq!(node.map(|node| node.to_value()), Some(expected), "Token: {token}");
    }

    fn assert_dropped(token: &str) {
        assert_eq!(Compiler::default().classify(token), Ok(None), "Token: {token}");
    }

    #[test]
    fn test_numbers() {
        assert_classify("42", json!(42));
        assert_classify("-7", json!(-7));
        assert_classify("3.5", json!(3.5));
        assert_classify(".5", json!(0.5));
        assert_classify("1e3", json!(1000.0));
        assert_classify("99999999999999999999", json!(1e20));
    }

    #[test]
    fn test_booleans() {
        assert_classify("true", json!(true));
        assert_classify("false", json!(false));
        assert_classify("True", json!("True"));
    }

    #[test]
    fn test_plain() {
        assert_classify("hello world", json!("hello world"));
        assert_classify("", json!(""));
        assert_classify("a{b}c", json!("a{b}c"));
        assert_classify("{foo}bar", json!("{foo}bar"));
    }

    #[test]
    fn test_comparison() {
        assert_classify("{gt}5", json!({ "$gt": 5 }));
        assert_classify("{ne}foo", json!({ "$ne": "foo" }));
        assert_classify("{lte}2024-01-15", json!({ "$lte": "2024-01-15T00:00:00.000Z" }));
        assert_classify("{eq}true", json!({ "$eq": true }));
        assert_dropped("{gt}");
        assert_dropped("{nin}");
    }

    #[test]
    fn test_in() {
        assert_classify(r#"{in}["a","b",3]"#, json!({ "$in": ["a", "b", 3] }));
        assert_classify("{nin}[1,2]", json!({ "$nin": [1, 2] }));
        assert_classify("{in}a", json!({ "$in": "a" }));
        // pipes bind weaker than operator tags
        assert_classify("{in}a|b", json!({ "$or": [{ "$in": "a" }, "b"] }));
    }

    #[test]
    fn test_element() {
        assert_classify("{exists}true", json!({ "$exists": true }));
        assert_classify("{exists}false", json!({ "$exists": false }));
        assert_classify("{type}int", json!({ "$type": "int" }));
        assert_classify("{type}objectId", json!({ "$type": "objectId" }));
        assert_dropped("{exists}maybe");
        assert_dropped("{exists}");
        assert_dropped("{type}bogus");
        assert_dropped("{type}");
    }

    #[test]
    fn test_implicit_and() {
        assert_classify("{gt}5{lt}10", json!({ "$gt": 5, "$lt": 10 }));
        assert_classify("{gt}5{gt}7", json!({ "$gt": 7 }));
        assert_classify("{gt}5{lt}", json!({ "$gt": 5 }));
        assert_classify("{exists}true{ne}x", json!({ "$exists": true, "$ne": "x" }));
        assert_dropped("{gt}{lt}");
    }

    #[test]
    fn test_implicit_and_not_operators() {
        assert_classify("{foo}1{bar}2", json!("{foo}1{bar}2"));
    }

    #[test]
    fn test_pipe_or() {
        assert_classify("a|b|c", json!({ "$or": ["a", "b", "c"] }));
        assert_classify("1|{gt}5", json!({ "$or": [1, { "$gt": 5 }] }));
        assert_classify("{gt}|x", json!({ "$or": ["x"] }));
        assert_dropped("{gt}|{lt}");
        assert_classify("a||b", json!("a||b"));
    }

    #[test]
    fn test_logical() {
        assert_classify("{not}{gt}5", json!({ "$not": { "$gt": 5 } }));
        assert_classify("{or}a|b", json!({ "$or": { "$or": ["a", "b"] } }));
        assert_classify("{nor}{gt}1{lt}3", json!({ "$nor": { "$gt": 1, "$lt": 3 } }));
        assert_dropped("{and}");
        assert_dropped("{not}{gt}");
    }

    #[test]
    fn test_regex() {
        assert_classify("*abc", json!({ "$regex": "^abc", "$options": "i" }));
        assert_classify("abc*", json!({ "$regex": "abc$", "$options": "i" }));
        assert_classify("*abc*", json!({ "$regex": "abc", "$options": "i" }));
        assert_classify("{regex}jo.n", json!({ "$regex": "jo.n", "$options": "i" }));
        assert_classify("*a(b)[c]+d$", json!({ "$regex": "^abcd", "$options": "i" }));
        assert_classify("*mail@host-x.org", json!({ "$regex": "^mail@host-x.org", "$options": "i" }));
    }

    #[test]
    fn test_json() {
        assert_classify(r#"{"$gt":1}"#, json!({ "$gt": 1 }));
        assert_classify("[1,\"a\"]", json!([1, "a"]));
        assert_classify("{broken", json!("{broken"));
        assert_classify("[broken|x]", json!("[broken|x]"));
    }

    #[test]
    fn test_elem_match() {
        assert_classify(
            "{elemMatch}qty={gt}5#sku=*abc",
            json!({ "$elemMatch": { "qty": { "$gt": 5 }, "sku": { "$regex": "^abc", "$options": "i" } } }),
        );
        assert_classify(
            "{elemMatch}score={gte}80{lt}90",
            json!({ "$elemMatch": { "score": { "$gte": 80, "$lt": 90 } } }),
        );
        assert_dropped("{elemMatch}");
        assert_dropped("{elemMatch}qty={gt}");
    }

    #[test]
    fn test_nested_elem_match() {
        assert_classify(
            "{elemMatch}items={elemMatch}n=1",
            json!({ "$elemMatch": { "items": { "$elemMatch": { "n": 1 } } } }),
        );
    }

    #[test]
    fn test_pipe_or_with_lists() {
        assert_classify(
            "{in}[1,2]|{in}[3]",
            json!({ "$or": [{ "$in": [1, 2] }, { "$in": [3] }] }),
        );
        assert_classify(
            "{gte}2020-01-01|{in}[1,2]",
            json!({ "$or": [{ "$gte": "2020-01-01T00:00:00.000Z" }, { "$in": [1, 2] }] }),
        );
    }

    #[test]
    fn test_implicit_and_stops_at_pipe() {
        // neither alternatives nor implicit AND, the tag takes the rest as operand
        assert_classify("{gt}1{lt}5|7", json!({ "$gt": "1{lt}5|7" }));
    }

    #[test]
    fn test_depth() {
        let token = "{not}".repeat(20) + "1";
        assert_dropped(&token);

        let compiler = Compiler::new(Options::default().with_strict(true));
        assert_eq!(compiler.classify(&token), Err(Error::DepthExceeded(16)));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number("12"), Some(12.into()));
        assert_eq!(to_number("+12"), Some(12.into()));
        assert_eq!(to_number("1.25"), Number::from_f64(1.25));
        assert_eq!(to_number("1e400"), None);
    }
}
