//! Predicate expressions for JSON-shaped nodes.
//!
//! A clause has the form `FIELD OP VALUE`, for example `id==4`,
//! `name~child` or `meta.owner=alice`.
//!
//! - `FIELD` is a dot-separated path. Object segments are keys; numeric
//!   segments index into arrays (`tags.0`).
//! - `OP` is one of `==` (or `=`), `!=`, `>`, `>=`, `<`, `<=`, `~` (contains)
//!   and `^` (starts with).
//! - `VALUE` is read as JSON when it parses (`4`, `true`, `"4"`, `null`) and as
//!   a bare string otherwise. A bare value may not start with an operator
//!   character, so `id=>4` is an error rather than `id == ">4"`.
//!
//! A [`Matcher`] is the conjunction of its clauses. An empty matcher accepts
//! every node.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Errors from parsing a clause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    #[error("no operator in clause '{0}': expected one of ==, !=, >, >=, <, <=, ~, ^")]
    MissingOperator(String),

    #[error("unknown operator in clause '{0}'")]
    UnknownOperator(String),

    #[error("missing field name in clause '{0}'")]
    MissingField(String),

    #[error("empty path segment in field '{0}'")]
    EmptySegment(String),

    #[error("value in clause '{0}' starts with an operator character; quote it as JSON, e.g. name==\"<b>\"")]
    StrayOperator(String),
}

// ---------------------------------------------------------------------------
// Op
// ---------------------------------------------------------------------------

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// Substring for strings, membership for arrays.
    Contains,
    StartsWith,
}

impl Op {
    /// Two-character spellings must be tried before their one-character
    /// prefixes.
    const SPELLINGS: [(&'static str, Self); 10] = [
        ("==", Self::Eq),
        ("!=", Self::Ne),
        (">=", Self::Ge),
        ("<=", Self::Le),
        ("=", Self::Eq),
        (">", Self::Gt),
        ("<", Self::Lt),
        ("~", Self::Contains),
        ("^", Self::StartsWith),
        ("!", Self::Ne),
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Contains => "~",
            Self::StartsWith => "^",
        }
    }

    const fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Ge => !matches!(ordering, Ordering::Less),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Le => !matches!(ordering, Ordering::Greater),
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Ne => !matches!(ordering, Ordering::Equal),
            Self::Contains | Self::StartsWith => false,
        }
    }

    fn is_operator_char(c: char) -> bool {
        matches!(c, '=' | '!' | '<' | '>' | '~' | '^')
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Clause
// ---------------------------------------------------------------------------

/// A single `FIELD OP VALUE` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    field: Vec<String>,
    op: Op,
    value: Value,
}

impl Clause {
    /// Build a clause from a dotted field path.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] if the field is empty or has an empty segment.
    pub fn new(field: &str, op: Op, value: Value) -> Result<Self, MatcherError> {
        Ok(Self {
            field: parse_field(field, field)?,
            op,
            value,
        })
    }

    pub const fn op(&self) -> Op {
        self.op
    }

    pub const fn value(&self) -> &Value {
        &self.value
    }

    pub fn field(&self) -> String {
        self.field.join(".")
    }

    /// Evaluate the clause against one node.
    pub fn matches(&self, node: &Value) -> bool {
        let actual = self.lookup(node);
        match self.op {
            Op::Eq => actual.is_some_and(|a| values_equal(a, &self.value)),
            Op::Ne => !actual.is_some_and(|a| values_equal(a, &self.value)),
            Op::Gt | Op::Ge | Op::Lt | Op::Le => actual
                .and_then(|a| compare(a, &self.value))
                .is_some_and(|ordering| self.op.accepts(ordering)),
            Op::Contains => match (actual, &self.value) {
                (Some(Value::String(haystack)), Value::String(needle)) => {
                    haystack.contains(needle.as_str())
                }
                (Some(Value::Array(items)), expected) => {
                    items.iter().any(|item| values_equal(item, expected))
                }
                _ => false,
            },
            Op::StartsWith => match (actual, &self.value) {
                (Some(Value::String(s)), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
        }
    }

    fn lookup<'v>(&self, node: &'v Value) -> Option<&'v Value> {
        self.field
            .iter()
            .try_fold(node, |current, segment| match current {
                Value::Object(fields) => fields.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl FromStr for Clause {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let at = s
            .find(Op::is_operator_char)
            .ok_or_else(|| MatcherError::MissingOperator(s.to_string()))?;
        let field = s[..at].trim();
        let rest = &s[at..];

        let (spelling, op) = Op::SPELLINGS
            .iter()
            .find(|(spelling, _)| rest.starts_with(spelling))
            .copied()
            .ok_or_else(|| MatcherError::UnknownOperator(s.to_string()))?;
        if spelling == "!" {
            return Err(MatcherError::UnknownOperator(s.to_string()));
        }

        let raw = rest[spelling.len()..].trim();
        if raw.starts_with(Op::is_operator_char) {
            return Err(MatcherError::StrayOperator(s.to_string()));
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        Ok(Self {
            field: parse_field(field, s)?,
            op,
            value,
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field(), self.op, self.value)
    }
}

fn parse_field(field: &str, clause: &str) -> Result<Vec<String>, MatcherError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(MatcherError::MissingField(clause.to_string()));
    }
    field
        .split('.')
        .map(|segment| {
            if segment.is_empty() {
                Err(MatcherError::EmptySegment(field.to_string()))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Numbers compare by value (`4 == 4.0`); everything else structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matcher {
    clauses: Vec<Clause>,
}

impl Matcher {
    pub const fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Parse every expression and combine them with AND.
    ///
    /// # Errors
    ///
    /// Returns the first parse error.
    pub fn parse_all<I, S>(exprs: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        exprs
            .into_iter()
            .map(|expr| expr.as_ref().parse())
            .collect::<Result<Vec<Clause>, _>>()
            .map(Self::new)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, node: &Value) -> bool {
        self.clauses.iter().all(|clause| clause.matches(node))
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("*");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
