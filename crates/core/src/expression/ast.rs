//! Expression AST for conditions, key conditions, updates and projections.
//!
//! The AST is built with typed constructors (see [`Path`]) instead of strings.
//! The DynamoDB backend renders it to expression text; the in-memory backend
//! evaluates it directly.

use std::fmt;
use std::str::FromStr;

use super::path::Path;
use super::ExpressionError;
use crate::value::Value;

/// Condition, filter and (after conversion) key-condition expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `left op right`
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    /// `operand BETWEEN low AND high`
    Between {
        operand: Operand,
        low: Operand,
        high: Operand,
    },
    /// `operand IN (list...)`
    In { operand: Operand, list: Vec<Operand> },
    /// `attribute_exists(path)`
    AttributeExists(Path),
    /// `attribute_not_exists(path)`
    AttributeNotExists(Path),
    /// `begins_with(path, value)`
    BeginsWith(Path, Value),
    /// `contains(path, value)`
    Contains(Path, Value),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// `self AND other`
    pub fn and(self, other: Condition) -> Condition {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// `self OR other`
    pub fn or(self, other: Condition) -> Condition {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// `NOT self`
    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }
}

/// A value producer inside a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Path(Path),
    Value(Value),
    /// `size(path)`
    Size(Path),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        })
    }
}

/// Key condition for a query: partition key equality and an optional
/// sort key condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub partition: (String, Value),
    pub sort: Option<(String, SortKeyCondition)>,
}

/// Conditions a query may place on the sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyCondition {
    Equals(Value),
    LessThan(Value),
    AtMost(Value),
    GreaterThan(Value),
    AtLeast(Value),
    Between(Value, Value),
    BeginsWith(String),
}

impl KeyCondition {
    /// `name = value` on the partition key.
    pub fn partition_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            partition: (name.into(), value.into()),
            sort: None,
        }
    }

    /// Adds a sort key condition.
    pub fn with_sort(mut self, name: impl Into<String>, condition: SortKeyCondition) -> Self {
        self.sort = Some((name.into(), condition));
        self
    }

    /// The equivalent general condition, used for local evaluation.
    pub fn to_condition(&self) -> Condition {
        let (pk_name, pk_value) = &self.partition;
        let partition = Path::attribute(pk_name.clone()).equals(pk_value.clone());

        let Some((sk_name, sort)) = &self.sort else {
            return partition;
        };
        let path = Path::attribute(sk_name.clone());
        let sort = match sort.clone() {
            SortKeyCondition::Equals(v) => path.equals(v),
            SortKeyCondition::LessThan(v) => path.lt(v),
            SortKeyCondition::AtMost(v) => path.le(v),
            SortKeyCondition::GreaterThan(v) => path.gt(v),
            SortKeyCondition::AtLeast(v) => path.ge(v),
            SortKeyCondition::Between(low, high) => path.between(low, high),
            SortKeyCondition::BeginsWith(prefix) => path.begins_with(prefix),
        };
        partition.and(sort)
    }
}

/// A single clause of an update expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// `SET path = value`
    Set(Path, Value),
    /// `REMOVE path`
    Remove(Path),
}

impl UpdateAction {
    pub fn path(&self) -> &Path {
        match self {
            UpdateAction::Set(path, _) | UpdateAction::Remove(path) => path,
        }
    }
}

/// Attributes to return, restricted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection(pub Vec<Path>);

impl Projection {
    pub fn paths(&self) -> &[Path] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Projection {
    type Err = ExpressionError;

    /// Parses a comma separated list, e.g. `year, title, info.actors[0]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|part| part.parse::<Path>())
            .collect::<Result<Vec<Path>, _>>()
            .map(Projection)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<String> = self.0.iter().map(Path::to_string).collect();
        f.write_str(&paths.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_condition_to_condition() {
        let key = KeyCondition::partition_equals("year", 1985).with_sort(
            "title",
            SortKeyCondition::Between("A".into(), "L".into()),
        );

        assert_eq!(
            key.to_condition(),
            Path::attribute("year")
                .equals(1985)
                .and(Path::attribute("title").between("A", "L"))
        );
    }

    #[test]
    fn test_partition_only_key_condition() {
        let key = KeyCondition::partition_equals("year", 2013);
        assert_eq!(key.to_condition(), Path::attribute("year").equals(2013));
    }

    #[test]
    fn test_projection_round_trips_through_text() {
        let projection: Projection = "year, title, info.genres, info.actors[0]".parse().unwrap();
        assert_eq!(projection.paths().len(), 4);
        assert_eq!(
            projection.to_string(),
            "year, title, info.genres, info.actors[0]"
        );
    }

    #[test]
    fn test_projection_rejects_empty_entries() {
        assert!("year,,title".parse::<Projection>().is_err());
    }

    #[test]
    fn test_update_action_path() {
        let path = Path::attribute("info").child("rating");
        assert_eq!(UpdateAction::Remove(path.clone()).path(), &path);
        assert_eq!(UpdateAction::Set(path.clone(), Value::Null).path(), &path);
    }
}
