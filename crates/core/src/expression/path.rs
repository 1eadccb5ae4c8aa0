//! Document paths such as `info.actors[0]`.

use std::fmt;
use std::str::FromStr;

use super::ast::{CompareOp, Condition, Operand};
use super::ExpressionError;
use crate::value::Value;

/// One step of a document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Map attribute by name.
    Attribute(String),
    /// List element by position.
    Index(usize),
}

/// A path into an item. The first segment is always an attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Path to a top-level attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Attribute(name.into())],
        }
    }

    /// Extends the path with a nested attribute.
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Attribute(name.into()));
        self
    }

    /// Extends the path with a list index.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Name of the top-level attribute this path starts from.
    pub fn root(&self) -> &str {
        match self.segments.first() {
            Some(PathSegment::Attribute(name)) => name,
            _ => "",
        }
    }

    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Condition {
        Condition::Compare {
            left: Operand::Path(self),
            op,
            right: Operand::Value(value.into()),
        }
    }

    /// `path = value`
    pub fn equals(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Eq, value)
    }

    /// `path <> value`
    pub fn not_equals(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Ne, value)
    }

    /// `path < value`
    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Lt, value)
    }

    /// `path <= value`
    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Le, value)
    }

    /// `path > value`
    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Gt, value)
    }

    /// `path >= value`
    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Ge, value)
    }

    /// `path BETWEEN low AND high` (inclusive).
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Condition {
        Condition::Between {
            operand: Operand::Path(self),
            low: Operand::Value(low.into()),
            high: Operand::Value(high.into()),
        }
    }

    /// `path IN (values...)`
    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Condition {
        Condition::In {
            operand: Operand::Path(self),
            list: values
                .into_iter()
                .map(|v| Operand::Value(v.into()))
                .collect(),
        }
    }

    /// `attribute_exists(path)`
    pub fn exists(self) -> Condition {
        Condition::AttributeExists(self)
    }

    /// `attribute_not_exists(path)`
    pub fn not_exists(self) -> Condition {
        Condition::AttributeNotExists(self)
    }

    /// `begins_with(path, prefix)`
    pub fn begins_with(self, prefix: impl Into<String>) -> Condition {
        Condition::BeginsWith(self, Value::S(prefix.into()))
    }

    /// `contains(path, value)`
    pub fn contains(self, value: impl Into<Value>) -> Condition {
        Condition::Contains(self, value.into())
    }

    /// `size(path)`, to be compared against a number.
    pub fn size(self) -> SizeOf {
        SizeOf(self)
    }
}

/// The `size(path)` operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOf(Path);

impl SizeOf {
    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Condition {
        Condition::Compare {
            left: Operand::Size(self.0),
            op,
            right: Operand::Value(value.into()),
        }
    }

    pub fn equals(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Eq, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Ge, value)
    }
}

impl FromStr for Path {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExpressionError::InvalidPath(s.to_string());
        let mut segments = Vec::new();

        for part in s.trim().split('.') {
            let part = part.trim();
            let (name, mut rest) = match part.find('[') {
                Some(idx) => part.split_at(idx),
                None => (part, ""),
            };
            if name.is_empty() || name.contains(']') {
                return Err(invalid());
            }
            segments.push(PathSegment::Attribute(name.to_string()));

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(invalid)?;
                if !rest.starts_with('[') {
                    return Err(invalid());
                }
                let index = rest[1..close].parse().map_err(|_| invalid())?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Attribute(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Attribute(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_path() {
        let path: Path = "info.actors[0]".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Attribute("info".to_string()),
                PathSegment::Attribute("actors".to_string()),
                PathSegment::Index(0),
            ]
        );
        assert_eq!(path.root(), "info");
        assert_eq!(path.to_string(), "info.actors[0]");
    }

    #[test]
    fn test_parse_multiple_indexes() {
        let path: Path = "matrix[1][2].value".parse().unwrap();
        assert_eq!(path, Path::attribute("matrix").index(1).index(2).child("value"));
        assert_eq!(path.to_string(), "matrix[1][2].value");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let path: Path = " info.rating ".parse().unwrap();
        assert_eq!(path, Path::attribute("info").child("rating"));
    }

    #[test]
    fn test_rejects_invalid_paths() {
        for bad in ["", "a..b", ".a", "a.", "a[", "a[x]", "a[0", "a]0[", "[0]", "a[0]b"] {
            assert!(
                matches!(bad.parse::<Path>(), Err(ExpressionError::InvalidPath(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_builders_produce_conditions() {
        let condition = Path::attribute("info").child("rating").le(2);
        assert_eq!(
            condition,
            Condition::Compare {
                left: Operand::Path(Path::attribute("info").child("rating")),
                op: CompareOp::Le,
                right: Operand::Value(Value::from(2)),
            }
        );

        let size = Path::attribute("info").child("actors").size().ge(3);
        assert!(matches!(
            size,
            Condition::Compare {
                left: Operand::Size(_),
                op: CompareOp::Ge,
                ..
            }
        ));
    }
}
