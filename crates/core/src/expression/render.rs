//! Rendering of the expression AST to DynamoDB expression text.
//!
//! Every attribute name becomes a `#nN` placeholder and every value a `:vN`
//! placeholder, so reserved words like `year` never appear in the text. One
//! `ExpressionAttributes` is shared by all expressions of a request because
//! the store accepts a single name map and a single value map per call.

use std::collections::BTreeMap;

use super::ast::{Condition, KeyCondition, Operand, Projection, SortKeyCondition, UpdateAction};
use super::path::{Path, PathSegment};
use crate::value::Value;

/// Placeholder maps collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionAttributes {
    names: BTreeMap<String, String>,
    values: BTreeMap<String, Value>,
}

impl ExpressionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// `#placeholder -> attribute name`
    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    /// `:placeholder -> value`
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Placeholder for an attribute name; the same name reuses its placeholder.
    pub fn name(&mut self, attribute: &str) -> String {
        if let Some((placeholder, _)) = self.names.iter().find(|(_, name)| *name == attribute) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    /// Placeholder for a value.
    pub fn value(&mut self, value: &Value) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value.clone());
        placeholder
    }

    pub fn render_path(&mut self, path: &Path) -> String {
        let mut out = String::new();
        for segment in path.segments() {
            match segment {
                PathSegment::Attribute(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    let placeholder = self.name(name);
                    out.push_str(&placeholder);
                }
                PathSegment::Index(index) => out.push_str(&format!("[{index}]")),
            }
        }
        out
    }

    fn render_operand(&mut self, operand: &Operand) -> String {
        match operand {
            Operand::Path(path) => self.render_path(path),
            Operand::Value(value) => self.value(value),
            Operand::Size(path) => format!("size({})", self.render_path(path)),
        }
    }

    /// Renders a condition or filter expression.
    pub fn render_condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Compare { left, op, right } => {
                let left = self.render_operand(left);
                let right = self.render_operand(right);
                format!("{left} {op} {right}")
            }
            Condition::Between { operand, low, high } => {
                let operand = self.render_operand(operand);
                let low = self.render_operand(low);
                let high = self.render_operand(high);
                format!("{operand} BETWEEN {low} AND {high}")
            }
            Condition::In { operand, list } => {
                let operand = self.render_operand(operand);
                let list: Vec<String> = list.iter().map(|o| self.render_operand(o)).collect();
                format!("{operand} IN ({})", list.join(", "))
            }
            Condition::AttributeExists(path) => {
                format!("attribute_exists({})", self.render_path(path))
            }
            Condition::AttributeNotExists(path) => {
                format!("attribute_not_exists({})", self.render_path(path))
            }
            Condition::BeginsWith(path, value) => {
                let path = self.render_path(path);
                format!("begins_with({path}, {})", self.value(value))
            }
            Condition::Contains(path, value) => {
                let path = self.render_path(path);
                format!("contains({path}, {})", self.value(value))
            }
            Condition::And(left, right) => {
                let left = self.render_condition(left);
                let right = self.render_condition(right);
                format!("({left}) AND ({right})")
            }
            Condition::Or(left, right) => {
                let left = self.render_condition(left);
                let right = self.render_condition(right);
                format!("({left}) OR ({right})")
            }
            Condition::Not(inner) => format!("NOT ({})", self.render_condition(inner)),
        }
    }

    /// Renders a key condition. The store only accepts the flat
    /// `pk = :v AND <sort condition>` shape, so no parentheses are emitted.
    pub fn render_key_condition(&mut self, key: &KeyCondition) -> String {
        let (pk_name, pk_value) = &key.partition;
        let pk = self.name(pk_name);
        let mut out = format!("{pk} = {}", self.value(pk_value));

        if let Some((sk_name, sort)) = &key.sort {
            let sk = self.name(sk_name);
            let clause = match sort {
                SortKeyCondition::Equals(v) => format!("{sk} = {}", self.value(v)),
                SortKeyCondition::LessThan(v) => format!("{sk} < {}", self.value(v)),
                SortKeyCondition::AtMost(v) => format!("{sk} <= {}", self.value(v)),
                SortKeyCondition::GreaterThan(v) => format!("{sk} > {}", self.value(v)),
                SortKeyCondition::AtLeast(v) => format!("{sk} >= {}", self.value(v)),
                SortKeyCondition::Between(low, high) => {
                    let low = self.value(low);
                    format!("{sk} BETWEEN {low} AND {}", self.value(high))
                }
                SortKeyCondition::BeginsWith(prefix) => {
                    format!("begins_with({sk}, {})", self.value(&Value::S(prefix.clone())))
                }
            };
            out.push_str(" AND ");
            out.push_str(&clause);
        }
        out
    }

    /// Renders an update expression: `SET a = :v0, b = :v1 REMOVE c`.
    pub fn render_update(&mut self, actions: &[UpdateAction]) -> String {
        let mut sets = Vec::new();
        let mut removes = Vec::new();
        for action in actions {
            match action {
                UpdateAction::Set(path, value) => {
                    let path = self.render_path(path);
                    sets.push(format!("{path} = {}", self.value(value)));
                }
                UpdateAction::Remove(path) => removes.push(self.render_path(path)),
            }
        }

        let mut clauses = Vec::new();
        if !sets.is_empty() {
            clauses.push(format!("SET {}", sets.join(", ")));
        }
        if !removes.is_empty() {
            clauses.push(format!("REMOVE {}", removes.join(", ")));
        }
        clauses.join(" ")
    }

    /// Renders a projection expression.
    pub fn render_projection(&mut self, projection: &Projection) -> String {
        let paths: Vec<String> = projection
            .paths()
            .iter()
            .map(|p| self.render_path(p))
            .collect();
        paths.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> Path {
        text.parse().unwrap()
    }

    #[test]
    fn test_render_condition_with_nested_path() {
        let mut attrs = ExpressionAttributes::new();
        let text = attrs.render_condition(&path("info.rating").le(2));

        assert_eq!(text, "#n0.#n1 <= :v0");
        assert_eq!(attrs.names()["#n0"], "info");
        assert_eq!(attrs.names()["#n1"], "rating");
        assert_eq!(attrs.values()[":v0"], Value::from(2));
    }

    #[test]
    fn test_render_size_condition() {
        let mut attrs = ExpressionAttributes::new();
        let text = attrs.render_condition(&path("info.actors").size().ge(3));
        assert_eq!(text, "size(#n0.#n1) >= :v0");
    }

    #[test]
    fn test_render_reuses_name_placeholders() {
        let mut attrs = ExpressionAttributes::new();
        let text = attrs.render_update(&[
            UpdateAction::Set(path("info.rating"), Value::number("3.5").unwrap()),
            UpdateAction::Set(path("info.plot"), "Everything happens all at once.".into()),
            UpdateAction::Remove(path("info.actors[0]")),
        ]);

        assert_eq!(
            text,
            "SET #n0.#n1 = :v0, #n0.#n2 = :v1 REMOVE #n0.#n3[0]"
        );
        assert_eq!(attrs.names().len(), 4);
        assert_eq!(attrs.values().len(), 2);
    }

    #[test]
    fn test_render_key_condition_between() {
        let mut attrs = ExpressionAttributes::new();
        let key = KeyCondition::partition_equals("year", 1985)
            .with_sort("title", SortKeyCondition::Between("A".into(), "L".into()));

        let text = attrs.render_key_condition(&key);

        assert_eq!(text, "#n0 = :v0 AND #n1 BETWEEN :v1 AND :v2");
        assert_eq!(attrs.names()["#n0"], "year");
        assert_eq!(attrs.values()[":v2"], Value::from("L"));
    }

    #[test]
    fn test_render_logical_and_functions() {
        let mut attrs = ExpressionAttributes::new();
        let condition = path("year")
            .between(1980, 1982)
            .and(path("title").begins_with("The").negate())
            .or(path("info").not_exists());

        let text = attrs.render_condition(&condition);

        assert_eq!(
            text,
            "((#n0 BETWEEN :v0 AND :v1) AND (NOT (begins_with(#n1, :v2)))) OR (attribute_not_exists(#n2))"
        );
    }

    #[test]
    fn test_render_projection_shares_placeholders_with_filter() {
        let mut attrs = ExpressionAttributes::new();
        let filter = attrs.render_condition(&path("year").between(1980, 1982));
        let projection =
            attrs.render_projection(&"year, title, info.rating".parse().unwrap());

        assert_eq!(filter, "#n0 BETWEEN :v0 AND :v1");
        assert_eq!(projection, "#n0, #n1, #n2.#n3");
    }

    #[test]
    fn test_render_in_list() {
        let mut attrs = ExpressionAttributes::new();
        let text = attrs.render_condition(&path("year").is_in([2013, 2014]));
        assert_eq!(text, "#n0 IN (:v0, :v1)");
    }
}
