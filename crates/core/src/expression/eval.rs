//! Local evaluation of the expression AST against items.
//!
//! Used by the in-memory backend. Semantics follow the store: a comparison
//! with a missing attribute is false, values of different types are never
//! ordered, and `size` counts string bytes or collection elements.

use std::cmp::Ordering;

use super::ast::{CompareOp, Condition, Operand, Projection, UpdateAction};
use super::path::{Path, PathSegment};
use super::ExpressionError;
use crate::value::{Item, Number, Value};

/// Looks up the value at `path`.
pub fn resolve<'a>(item: &'a Item, path: &Path) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let PathSegment::Attribute(name) = first else {
        return None;
    };
    let mut current = item.get(name)?;
    for segment in rest {
        current = match (segment, current) {
            (PathSegment::Attribute(name), Value::M(map)) => map.get(name)?,
            (PathSegment::Index(index), Value::L(list)) => list.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

fn resolve_mut<'a>(item: &'a mut Item, segments: &[PathSegment]) -> Option<&'a mut Value> {
    let (first, rest) = segments.split_first()?;
    let PathSegment::Attribute(name) = first else {
        return None;
    };
    let mut current = item.get_mut(name)?;
    for segment in rest {
        current = match (segment, current) {
            (PathSegment::Attribute(name), Value::M(map)) => map.get_mut(name)?,
            (PathSegment::Index(index), Value::L(list)) => list.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Evaluates `condition` against `item`. A missing item is an empty item.
pub fn evaluate(condition: &Condition, item: &Item) -> bool {
    match condition {
        Condition::Compare { left, op, right } => {
            match (operand_value(left, item), operand_value(right, item)) {
                (Some(l), Some(r)) => compare(&l, *op, &r),
                _ => false,
            }
        }
        Condition::Between { operand, low, high } => {
            let (Some(v), Some(lo), Some(hi)) = (
                operand_value(operand, item),
                operand_value(low, item),
                operand_value(high, item),
            ) else {
                return false;
            };
            compare(&v, CompareOp::Ge, &lo) && compare(&v, CompareOp::Le, &hi)
        }
        Condition::In { operand, list } => {
            let Some(v) = operand_value(operand, item) else {
                return false;
            };
            list.iter()
                .filter_map(|candidate| operand_value(candidate, item))
                .any(|candidate| candidate == v)
        }
        Condition::AttributeExists(path) => resolve(item, path).is_some(),
        Condition::AttributeNotExists(path) => resolve(item, path).is_none(),
        Condition::BeginsWith(path, prefix) => match (resolve(item, path), prefix) {
            (Some(Value::S(s)), Value::S(p)) => s.starts_with(p.as_str()),
            _ => false,
        },
        Condition::Contains(path, needle) => match (resolve(item, path), needle) {
            (Some(Value::S(s)), Value::S(n)) => s.contains(n.as_str()),
            (Some(Value::L(list)), n) => list.contains(n),
            (Some(Value::Ss(set)), Value::S(n)) => set.contains(n),
            (Some(Value::Ns(set)), Value::N(n)) => set.contains(n),
            _ => false,
        },
        Condition::And(left, right) => evaluate(left, item) && evaluate(right, item),
        Condition::Or(left, right) => evaluate(left, item) || evaluate(right, item),
        Condition::Not(inner) => !evaluate(inner, item),
    }
}

/// Rejects `BETWEEN` clauses whose literal bounds are of different types or
/// in descending order. Bounds read from the item are checked at evaluation.
pub fn check_between_bounds(condition: &Condition) -> Result<(), ExpressionError> {
    match condition {
        Condition::Between {
            low: Operand::Value(low),
            high: Operand::Value(high),
            ..
        } => match (low, high) {
            (Value::S(a), Value::S(b)) if a.as_bytes() > b.as_bytes() => {
                Err(ExpressionError::ReversedBetweenBounds)
            }
            (Value::N(a), Value::N(b)) if a > b => Err(ExpressionError::ReversedBetweenBounds),
            (Value::S(_), Value::S(_)) | (Value::N(_), Value::N(_)) => Ok(()),
            _ => Err(ExpressionError::MismatchedBetweenBounds),
        },
        Condition::And(left, right) | Condition::Or(left, right) => {
            check_between_bounds(left)?;
            check_between_bounds(right)
        }
        Condition::Not(inner) => check_between_bounds(inner),
        _ => Ok(()),
    }
}

fn operand_value(operand: &Operand, item: &Item) -> Option<Value> {
    match operand {
        Operand::Path(path) => resolve(item, path).cloned(),
        Operand::Value(value) => Some(value.clone()),
        Operand::Size(path) => resolve(item, path).and_then(size_of).map(Value::N),
    }
}

fn size_of(value: &Value) -> Option<Number> {
    let size = match value {
        Value::S(s) => s.len(),
        Value::L(list) => list.len(),
        Value::M(map) => map.len(),
        Value::Ss(set) => set.len(),
        Value::Ns(set) => set.len(),
        Value::N(_) | Value::Bool(_) | Value::Null => return None,
    };
    Some(Number::from(i64::try_from(size).ok()?))
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::S(a), Value::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::N(a), Value::N(b)) => Some(a.cmp(b)),
        _ => None,
    };

    match (op, ordering) {
        (CompareOp::Eq, _) => left == right,
        (CompareOp::Ne, _) => left != right,
        (CompareOp::Lt, Some(o)) => o == Ordering::Less,
        (CompareOp::Le, Some(o)) => o != Ordering::Greater,
        (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
        (CompareOp::Ge, Some(o)) => o != Ordering::Less,
        (_, None) => false,
    }
}

/// Applies update actions in order.
///
/// `SET` on a nested path requires its parent to exist; `REMOVE` of a missing
/// path is a no-op. On error the item may be partially modified, so callers
/// apply updates to a copy.
pub fn apply_update(item: &mut Item, actions: &[UpdateAction]) -> Result<(), ExpressionError> {
    for action in actions {
        match action {
            UpdateAction::Set(path, value) => set_path(item, path, value.clone())?,
            UpdateAction::Remove(path) => remove_path(item, path),
        }
    }
    Ok(())
}

fn invalid_update(path: &Path) -> ExpressionError {
    ExpressionError::InvalidUpdatePath(path.to_string())
}

fn set_path(item: &mut Item, path: &Path, value: Value) -> Result<(), ExpressionError> {
    let Some((last, parent)) = path.segments().split_last() else {
        return Err(invalid_update(path));
    };

    if parent.is_empty() {
        let PathSegment::Attribute(name) = last else {
            return Err(invalid_update(path));
        };
        item.insert(name.clone(), value);
        return Ok(());
    }

    let target = resolve_mut(item, parent).ok_or_else(|| invalid_update(path))?;
    match (last, target) {
        (PathSegment::Attribute(name), Value::M(map)) => {
            map.insert(name.clone(), value);
        }
        (PathSegment::Index(index), Value::L(list)) => {
            if *index < list.len() {
                list[*index] = value;
            } else {
                list.push(value);
            }
        }
        _ => return Err(invalid_update(path)),
    }
    Ok(())
}

fn remove_path(item: &mut Item, path: &Path) {
    let Some((last, parent)) = path.segments().split_last() else {
        return;
    };

    if parent.is_empty() {
        if let PathSegment::Attribute(name) = last {
            item.remove(name);
        }
        return;
    }

    match (last, resolve_mut(item, parent)) {
        (PathSegment::Attribute(name), Some(Value::M(map))) => {
            map.remove(name);
        }
        (PathSegment::Index(index), Some(Value::L(list))) if *index < list.len() => {
            list.remove(*index);
        }
        _ => {}
    }
}

/// Copies only the projected paths of `item`. Missing paths are skipped and
/// list elements selected by index are packed in projection order.
pub fn project(item: &Item, projection: &Projection) -> Item {
    let mut out = Item::new();
    for path in projection.paths() {
        if let Some(value) = resolve(item, path) {
            insert_projected(&mut out, path.segments(), value.clone());
        }
    }
    out
}

fn insert_projected(out: &mut Item, segments: &[PathSegment], value: Value) {
    let Some((PathSegment::Attribute(name), rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        out.insert(name.clone(), value);
        return;
    }
    let slot = out
        .entry(name.clone())
        .or_insert_with(|| empty_container(&rest[0]));
    insert_into(slot, rest, value);
}

fn insert_into(target: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        return;
    };
    match (segment, target) {
        (PathSegment::Attribute(name), Value::M(map)) => {
            if rest.is_empty() {
                map.insert(name.clone(), value);
            } else {
                let slot = map
                    .entry(name.clone())
                    .or_insert_with(|| empty_container(&rest[0]));
                insert_into(slot, rest, value);
            }
        }
        (PathSegment::Index(_), Value::L(list)) => {
            if rest.is_empty() {
                list.push(value);
            } else {
                let mut slot = empty_container(&rest[0]);
                insert_into(&mut slot, rest, value);
                list.push(slot);
            }
        }
        _ => {}
    }
}

fn empty_container(next: &PathSegment) -> Value {
    match next {
        PathSegment::Attribute(_) => Value::M(Item::new()),
        PathSegment::Index(_) => Value::L(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ast::{KeyCondition, SortKeyCondition};

    fn path(text: &str) -> Path {
        text.parse().unwrap()
    }

    fn movie() -> Item {
        let json = serde_json::json!({
            "year": 2015,
            "title": "Waddup the movie time",
            "info": {
                "plot": "Everything happens all at once.",
                "rating": 3.5,
                "actors": ["David", "Alex", "Chiran"],
            }
        });
        match Value::from_json(json).unwrap() {
            Value::M(item) => item,
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_nested_and_indexed_paths() {
        let item = movie();
        assert_eq!(resolve(&item, &path("info.actors[1]")), Some(&Value::from("Alex")));
        assert_eq!(
            resolve(&item, &path("info.rating")),
            Some(&Value::number("3.5").unwrap())
        );
        assert_eq!(resolve(&item, &path("info.actors[7]")), None);
        assert_eq!(resolve(&item, &path("info.plot.deeper")), None);
        assert_eq!(resolve(&item, &path("missing")), None);
    }

    #[test]
    fn test_numeric_comparison_is_exact() {
        let item = movie();
        assert!(!evaluate(&path("info.rating").le(2), &item));
        assert!(evaluate(&path("info.rating").le(Value::number("3.5").unwrap()), &item));
        assert!(evaluate(&path("info.rating").gt(Value::number("3.4999999999").unwrap()), &item));
        assert!(evaluate(&path("info.rating").equals(Value::number("3.50").unwrap()), &item));
    }

    #[test]
    fn test_missing_attribute_comparisons_are_false() {
        let item = movie();
        assert!(!evaluate(&path("info.budget").le(2), &item));
        assert!(!evaluate(&path("info.budget").not_equals(2), &item));
        assert!(!evaluate(&path("info.budget").between(1, 2), &item));
    }

    #[test]
    fn test_mismatched_types() {
        let item = movie();
        assert!(!evaluate(&path("title").equals(2015), &item));
        assert!(evaluate(&path("title").not_equals(2015), &item));
        assert!(!evaluate(&path("title").lt(2015), &item));
    }

    #[test]
    fn test_size_operand() {
        let item = movie();
        assert!(evaluate(&path("info.actors").size().ge(3), &item));
        assert!(!evaluate(&path("info.actors").size().gt(3), &item));
        assert!(evaluate(&path("title").size().equals(21), &item));
        assert!(!evaluate(&path("year").size().ge(0), &item));
    }

    #[test]
    fn test_functions_and_logic() {
        let item = movie();
        assert!(evaluate(&path("info").exists(), &item));
        assert!(evaluate(&path("info.genres").not_exists(), &item));
        assert!(evaluate(&path("title").begins_with("Wad"), &item));
        assert!(evaluate(&path("info.actors").contains("Chiran"), &item));
        assert!(evaluate(&path("info.plot").contains("all at once"), &item));
        assert!(evaluate(&path("year").is_in([2013, 2015]), &item));
        assert!(evaluate(
            &path("year").equals(2015).and(path("info.rating").ge(3)),
            &item
        ));
        assert!(evaluate(
            &path("year").equals(1999).or(path("title").exists()),
            &item
        ));
        assert!(evaluate(&path("year").equals(1999).negate(), &item));
    }

    #[test]
    fn test_key_condition_between_on_strings() {
        let key = KeyCondition::partition_equals("year", 2015)
            .with_sort("title", SortKeyCondition::Between("A".into(), "L".into()));
        assert!(!evaluate(&key.to_condition(), &movie()));

        let key = KeyCondition::partition_equals("year", 2015)
            .with_sort("title", SortKeyCondition::Between("A".into(), "Z".into()));
        assert!(evaluate(&key.to_condition(), &movie()));
    }

    #[test]
    fn test_between_bounds() {
        assert_eq!(check_between_bounds(&path("year").between(1980, 1982)), Ok(()));
        assert_eq!(
            check_between_bounds(&path("year").between(1982, 1980)),
            Err(ExpressionError::ReversedBetweenBounds)
        );
        assert_eq!(
            check_between_bounds(&path("year").between(1980, "1982")),
            Err(ExpressionError::MismatchedBetweenBounds)
        );

        let key = KeyCondition::partition_equals("year", 1985)
            .with_sort("title", SortKeyCondition::Between("L".into(), "A".into()));
        assert_eq!(
            check_between_bounds(&key.to_condition()),
            Err(ExpressionError::ReversedBetweenBounds)
        );

        let nested = path("title").exists().and(path("year").between(2, 1).negate());
        assert_eq!(
            check_between_bounds(&nested),
            Err(ExpressionError::ReversedBetweenBounds)
        );
    }

    #[test]
    fn test_conditions_against_empty_item() {
        let empty = Item::new();
        assert!(evaluate(&path("year").not_exists(), &empty));
        assert!(!evaluate(&path("info.rating").le(2), &empty));
    }

    #[test]
    fn test_apply_set_nested_and_top_level() {
        let mut item = movie();
        apply_update(
            &mut item,
            &[
                UpdateAction::Set(path("info.rating"), Value::number("4.25").unwrap()),
                UpdateAction::Set(path("watched"), Value::Bool(true)),
                UpdateAction::Set(path("info.actors[1]"), "Alexandra".into()),
                UpdateAction::Set(path("info.actors[10]"), "Extra".into()),
            ],
        )
        .unwrap();

        assert_eq!(
            resolve(&item, &path("info.rating")),
            Some(&Value::number("4.25").unwrap())
        );
        assert_eq!(item["watched"], Value::Bool(true));
        assert_eq!(
            resolve(&item, &path("info.actors")),
            Some(&Value::L(vec![
                "David".into(),
                "Alexandra".into(),
                "Chiran".into(),
                "Extra".into()
            ]))
        );
    }

    #[test]
    fn test_set_requires_existing_parent() {
        let mut item = movie();
        let err = apply_update(
            &mut item,
            &[UpdateAction::Set(path("details.director"), "Someone".into())],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::InvalidUpdatePath("details.director".to_string())
        );
    }

    #[test]
    fn test_remove_list_element_shifts() {
        let mut item = movie();
        apply_update(&mut item, &[UpdateAction::Remove(path("info.actors[0]"))]).unwrap();
        assert_eq!(
            resolve(&item, &path("info.actors")),
            Some(&Value::L(vec!["Alex".into(), "Chiran".into()]))
        );
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut item = movie();
        let before = item.clone();
        apply_update(
            &mut item,
            &[
                UpdateAction::Remove(path("info.genres")),
                UpdateAction::Remove(path("info.actors[9]")),
                UpdateAction::Remove(path("nothing.here")),
            ],
        )
        .unwrap();
        assert_eq!(item, before);
    }

    #[test]
    fn test_project_selects_paths() {
        let item = movie();
        let projected = project(
            &item,
            &"year, title, info.rating, info.actors[0], info.genres"
                .parse()
                .unwrap(),
        );

        let expected = Value::from_json(serde_json::json!({
            "year": 2015,
            "title": "Waddup the movie time",
            "info": {"rating": 3.5, "actors": ["David"]},
        }))
        .unwrap();
        assert_eq!(Value::M(projected), expected);
    }
}
