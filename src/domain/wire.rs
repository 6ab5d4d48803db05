//! Decoding of backend task documents.
//!
//! The backend is loose about how placement is encoded: a task may carry
//! `column_id`, `column` or `columnId`, and each of those may be a plain id
//! or an embedded object with `_id`/`id`. Everything is normalized here so
//! the rest of the crate only sees typed [`Task`] values.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ids::{ColumnId, SwimlaneRef, TaskId};
use super::task::Task;
use crate::services::error_handling::BoardError;

const COLUMN_KEYS: [&str; 3] = ["column_id", "column", "columnId"];
const SWIMLANE_KEYS: [&str; 3] = ["swimlane_id", "swimlane", "swimlaneId"];

pub fn task_from_json(value: &Value) -> Result<Task, BoardError> {
    let id = ["_id", "id"]
        .iter()
        .find_map(|key| value.get(*key).and_then(id_of))
        .ok_or_else(|| BoardError::MalformedTask {
            id: None,
            reason: "missing id".to_string(),
        })?;

    let column = resolve_ref(value, &COLUMN_KEYS).ok_or_else(|| BoardError::MalformedTask {
        id: Some(TaskId::new(id.clone())),
        reason: "no column".to_string(),
    })?;
    let swimlane = SwimlaneRef::from_raw(resolve_ref(value, &SWIMLANE_KEYS).as_deref());

    let order = value.get("order").and_then(|v| order_of(&id, v));

    let tags = value
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|t| match t {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let updated_at = ["updated_at", "updatedAt"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));

    Ok(Task {
        id: TaskId::new(id),
        title: value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        column: ColumnId::new(column),
        swimlane,
        order,
        tags,
        updated_at,
    })
}

/// Decodes a list response, skipping documents that cannot be placed.
pub fn tasks_from_json(values: &[Value]) -> Vec<Task> {
    values
        .iter()
        .filter_map(|value| match task_from_json(value) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping task document");
                None
            }
        })
        .collect()
}

/// Numeric or numeric-string order. Anything else sorts the task last.
fn order_of(id: &str, value: &Value) -> Option<f64> {
    let order = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|o| o.is_finite());

    if order.is_none() {
        tracing::warn!(task_id = %id, order = %value, "Ignoring non-numeric task order");
    }
    order
}

fn resolve_ref(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| value.get(*key).and_then(id_of))
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(o) => ["_id", "id"]
            .iter()
            .find_map(|key| o.get(*key).and_then(id_of)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::SwimlaneId;
    use serde_json::json;

    #[test]
    fn test_plain_string_placement() {
        let task = task_from_json(&json!({
            "_id": "t1", "title": "Ship it", "column": "todo", "swimlane": "s1", "order": 2
        }))
        .unwrap();

        assert_eq!(task.id, TaskId::new("t1"));
        assert_eq!(task.column, ColumnId::new("todo"));
        assert_eq!(task.swimlane, SwimlaneRef::Assigned(SwimlaneId::new("s1")));
        assert_eq!(task.order, Some(2.0));
    }

    #[test]
    fn test_column_key_priority() {
        let task = task_from_json(&json!({
            "id": "t1", "column_id": "first", "column": "second", "columnId": "third"
        }))
        .unwrap();
        assert_eq!(task.column, ColumnId::new("first"));

        let task = task_from_json(&json!({ "id": "t1", "columnId": "third" })).unwrap();
        assert_eq!(task.column, ColumnId::new("third"));
    }

    #[test]
    fn test_embedded_objects() {
        let task = task_from_json(&json!({
            "_id": "t1",
            "column": { "_id": "c1", "name": "To Do" },
            "swimlaneId": { "id": "s2" },
            "tags": ["bug", { "name": "ui" }]
        }))
        .unwrap();

        assert_eq!(task.column, ColumnId::new("c1"));
        assert_eq!(task.swimlane, SwimlaneRef::Assigned(SwimlaneId::new("s2")));
        assert!(task.tags.contains("bug") && task.tags.contains("ui"));
    }

    #[test]
    fn test_default_swimlane_normalizes() {
        let task = task_from_json(&json!({ "_id": "t1", "column": "c1", "swimlane": "default" })).unwrap();
        assert_eq!(task.swimlane, SwimlaneRef::Unassigned);

        let task = task_from_json(&json!({ "_id": "t1", "column": "c1", "swimlane": null })).unwrap();
        assert_eq!(task.swimlane, SwimlaneRef::Unassigned);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let err = task_from_json(&json!({ "_id": "t1", "title": "Lost" })).unwrap_err();
        assert!(matches!(err, BoardError::MalformedTask { .. }));
    }

    #[test]
    fn test_list_skips_malformed() {
        let tasks = tasks_from_json(&[
            json!({ "_id": "t1", "column": "c1" }),
            json!({ "_id": "t2" }),
            json!({ "column": "c1" }),
            json!({ "_id": "t3", "column": "c1", "order": "high" }),
        ]);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);
    }

    #[test]
    fn test_loose_order_values() {
        let order = |value: Value| {
            task_from_json(&json!({ "_id": "t1", "column": "c1", "order": value }))
                .unwrap()
                .order
        };
        assert_eq!(order(json!("2")), Some(2.0));
        assert_eq!(order(json!(" 1.5 ")), Some(1.5));
        assert_eq!(order(json!("high")), None);
        assert_eq!(order(json!("NaN")), None);
        assert_eq!(order(json!({ "rank": 1 })), None);
        assert_eq!(order(Value::Null), None);

        let task = task_from_json(&json!({ "_id": "t1", "column": "c1", "order": "first" })).unwrap();
        assert_eq!(task.sort_key(), crate::domain::task::UNORDERED_SENTINEL);
    }
}
