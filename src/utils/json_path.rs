//! Dotted-path access into nested JSON (`reportInfo.customer`, `insulationResistance.rows.2.p1`).
//! Numeric segments index arrays; every other segment is an object key.

use serde_json::{Map, Value};

pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

pub fn get_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

/// Writes `value` at `path`, creating missing object keys on the way.
/// Array slots must already exist; returns false when the path cannot be reached.
pub fn set(root: &mut Value, path: &str, value: Value) -> bool {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };

    match root {
        Value::Object(map) => match rest {
            None => {
                map.insert(head.to_string(), value);
                true
            }
            Some(rest) => {
                let child = map
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                set(child, rest, value)
            }
        },
        Value::Array(items) => {
            let Ok(index) = head.parse::<usize>() else {
                return false;
            };
            match (items.get_mut(index), rest) {
                (Some(slot), None) => {
                    *slot = value;
                    true
                }
                (Some(slot), Some(rest)) => set(slot, rest, value),
                (None, _) => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_object_and_array() {
        let doc = json!({"ir": {"rows": [{"p1": "10"}, {"p1": "20"}]}});
        assert_eq!(get(&doc, "ir.rows.1.p1"), Some(&json!("20")));
        assert_eq!(get(&doc, "ir.rows.5.p1"), None);
        assert_eq!(get(&doc, "ir.missing"), None);
    }

    #[test]
    fn test_set_creates_objects_but_not_array_slots() {
        let mut doc = json!({"rows": [{}]});
        assert!(set(&mut doc, "reportInfo.customer", json!("Acme")));
        assert!(set(&mut doc, "rows.0.p1", json!("5")));
        assert!(!set(&mut doc, "rows.3.p1", json!("5")));
        assert_eq!(doc["reportInfo"]["customer"], "Acme");
        assert_eq!(doc["rows"][0]["p1"], "5");
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut doc = json!({"temperature": {"celsius": 0}});
        if let Some(slot) = get_mut(&mut doc, "temperature.celsius") {
            *slot = json!(20);
        }
        assert_eq!(doc["temperature"]["celsius"], 20);
    }
}
