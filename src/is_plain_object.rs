//! Structural probe for dynamically-typed input crossing into a statically
//! typed [Store](crate::Store), used by
//! [Store::dispatch_json()](crate::Store::dispatch_json).

use serde_json::Value;

/// Returns `true` iff `value` is a plain JSON object (as opposed to an
/// array, a primitive, or `null`).
///
/// `Action`/`State` are ordinary Rust types whose shape is fixed by the
/// compiler at every call site, so this predicate has no work to do there.
/// It earns its keep at the one boundary where this crate still deals in
/// untyped data: a caller handing the store a raw [serde_json::Value], e.g.
/// one read off an IPC channel or a scripting bridge, before it has been
/// deserialized into a concrete `Action`.
pub fn is_plain_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

#[cfg(test)]
mod tests {
    use super::is_plain_object;
    use serde_json::{json, Value};

    #[test]
    fn accepts_object() {
        assert!(is_plain_object(&json!({ "type": "INCREMENT" })));
    }

    #[test]
    fn rejects_array() {
        assert!(!is_plain_object(&json!(["INCREMENT"])));
    }

    #[test]
    fn rejects_primitives_and_null() {
        assert!(!is_plain_object(&json!("INCREMENT")));
        assert!(!is_plain_object(&json!(42)));
        assert!(!is_plain_object(&json!(true)));
        assert!(!is_plain_object(&Value::Null));
    }
}
