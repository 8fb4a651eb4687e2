//! Reserved lifecycle actions and the trait that lets a [Store](crate::Store)
//! synthesize them without the user enumerating `INIT`/`REPLACE`/probe
//! variants in their own `Action` type.

/// Reserved action-type strings used internally by a [Store](crate::Store)
/// for lifecycle signaling. User [TypedAction::type_name()] implementations
/// should not return a string starting with `"@@reactive_state/"`.
pub mod action_types {
    /// Type name returned by [TypedAction::init()](super::TypedAction::init).
    pub const INIT: &str = "@@reactive_state/INIT";

    /// Type name returned by [TypedAction::replace()](super::TypedAction::replace).
    pub const REPLACE: &str = "@@reactive_state/REPLACE";

    /// Builds a freshly randomized probe action-type name, used by
    /// [combine_reducers!](crate::combine_reducers) to verify a slice
    /// reducer doesn't panic for an action type it doesn't recognise.
    pub fn probe_unknown_action_type() -> String {
        format!(
            "@@reactive_state/PROBE_UNKNOWN_ACTION_{:016x}",
            rand::random::<u64>()
        )
    }
}

/// Implemented by `Action` types that can be dispatched to a
/// [Store](crate::Store).
///
/// A store needs to synthesize three reserved actions over the lifetime of
/// its reducer: one at construction time ([TypedAction::init]), one whenever
/// the reducer is swapped via
/// [Store::replace_reducer()](crate::Store::replace_reducer)
/// ([TypedAction::replace]), and a freshly randomized one used purely to
/// smoke-test a reducer's shape ([TypedAction::probe_unknown]). This trait is
/// the statically-typed equivalent of a JS store reserving three magic
/// string constants: a value's `type_name()` is the Rust analogue of a
/// mandatory, non-undefined `type` field on a plain-object action.
pub trait TypedAction {
    /// The name of this action's type. An empty string is treated as the
    /// static-typing equivalent of an undefined `type` field, and is
    /// rejected by [Store::dispatch()](crate::Store::dispatch).
    fn type_name(&self) -> &str;

    /// Build the action dispatched once after
    /// [combine_reducers!](crate::combine_reducers) finishes constructing
    /// a composite reducer's slices.
    fn init() -> Self;

    /// Build the action dispatched once after
    /// [Store::replace_reducer()](crate::Store::replace_reducer).
    fn replace() -> Self;

    /// Build a probe action of a freshly randomized, reserved type, used to
    /// verify a reducer doesn't panic for action types it doesn't handle.
    fn probe_unknown(probe_type: String) -> Self;
}

#[cfg(test)]
mod tests {
    use super::action_types;

    #[test]
    fn probe_is_freshly_randomized() {
        let a = action_types::probe_unknown_action_type();
        let b = action_types::probe_unknown_action_type();
        assert_ne!(a, b);
        assert!(a.starts_with("@@reactive_state/PROBE_UNKNOWN_ACTION_"));
    }

    #[test]
    fn reserved_names_are_namespaced() {
        assert!(action_types::INIT.starts_with("@@reactive_state/"));
        assert!(action_types::REPLACE.starts_with("@@reactive_state/"));
    }
}
