//! Wraps an action creator so that calling it dispatches its result,
//! instead of returning it for the caller to dispatch manually.

/// Wrap `creator` so that calling the returned closure builds an `Action`
/// with `creator` and immediately dispatches it with `dispatch`.
///
/// ## Example
///
/// ```
/// use reduxide::bind_action_creator;
/// use std::{cell::RefCell, rc::Rc};
///
/// let dispatched = Rc::new(RefCell::new(Vec::new()));
/// let dispatched_clone = dispatched.clone();
///
/// let increment = bind_action_creator(
///     || "INCREMENT",
///     move |action| dispatched_clone.borrow_mut().push(action),
/// );
///
/// increment();
/// assert_eq!(*dispatched.borrow(), vec!["INCREMENT"]);
/// ```
pub fn bind_action_creator<Action>(
    creator: impl Fn() -> Action + 'static,
    dispatch: impl Fn(Action) + 'static,
) -> impl Fn() {
    move || dispatch(creator())
}

/// Build a struct of bound action creators from a map of `name:
/// action_creator_expression` pairs, binding each one to the same
/// `dispatch` closure via [bind_action_creator()].
///
/// ## Example
///
/// ```
/// use reduxide::bind_action_creators;
/// use std::{cell::RefCell, rc::Rc};
///
/// #[derive(Debug, PartialEq)]
/// enum CounterAction {
///     Increment,
///     Decrement,
/// }
///
/// let dispatched = Rc::new(RefCell::new(Vec::new()));
/// let dispatch = {
///     let dispatched = dispatched.clone();
///     move |action| dispatched.borrow_mut().push(action)
/// };
///
/// bind_action_creators! {
///     let actions = dispatch => {
///         increment: || CounterAction::Increment,
///         decrement: || CounterAction::Decrement,
///     }
/// }
///
/// (actions.increment)();
/// (actions.decrement)();
/// assert_eq!(*dispatched.borrow(), vec![CounterAction::Increment, CounterAction::Decrement]);
/// ```
#[macro_export]
macro_rules! bind_action_creators {
    (
        let $bound:ident = $dispatch:expr => {
            $( $name:ident : $creator:expr ),* $(,)?
        }
    ) => {
        struct BoundActionCreators {
            $( $name: Box<dyn Fn()>, )*
        }

        let $bound = {
            let dispatch = $dispatch;
            BoundActionCreators {
                $(
                    $name: Box::new($crate::bind_action_creator($creator, dispatch.clone())),
                )*
            }
        };
    };
}
