//! Thunk-style middleware: lets a dispatched value be either a plain
//! `Action` or a closure that can read the store's state and dispatch
//! further actions of its own before the original reducer ever sees
//! anything.

use super::{Middleware, ReduceFn, ReduceMiddlewareResult};
use crate::{Store, StoreEvent, TypedAction};
use std::{fmt::Debug, hash::Hash, rc::Rc};

/// A closure dispatched in place of a plain `Action`, given access to the
/// store's own `dispatch`/`state` so it can perform work before (or
/// instead of) dispatching a concrete action.
pub struct Thunk<State, Action>(Rc<dyn Fn(&dyn Fn(Action), &dyn Fn() -> Rc<State>)>);

impl<State, Action> Clone for Thunk<State, Action> {
    fn clone(&self) -> Self {
        Thunk(self.0.clone())
    }
}

impl<State, Action> Thunk<State, Action> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Fn(Action), &dyn Fn() -> Rc<State>) + 'static,
    {
        Thunk(Rc::new(f))
    }

    fn run(&self, dispatch: &dyn Fn(Action), get_state: &dyn Fn() -> Rc<State>) {
        (self.0)(dispatch, get_state)
    }
}

impl<State, Action> Debug for Thunk<State, Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thunk")
    }
}

/// A value dispatched through [ThunkMiddleware]: either a plain `Action`
/// bound for the reducer, or a [Thunk] to run instead.
#[derive(Debug, Clone)]
pub enum ThunkOrAction<State, Action> {
    Action(Action),
    Thunk(Thunk<State, Action>),
}

impl<State, Action> From<Action> for ThunkOrAction<State, Action> {
    fn from(action: Action) -> Self {
        ThunkOrAction::Action(action)
    }
}

/// Unwraps a [ThunkOrAction::Thunk], running it with closures bound to the
/// store's own `dispatch`/`state`, instead of sending it to the reducer.
/// A plain [ThunkOrAction::Action] passes through to `reduce` unchanged.
pub struct ThunkMiddleware;

impl<State, Action, Event, Effect> Middleware<State, ThunkOrAction<State, Action>, Event, Effect>
    for ThunkMiddleware
where
    State: 'static,
    Action: 'static,
    Event: StoreEvent + Clone + Hash + Eq,
    ThunkOrAction<State, Action>: TypedAction,
{
    fn on_reduce(
        &self,
        store: &Store<State, ThunkOrAction<State, Action>, Event, Effect>,
        action: Option<&ThunkOrAction<State, Action>>,
        reduce: ReduceFn<State, ThunkOrAction<State, Action>, Event, Effect>,
    ) -> ReduceMiddlewareResult<Event, Effect> {
        match action {
            Some(ThunkOrAction::Thunk(thunk)) => {
                let dispatch = |action: Action| store.dispatch(ThunkOrAction::Action(action));
                let get_state = || store.state();
                thunk.run(&dispatch, &get_state);

                ReduceMiddlewareResult::default()
            }
            _ => reduce(store, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Thunk, ThunkMiddleware, ThunkOrAction};
    use crate::{Reducer, ReducerResult, StoreEvent, StoreRef, TypedAction};
    use std::{cell::RefCell, rc::Rc};

    #[derive(Debug, PartialEq)]
    struct CounterState {
        counter: i32,
    }

    #[derive(Debug, Clone)]
    enum CounterAction {
        Increment,
        Init,
    }

    impl TypedAction for CounterAction {
        fn type_name(&self) -> &str {
            match self {
                CounterAction::Increment => "INCREMENT",
                CounterAction::Init => crate::action_types::INIT,
            }
        }
        fn init() -> Self {
            CounterAction::Init
        }
        fn replace() -> Self {
            CounterAction::Init
        }
        fn probe_unknown(_probe_type: String) -> Self {
            CounterAction::Init
        }
    }

    impl TypedAction for ThunkOrAction<CounterState, CounterAction> {
        fn type_name(&self) -> &str {
            match self {
                ThunkOrAction::Action(action) => action.type_name(),
                ThunkOrAction::Thunk(_) => "THUNK",
            }
        }
        fn init() -> Self {
            ThunkOrAction::Action(CounterAction::init())
        }
        fn replace() -> Self {
            ThunkOrAction::Action(CounterAction::replace())
        }
        fn probe_unknown(probe_type: String) -> Self {
            ThunkOrAction::Action(CounterAction::probe_unknown(probe_type))
        }
    }

    #[derive(Debug, PartialEq, Eq, Hash, Clone)]
    enum CounterEvent {
        Changed,
        None,
    }

    impl StoreEvent for CounterEvent {
        fn none() -> Self {
            CounterEvent::None
        }
        fn is_none(&self) -> bool {
            matches!(self, CounterEvent::None)
        }
    }

    struct CounterReducer;

    impl Reducer<CounterState, ThunkOrAction<CounterState, CounterAction>, CounterEvent, ()>
        for CounterReducer
    {
        fn reduce(
            &self,
            state: &Rc<CounterState>,
            action: &ThunkOrAction<CounterState, CounterAction>,
        ) -> ReducerResult<CounterState, CounterEvent, ()> {
            match action {
                ThunkOrAction::Action(CounterAction::Increment) => ReducerResult {
                    state: Rc::new(CounterState {
                        counter: state.counter + 1,
                    }),
                    events: vec![CounterEvent::Changed],
                    effects: vec![],
                },
                _ => ReducerResult {
                    state: state.clone(),
                    events: vec![],
                    effects: vec![],
                },
            }
        }
    }

    #[test]
    fn thunk_dispatches_plain_actions_through_the_reducer() {
        let store = StoreRef::new(CounterReducer, CounterState { counter: 0 });
        store.add_middleware(ThunkMiddleware);

        let seen = Rc::new(RefCell::new(0));
        let seen_clone = seen.clone();

        store.dispatch(ThunkOrAction::Thunk(Thunk::new(
            move |dispatch, get_state: &dyn Fn() -> Rc<CounterState>| {
                *seen_clone.borrow_mut() = get_state().counter;
                dispatch(CounterAction::Increment);
            },
        )));

        assert_eq!(*seen.borrow(), 0);
        assert_eq!(store.state().counter, 1);
    }

    #[test]
    fn thunk_can_dispatch_multiple_times() {
        let store = StoreRef::new(CounterReducer, CounterState { counter: 0 });
        store.add_middleware(ThunkMiddleware);

        store.dispatch(ThunkOrAction::Thunk(Thunk::new(|dispatch, _get_state| {
            dispatch(CounterAction::Increment);
            dispatch(CounterAction::Increment);
        })));

        assert_eq!(store.state().counter, 2);
    }
}
