//! [Middleware] used to modify the behaviour of a [Store] during a
//! [Store::dispatch()]. This module also contains some simple
//! middleware implementations which can be used as utilities in an
//! application.

pub mod simple_logger;
pub mod thunk;

use crate::{Store, StoreEvent, StoreRef, TypedAction};
use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

pub struct ReduceMiddlewareResult<Event, Effect> {
    pub events: Vec<Event>,
    pub effects: Vec<Effect>,
}

impl<Event, Effect> Default for ReduceMiddlewareResult<Event, Effect> {
    fn default() -> Self {
        ReduceMiddlewareResult {
            events: Vec::new(),
            effects: Vec::new(),
        }
    }
}

/// Executes subsequent middleware and then runs the [Reducer](crate::Reducer).
pub type ReduceFn<State, Action, Event, Effect> = fn(
    &Store<State, Action, Event, Effect>,
    Option<&Action>,
) -> ReduceMiddlewareResult<Event, Effect>;

/// Executes subsequent middleware and then notifies the listeners.
pub type NotifyFn<State, Action, Event, Effect> =
    fn(&Store<State, Action, Event, Effect>, Vec<Event>) -> Vec<Event>;

/// `Middleware` used to modify the behaviour of a [Store] during a
/// [Store::dispatch()].
pub trait Middleware<State, Action, Event, Effect> {
    /// Invoked once per middleware, in order, by
    /// [apply_middleware()] before any middleware is actually wired into
    /// the store's dispatch chain. `api.dispatch()` panics if called from
    /// here: none of the middleware being set up is installed yet, so
    /// there's nothing for a dispatch to run through.
    fn setup(&self, _api: &MiddlewareApi<State, Action>) {}

    /// This method is invoked by the [Store] during a
    /// [Store::dispatch()] just before the `Action` is sent to the
    /// [Reducer](crate::Reducer). It is necessary to call the
    /// provided `reduce` function, which executes subsequent
    /// middleware and runs the [Reducer](crate::Reducer), and usually
    /// the events produced by the `reduce` function are returned from
    /// this method.
    ///
    /// This method allows modifying the action in question, or even
    /// removing it, preventing the [Reducer](crate::Reducer) from
    /// processing the action. It also allows modifying the events
    /// produced by the [Reducer](crate::Reducer) before the
    /// [Middleware::on_notify()] is invoked and they are sent to the
    /// [Store] listeners.
    fn on_reduce(
        &self,
        store: &Store<State, Action, Event, Effect>,
        action: Option<&Action>,
        reduce: ReduceFn<State, Action, Event, Effect>,
    ) -> ReduceMiddlewareResult<Event, Effect> {
        reduce(store, action)
    }

    /// Process an `Effect`. Returns `None` if the effect was
    /// processed/consumed by this handler, otherwise returns
    /// `Some(effect)`.
    fn process_effect(
        &self,
        _store: &Store<State, Action, Event, Effect>,
        effect: Effect,
    ) -> Option<Effect> {
        Some(effect)
    }

    /// This method is invoked by the [Store] during a
    /// [Store::dispatch()] after the [Reducer](crate::Reducer) has
    /// processed the `Action` and all [Middleware::on_reduce()]
    /// methods have completed, just before resulting events are
    /// sent to the store listeners. It is necessary to call the
    /// provided `notify` function, which executes subsequent
    /// middleware and then notifies the listeners.
    ///
    /// This method allows modifying the events in question before the
    /// listeners are notified.
    fn on_notify(
        &self,
        store: &Store<State, Action, Event, Effect>,
        events: Vec<Event>,
        notify: NotifyFn<State, Action, Event, Effect>,
    ) -> Vec<Event> {
        notify(store, events)
    }
}

/// Handle given to [Middleware::setup()] during [apply_middleware()], giving
/// a middleware access to the store's state and dispatch before it (or any
/// of the other middleware being installed alongside it) has actually been
/// wired into the store's dispatch chain.
pub struct MiddlewareApi<State, Action> {
    get_state: Rc<dyn Fn() -> Rc<State>>,
    dispatch: Rc<dyn Fn(Action)>,
}

impl<State, Action> MiddlewareApi<State, Action> {
    /// The store's current state.
    pub fn get_state(&self) -> Rc<State> {
        (self.get_state)()
    }

    /// Dispatch `action` to the store. Panics if called before
    /// [apply_middleware()] has finished running every middleware's
    /// [Middleware::setup()].
    pub fn dispatch(&self, action: Action) {
        (self.dispatch)(action)
    }
}

/// A store enhancer: installs `middlewares`, in order, onto `store`.
///
/// Before any middleware is wired into the dispatch chain, every
/// middleware's [Middleware::setup()] is called, in order, with a
/// [MiddlewareApi] whose `dispatch` is trapped to panic
/// (`"Dispatching while constructing your middleware is not allowed."`).
/// Once every `setup()` call has returned without panicking, the trap is
/// disarmed and every middleware is installed via
/// [Store::add_middleware_rc()], in the same order, so the existing
/// recursive middleware chain picks them up on the next dispatch.
pub fn apply_middleware<State, Action, Event, Effect>(
    store: &StoreRef<State, Action, Event, Effect>,
    middlewares: Vec<Rc<dyn Middleware<State, Action, Event, Effect>>>,
) where
    State: 'static,
    Action: TypedAction + 'static,
    Event: StoreEvent + Clone + Hash + Eq + 'static,
    Effect: 'static,
{
    let armed = Rc::new(Cell::new(false));

    let get_state: Rc<dyn Fn() -> Rc<State>> = {
        let store = store.clone();
        Rc::new(move || store.state())
    };

    let dispatch: Rc<dyn Fn(Action)> = {
        let store = store.clone();
        let armed = armed.clone();
        Rc::new(move |action: Action| {
            assert!(
                armed.get(),
                "Dispatching while constructing your middleware is not allowed."
            );
            store.dispatch(action);
        })
    };

    let api = MiddlewareApi { get_state, dispatch };

    for middleware in &middlewares {
        middleware.setup(&api);
    }

    armed.set(true);

    for middleware in middlewares {
        store.add_middleware_rc(middleware);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reducer, ReducerResult, StoreRef};
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    struct CounterState {
        counter: i32,
    }

    #[derive(Debug, Clone, Copy)]
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

    impl Reducer<CounterState, CounterAction, CounterEvent, ()> for CounterReducer {
        fn reduce(
            &self,
            state: &Rc<CounterState>,
            action: &CounterAction,
        ) -> ReducerResult<CounterState, CounterEvent, ()> {
            match action {
                CounterAction::Increment => ReducerResult {
                    state: Rc::new(CounterState {
                        counter: state.counter + 1,
                    }),
                    events: vec![CounterEvent::Changed],
                    effects: vec![],
                },
                CounterAction::Init => ReducerResult {
                    state: state.clone(),
                    events: vec![],
                    effects: vec![],
                },
            }
        }
    }

    struct TracingMiddleware {
        name: &'static str,
        trace: Rc<RefCell<Vec<String>>>,
    }

    impl Middleware<CounterState, CounterAction, CounterEvent, ()> for TracingMiddleware {
        fn on_reduce(
            &self,
            store: &Store<CounterState, CounterAction, CounterEvent, ()>,
            action: Option<&CounterAction>,
            reduce: ReduceFn<CounterState, CounterAction, CounterEvent, ()>,
        ) -> ReduceMiddlewareResult<CounterEvent, ()> {
            self.trace.borrow_mut().push(format!("{}-in", self.name));
            let result = reduce(store, action);
            self.trace.borrow_mut().push(format!("{}-out", self.name));
            result
        }
    }

    #[test]
    fn apply_middleware_installs_in_order() {
        let store = StoreRef::new(CounterReducer, CounterState { counter: 0 });
        let trace = Rc::new(RefCell::new(Vec::new()));

        apply_middleware(
            &store,
            vec![
                Rc::new(TracingMiddleware {
                    name: "A",
                    trace: trace.clone(),
                }),
                Rc::new(TracingMiddleware {
                    name: "B",
                    trace: trace.clone(),
                }),
                Rc::new(TracingMiddleware {
                    name: "C",
                    trace: trace.clone(),
                }),
            ],
        );

        store.dispatch(CounterAction::Increment);

        assert_eq!(
            *trace.borrow(),
            vec!["A-in", "B-in", "C-in", "C-out", "B-out", "A-out"]
        );
    }

    struct SetupDispatchingMiddleware;

    impl Middleware<CounterState, CounterAction, CounterEvent, ()> for SetupDispatchingMiddleware {
        fn setup(&self, api: &MiddlewareApi<CounterState, CounterAction>) {
            api.dispatch(CounterAction::Increment);
        }
    }

    #[test]
    #[should_panic(expected = "Dispatching while constructing your middleware is not allowed.")]
    fn setup_dispatch_panics() {
        let store = StoreRef::new(CounterReducer, CounterState { counter: 0 });
        apply_middleware(&store, vec![Rc::new(SetupDispatchingMiddleware)]);
    }
}
