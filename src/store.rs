use crate::{
    middleware::{Middleware, ReduceMiddlewareResult},
    AsListener, Listener, Reducer, StoreEvent, TypedAction,
};
use std::iter::FromIterator;
use std::ops::Deref;
use std::{
    cell::{Cell, RefCell},
    collections::{HashSet, VecDeque},
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
    rc::Rc,
};

/// RAII guard marking that a store's [Reducer::reduce()] is currently
/// executing. Held for precisely the duration of that call so that
/// `state()`/`subscribe*()`/`dispatch()` invoked re-entrantly from within a
/// reducer panic, while the same calls made from a listener or middleware
/// hook (which run after this guard has already been dropped) remain legal.
struct ReducingGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ReducingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        assert!(
            !flag.get(),
            "cannot call Store::dispatch() from within a Reducer::reduce() implementation"
        );
        flag.set(true);
        ReducingGuard { flag }
    }
}

impl<'a> Drop for ReducingGuard<'a> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// RAII guard saving and restoring [Store::prev_middleware] around one
/// traversal of the middleware chain (a reduce, an effect, or a notify
/// pass). Without this, a `dispatch()` issued re-entrantly from inside a
/// middleware hook would reset the shared index mid-traversal and never
/// restore it, corrupting the outer traversal once the nested call returns.
struct MiddlewareIndexGuard<'a> {
    cell: &'a Cell<i32>,
    saved: i32,
}

impl<'a> MiddlewareIndexGuard<'a> {
    fn enter(cell: &'a Cell<i32>) -> Self {
        let saved = cell.get();
        cell.set(-1);
        MiddlewareIndexGuard { cell, saved }
    }
}

impl<'a> Drop for MiddlewareIndexGuard<'a> {
    fn drop(&mut self) {
        self.cell.set(self.saved);
    }
}

/// A [Listener] associated with (listening to) a given set of
/// `Events`s produced by a [Store::dispatch()].
struct ListenerEventPair<State, Event> {
    pub listener: Listener<State, Event>,
    pub events: HashSet<Event>,
}

impl<State, Event> Debug for ListenerEventPair<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListenerEventPair")
    }
}

/// An action to modify some aspect of the [Store], to be stored in a
/// queue and executed at the start of a [Store::dispatch()] for a
/// given `Action`.
enum StoreModification<State, Action, Event, Effect> {
    AddListener(ListenerEventPair<State, Event>),
    AddMiddleware(Rc<dyn Middleware<State, Action, Event, Effect>>),
}

/// A wrapper for an [Rc] reference to a [Store].
///
/// This wrapper exists to provide a standard interface for re-useable
/// middleware and other components which may require a long living
/// reference to the store in order to dispatch actions or modify it
/// in some manner that could not be handled by a simple `&Store`.
pub struct StoreRef<State, Action, Event, Effect>(Rc<Store<State, Action, Event, Effect>>);

impl<State, Action, Event, Effect> Clone for StoreRef<State, Action, Event, Effect> {
    fn clone(&self) -> Self {
        StoreRef(self.0.clone())
    }
}

impl<State, Action, Event, Effect> StoreRef<State, Action, Event, Effect>
where
    Event: StoreEvent + Clone + Hash + Eq,
    Action: TypedAction,
{
    pub fn new<R: Reducer<State, Action, Event, Effect> + 'static>(
        reducer: R,
        initial_state: State,
    ) -> Self {
        Self(Rc::new(Store::new(reducer, initial_state)))
    }
}

impl<State, Action, Event, Effect> Deref for StoreRef<State, Action, Event, Effect> {
    type Target = Store<State, Action, Event, Effect>;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<State, Action, Event, Effect> PartialEq for StoreRef<State, Action, Event, Effect> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// This struct is designed to operate as a central source of truth
/// and global "immutable" state within your application.
///
/// The current state of this store ([Store::state()]()) can only be
/// modified by dispatching an `Action` via [Store::dispatch()] to the
/// store. These actions are taken by a [Reducer] which you provided
/// to the store (at construction) and a new current state is
/// produced. The reducer also produces `Events` associated with the
/// change. The previous state is never mutated, and remains as a
/// reference for any element of your application which may rely upon
/// it (ensure that it gets dropped when it is no longer required,
/// lest it become a memory leak when large `State`s are involved).
///
/// Listeners can susbscribe to changes to the `State` in this store
/// (and `Event`s produced) with [Store::subscribe()], or they can
/// also subscribe to changes associated with specific `Event`s via
/// [subscribe_event()](Store::subscribe_event())/[subscribe_events()](Store::subscribe_events()).
pub struct Store<State, Action, Event, Effect> {
    /// Queue of [StoreModification]s to be executed by
    /// [Store::dispatch()] before the next `Action` is dispatched.
    modification_queue: RefCell<VecDeque<StoreModification<State, Action, Event, Effect>>>,
    /// The [Reducer] for this store, which takes `Actions`, modifies
    /// the `State` stored in this store, and produces `Events` to be
    /// sent to the store listeners. Held behind a [RefCell] so
    /// [Store::replace_reducer()] can swap it out.
    reducer: RefCell<Box<dyn Reducer<State, Action, Event, Effect>>>,
    /// Set for the duration of a [Reducer::reduce()] call. Used to
    /// reject re-entrant `state()`/`subscribe*()`/`dispatch()` calls
    /// made synchronously from within a reducer.
    in_reducer: Cell<bool>,
    /// The current state of this store.
    state: RefCell<Rc<State>>,
    /// The listeners which are notified of changes to the state of
    /// this store, and events produced by this store during a
    /// [Store::dispatch()].
    listeners: RefCell<Vec<ListenerEventPair<State, Event>>>,
    /// Middleware which modifies the functionality of this store.
    middleware: RefCell<Vec<Rc<dyn Middleware<State, Action, Event, Effect>>>>,
    /// Used during recursive execution of [Middleware] to keep track
    /// of the middleware currently executing. It is an index into
    /// [Store::middleware].
    prev_middleware: Cell<i32>,
    phantom_action: PhantomData<Action>,
    phantom_event: PhantomData<Event>,
}

impl<State, Action, Event, Effect> Store<State, Action, Event, Effect>
where
    Event: StoreEvent + Clone + Hash + Eq,
    Action: TypedAction,
{
    /// Create a new [Store], which uses the specified `reducer` to
    /// handle `Action`s which mutate the state and produce `Event`s,
    /// and with the `initial_state`.
    pub fn new<R: Reducer<State, Action, Event, Effect> + 'static>(
        reducer: R,
        initial_state: State,
    ) -> Self {
        Self {
            modification_queue: RefCell::new(VecDeque::new()),
            reducer: RefCell::new(Box::new(reducer)),
            in_reducer: Cell::new(false),
            state: RefCell::new(Rc::new(initial_state)),
            listeners: RefCell::new(Vec::new()),
            middleware: RefCell::new(Vec::new()),
            prev_middleware: Cell::new(-1),
            phantom_action: PhantomData,
            phantom_event: PhantomData,
        }
    }

    /// Get the current `State` stored in this store.
    ///
    /// Modifications to this state need to be performed by
    /// dispatching an `Action` to the store using
    /// [dispatch()](Store::dispatch()).
    ///
    /// Panics if called synchronously from within a [Reducer::reduce()]
    /// running on this store.
    pub fn state(&self) -> Rc<State> {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::state() from within a Reducer::reduce() implementation"
        );
        self.state.borrow().clone()
    }

    /// Replace this store's [Reducer], then dispatch a synthetic
    /// [TypedAction::replace()] so every slice can seed itself against
    /// the new reducer's shape.
    pub fn replace_reducer<R: Reducer<State, Action, Event, Effect> + 'static>(&self, next: R) {
        *self.reducer.borrow_mut() = Box::new(next);
        self.dispatch(Action::replace());
    }

    /// Dispatch an `Action` to the reducer on this `Store` without
    /// invoking middleware.
    fn dispatch_reducer(&self, action: &Action) -> ReduceMiddlewareResult<Event, Effect> {
        let prev_state = self.state();
        let result = {
            let _guard = ReducingGuard::enter(&self.in_reducer);
            self.reducer.borrow().reduce(&prev_state, action)
        };
        *self.state.borrow_mut() = result.state;

        ReduceMiddlewareResult {
            events: result.events,
            effects: result.effects,
        }
    }

    /// Dispatch an `Action` to the reducer on this `Store`, invoking
    /// all middleware's [reduce()][Middleware::reduce()] first.
    fn middleware_reduce(&self, action: &Action) -> ReduceMiddlewareResult<Event, Effect> {
        let _guard = MiddlewareIndexGuard::enter(&self.prev_middleware);
        self.middleware_reduce_next(Some(action))
    }

    /// A recursive function which executes each middleware for this
    /// store, and invokes the next middleware, until all middleware
    /// has been invoked, at which point the `Action` is sent to the
    /// reducer.
    fn middleware_reduce_next(
        &self,
        action: Option<&Action>,
    ) -> ReduceMiddlewareResult<Event, Effect> {
        let current_middleware = self.prev_middleware.get() + 1;
        self.prev_middleware.set(current_middleware);

        let middleware_count = self.middleware.borrow().len() as i32;
        if current_middleware == middleware_count {
            return match action {
                Some(action) => self.dispatch_reducer(action),
                None => ReduceMiddlewareResult::default(),
            };
        }

        // Bound to a local first, rather than chained directly off
        // `self.middleware.borrow()[..]`, so the borrow is released before
        // `on_reduce` runs: `on_reduce` may dispatch re-entrantly, and a
        // nested dispatch that reached this point would need its own shared
        // borrow of `middleware` (and `process_pending_modifications` would
        // need a mutable one).
        let middleware = self.middleware.borrow()[current_middleware as usize].clone();
        middleware.on_reduce(self, action, Self::middleware_reduce_next)
    }

    /// Process all the `Effect`s returned by the [Reducer::reduce()]
    /// by invoking the middleware on this store to perform the
    /// processing using [Middleware::process_effect()].q
    fn middleware_process_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.middleware_process_effect(effect);
        }
    }

    /// Process the specified `Effect`, invoking all middleware in this
    /// store to perform the processing using
    /// [Middleware::process_effect()].
    fn middleware_process_effect(&self, effect: Effect) {
        let _guard = MiddlewareIndexGuard::enter(&self.prev_middleware);
        self.middleware_process_effects_next(effect);
    }

    /// A recursive function which executes each middleware for this
    /// store to process the specified `Effect` with
    /// [Middleware::process_effect()], and invokes the next
    /// middleware, until all middleware has been invoked.
    fn middleware_process_effects_next(&self, effect: Effect) {
        let current_middleware = self.prev_middleware.get() + 1;
        self.prev_middleware.set(current_middleware);

        let middleware_count = self.middleware.borrow().len() as i32;
        if current_middleware == middleware_count {
            return;
        }

        let middleware = self.middleware.borrow()[current_middleware as usize].clone();
        match middleware.process_effect(self, effect) {
            Some(effect) => self.middleware_process_effects_next(effect),
            None => {}
        }
    }

    /// Notify store listeners of events produced during a reduce as a
    /// result of an `Action` being dispatched. Invokes all
    /// middleware's [reduce()][Middleware::reduce()] first.
    /// Notification occurs even if there are no events to report.
    fn middleware_notify(&self, events: Vec<Event>) -> Vec<Event> {
        let _guard = MiddlewareIndexGuard::enter(&self.prev_middleware);
        self.middleware_notify_next(events)
    }

    /// A recursive function which executes each middleware for this
    /// store, and invokes the next middleware, until all middleware
    /// has been invoked, at which point the listeners are notified of
    /// the envents produced during a reduce as a result of an
    /// `Action` being dispatched. Notification occurs even if there
    /// are no events to report.
    fn middleware_notify_next(&self, events: Vec<Event>) -> Vec<Event> {
        let current_middleware = self.prev_middleware.get() + 1;
        self.prev_middleware.set(current_middleware);

        let middleware_count = self.middleware.borrow().len() as i32;
        if current_middleware == middleware_count {
            return events;
        }

        let middleware = self.middleware.borrow()[current_middleware as usize].clone();
        middleware.on_notify(self, events, Self::middleware_notify_next)
    }

    /// Notify store listeners of events produced during a result of
    /// an `Action` being dispatched. Notification occurs even if
    /// there are no events to report.
    fn notify_listeners(&self, events: Vec<Event>) {
        // Snapshot the listener list before calling out to any of them: a
        // listener is free to dispatch re-entrantly, and a nested dispatch
        // needs its own borrows of `self.listeners` (to add/prune) while
        // this notification is still in progress.
        let snapshot: Vec<ListenerEventPair<State, Event>> = self
            .listeners
            .borrow()
            .iter()
            .map(|pair| ListenerEventPair {
                listener: pair.listener.as_listener(),
                events: pair.events.clone(),
            })
            .collect();

        for pair in &snapshot {
            if let Some(callback) = pair.listener.as_callback() {
                if pair.events.is_empty() {
                    // Bound to a local first: chaining `.clone()` directly off
                    // `self.state.borrow()` as the call argument would keep
                    // the borrow alive for the duration of `callback.emit()`,
                    // which panics if the callback dispatches re-entrantly.
                    let state = self.state.borrow().clone();
                    callback.emit(state, Event::none());
                } else {
                    //  call the listener for every matching listener event
                    for event in &events {
                        if pair.events.contains(event) {
                            let state = self.state.borrow().clone();
                            callback.emit(state, event.clone());
                        }
                    }
                }
            }
        }

        self.listeners
            .borrow_mut()
            .retain(|pair| pair.listener.as_callback().is_some());
    }

    fn process_pending_modifications(&self) {
        while let Some(modification) = self.modification_queue.borrow_mut().pop_front() {
            match modification {
                StoreModification::AddListener(listener_pair) => {
                    self.listeners.borrow_mut().push(listener_pair);
                }
                StoreModification::AddMiddleware(middleware) => {
                    self.middleware.borrow_mut().push(middleware);
                }
            }
        }
    }

    /// Dispatch an `Action` to be passed to the [Reducer] in order to
    /// modify the `State` in this store, and produce `Events` to be
    /// sent to the store listeners.
    pub fn dispatch<A: Into<Action>>(&self, action: A) {
        self.dispatch_impl(action.into());
    }

    /// Concrete version of [Store::dispatch()], for code size
    /// reduction purposes, to avoid generating multiple versions of
    /// this complex function per action that implements
    /// `Into<Action>`, it is expected that there will be many in a
    /// typical application.
    fn dispatch_impl(&self, action: Action) {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::dispatch() from within a Reducer::reduce() implementation"
        );
        assert!(
            !action.type_name().is_empty(),
            "cannot dispatch an action with an empty type_name()"
        );

        self.process_pending_modifications();

        let ReduceMiddlewareResult { events, effects } = if self.middleware.borrow().is_empty() {
            self.dispatch_reducer(&action)
        } else {
            self.middleware_reduce(&action)
        };

        self.middleware_process_effects(effects);

        let middleware_events = self.middleware_notify(events);
        if !middleware_events.is_empty() {
            self.notify_listeners(middleware_events);
        }
    }

    /// Subscribe a [Listener] to changes in the store state and
    /// events produced by the [Reducer] as a result of `Action`s
    /// dispatched via [dispatch()][Store::dispatch()].
    ///
    /// The listener is a weak reference; when the strong reference
    /// associated with it (usually [Callback](crate::Callback)) is
    /// dropped, the listener will be removed from this store upon
    /// [dispatch()](Store::dispatch()).
    ///
    /// If you want to subscribe to state changes associated with
    /// specific `Event`s, see
    /// [subscribe_event()][Store::subscribe_events()] or
    /// [subscribe_event()][Store::subscribe_events()]
    pub fn subscribe<L: AsListener<State, Event>>(&self, listener: L) {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::subscribe() from within a Reducer::reduce() implementation"
        );
        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddListener(ListenerEventPair {
                listener: listener.as_listener(),
                events: HashSet::new(),
            }));
    }

    /// Subscribe a [Listener] to changes in the store state and
    /// events produced by the [Reducer] as a result of `Action`s
    /// being dispatched via [dispatch()][Store::dispatch()] and
    /// reduced with the store's [Reducer]. This subscription is only
    /// active changes which produce the specific matching `event`
    /// from the [Reducer].
    ///
    /// The listener is a weak reference; when the strong reference
    /// associated with it (usually [Callback](crate::Callback)) is
    /// dropped, the listener will be removed from this store upon
    /// [dispatch()](Store::dispatch()).
    pub fn subscribe_event<L: AsListener<State, Event>>(&self, listener: L, event: Event) {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::subscribe_event() from within a Reducer::reduce() implementation"
        );
        let mut events = HashSet::with_capacity(1);
        events.insert(event);

        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddListener(ListenerEventPair {
                listener: listener.as_listener(),
                events,
            }));
    }

    /// Subscribe a [Listener] to changes in the store state and
    /// events produced by the [Reducer] as a result of `Action`s
    /// being dispatched via [dispatch()][Store::dispatch()] and
    /// reduced with the store's [Reducer]. This subscription is only
    /// active changes which produce any of the specific matching
    /// `events` from the [Reducer].
    ///
    /// The listener is a weak reference; when the strong reference
    /// associated with it (usually [Callback](crate::Callback)) is
    /// dropped, the listener will be removed from this store upon
    /// [dispatch()](Store::dispatch()).
    pub fn subscribe_events<L: AsListener<State, Event>, E: IntoIterator<Item = Event>>(
        &self,
        listener: L,
        events: E,
    ) {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::subscribe_events() from within a Reducer::reduce() implementation"
        );
        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddListener(ListenerEventPair {
                listener: listener.as_listener(),
                events: HashSet::from_iter(events.into_iter()),
            }));
    }

    /// Add [Middleware] to modify the behaviour of this [Store]
    /// during a [dispatch()][Store::dispatch()].
    pub fn add_middleware<M: Middleware<State, Action, Event, Effect> + 'static>(
        &self,
        middleware: M,
    ) {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::add_middleware() from within a Reducer::reduce() implementation"
        );
        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddMiddleware(Rc::new(middleware)));
    }

    /// Add already-`Rc`-wrapped [Middleware] to this store, used by
    /// [apply_middleware()](crate::middleware::apply_middleware) to install
    /// middleware it already holds an `Rc` to.
    pub fn add_middleware_rc(&self, middleware: Rc<dyn Middleware<State, Action, Event, Effect>>) {
        assert!(
            !self.in_reducer.get(),
            "cannot call Store::add_middleware() from within a Reducer::reduce() implementation"
        );
        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddMiddleware(middleware));
    }
}

impl<State, Action, Event, Effect> Store<State, Action, Event, Effect>
where
    Event: StoreEvent + Clone + Hash + Eq,
    Action: TypedAction + serde::de::DeserializeOwned,
{
    /// Deserialize `value` into an `Action` and dispatch it, for callers
    /// that only have a dynamically-typed action available, e.g. one
    /// read off a scripting bridge or an IPC channel.
    ///
    /// Panics if `value` isn't a plain JSON object, or if it doesn't
    /// deserialize into `Action`.
    pub fn dispatch_json(&self, value: serde_json::Value) {
        assert!(
            crate::is_plain_object(&value),
            "dispatch_json() requires a plain JSON object, got: {}",
            value
        );
        match serde_json::from_value::<Action>(value) {
            Ok(action) => self.dispatch(action),
            Err(error) => panic!("dispatch_json() failed to deserialize action: {}", error),
        }
    }
}
