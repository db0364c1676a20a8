use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use content_blocks_syntax::{Element, Node};

use super::store::{Action, CounterContext, ValueChange, ViewStore};
use super::timer::TimerQueue;
use crate::blocks::interactive_counter::NAMESPACE;
use crate::fragment::{CONTEXT_ATTR, INTERACTIVE_ATTR};

/// Keyboard input understood by attached stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Home,
    Enter,
    Space,
    Char(char),
}

impl Key {
    /// The action bound to this key, if any.
    pub fn action(self) -> Option<Action> {
        match self {
            Key::ArrowUp | Key::Char('+') => Some(Action::Increase),
            Key::ArrowDown | Key::Char('-') => Some(Action::Decrease),
            Key::Home => Some(Action::Reset),
            Key::Enter | Key::Space | Key::Char(' ') => Some(Action::ToggleAutoIncrement),
            Key::Char(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Mounted,
    Unmounted,
    Changed { action: Action, old: i64, new: i64 },
    AutoIncrement { running: bool },
}

impl Event {
    fn changed(action: Action, change: ValueChange) -> Self {
        Event::Changed {
            action,
            old: change.old,
            new: change.new,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreHandle(u64);

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    #[error("element has no `{INTERACTIVE_ATTR}` attribute")]
    NotInteractive,
    #[error("no store for namespace `{0}`")]
    UnknownNamespace(String),
    #[error("element has no `{CONTEXT_ATTR}` attribute")]
    MissingContext,
    #[error("invalid context: {0}")]
    InvalidContext(String),
    #[error("min {min} is greater than max {max}")]
    InvertedBounds { min: i64, max: i64 },
    #[error("step must be at least 1, got {0}")]
    InvalidStep(i64),
    #[error("{0} is not attached")]
    Detached(StoreHandle),
}

type Listener = Box<dyn FnMut(StoreHandle, &Event)>;

struct Slot {
    store: ViewStore,
    listeners: Vec<(ListenerId, Listener)>,
}

/// Single-threaded page runtime: attached stores, their listeners and a
/// shared virtual-clock timer queue. Stores share no state with each other.
#[derive(Default)]
pub struct ViewRuntime {
    timers: TimerQueue,
    stores: BTreeMap<StoreHandle, Slot>,
    observers: Vec<Listener>,
    next_handle: u64,
    next_listener: u64,
}

impl ViewRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a store to a parsed interactive element.
    pub fn attach(&mut self, element: &Element) -> Result<StoreHandle, AttachError> {
        let namespace = element
            .attr(INTERACTIVE_ATTR)
            .ok_or(AttachError::NotInteractive)?;
        if namespace != NAMESPACE {
            return Err(AttachError::UnknownNamespace(namespace.to_string()));
        }
        let context = element.attr(CONTEXT_ATTR).ok_or(AttachError::MissingContext)?;
        let context: CounterContext = serde_json::from_str(context)
            .map_err(|e| AttachError::InvalidContext(e.to_string()))?;
        let store = ViewStore::new(context)?;

        let handle = StoreHandle(self.next_handle);
        self.next_handle += 1;
        self.stores.insert(
            handle,
            Slot {
                store,
                listeners: Vec::new(),
            },
        );
        log::info!("attached {handle} ({namespace})");
        self.emit(handle, &[Event::Mounted]);
        Ok(handle)
    }

    /// Attach every interactive element in a parsed tree, in document order.
    pub fn attach_all(&mut self, nodes: &[Node]) -> Vec<Result<StoreHandle, AttachError>> {
        let mut results = Vec::new();
        for node in nodes {
            if let Node::Element(element) = node {
                if element.has_attr(INTERACTIVE_ATTR) {
                    results.push(self.attach(element));
                }
                results.extend(self.attach_all(&element.children));
            }
        }
        results
    }

    /// Cancel the store's timer, notify `Unmounted` and drop its listeners.
    pub fn detach(&mut self, handle: StoreHandle) -> Result<(), AttachError> {
        let mut slot = self
            .stores
            .remove(&handle)
            .ok_or(AttachError::Detached(handle))?;
        slot.store.stop(&mut self.timers);
        for (_, listener) in &mut slot.listeners {
            listener(handle, &Event::Unmounted);
        }
        for observer in &mut self.observers {
            observer(handle, &Event::Unmounted);
        }
        log::info!("detached {handle}");
        Ok(())
    }

    /// Run an action. Returns the events it produced, which are also sent to
    /// listeners. An empty list means nothing changed.
    pub fn dispatch(&mut self, handle: StoreHandle, action: Action) -> Result<Vec<Event>, AttachError> {
        let slot = self
            .stores
            .get_mut(&handle)
            .ok_or(AttachError::Detached(handle))?;
        let store = &mut slot.store;
        let timers = &mut self.timers;
        let was_running = store.timer().is_some();

        let mut events = Vec::new();
        match action {
            Action::Increase => events.extend(store.increase().map(|c| Event::changed(action, c))),
            Action::Decrease => events.extend(store.decrease().map(|c| Event::changed(action, c))),
            Action::Reset => events.push(Event::changed(action, store.reset(timers))),
            Action::ToggleAutoIncrement => events.extend(
                store
                    .toggle_auto_increment(timers)
                    .map(|running| Event::AutoIncrement { running }),
            ),
            Action::Tick => events.extend(store.tick(timers).map(|c| Event::changed(action, c))),
        }
        if was_running && store.timer().is_none() && action != Action::ToggleAutoIncrement {
            events.push(Event::AutoIncrement { running: false });
        }

        self.emit(handle, &events);
        Ok(events)
    }

    /// Translate a key press. Unbound keys produce no events.
    pub fn key(&mut self, handle: StoreHandle, key: Key) -> Result<Vec<Event>, AttachError> {
        match key.action() {
            Some(action) => self.dispatch(handle, action),
            None if self.stores.contains_key(&handle) => Ok(Vec::new()),
            None => Err(AttachError::Detached(handle)),
        }
    }

    /// Move the virtual clock forward, firing due timers in due-time order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<(StoreHandle, Event)> {
        let until = self.timers.now() + elapsed;
        let mut fired = Vec::new();
        while let Some(id) = self.timers.pop_due(until) {
            let owner = self
                .stores
                .iter()
                .find(|(_, slot)| slot.store.timer() == Some(id))
                .map(|(handle, _)| *handle);
            let Some(handle) = owner else {
                self.timers.cancel(id);
                continue;
            };
            if let Ok(events) = self.dispatch(handle, Action::Tick) {
                fired.extend(events.into_iter().map(|e| (handle, e)));
            }
        }
        self.timers.advance_to(until);
        fired
    }

    /// Listen to one store's events until it is detached.
    pub fn subscribe(
        &mut self,
        handle: StoreHandle,
        listener: impl FnMut(StoreHandle, &Event) + 'static,
    ) -> Result<ListenerId, AttachError> {
        let slot = self
            .stores
            .get_mut(&handle)
            .ok_or(AttachError::Detached(handle))?;
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        slot.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    pub fn unsubscribe(&mut self, handle: StoreHandle, id: ListenerId) -> bool {
        let Some(slot) = self.stores.get_mut(&handle) else {
            return false;
        };
        let before = slot.listeners.len();
        slot.listeners.retain(|(l, _)| *l != id);
        slot.listeners.len() != before
    }

    /// Listen to every store, including ones attached later.
    pub fn observe(&mut self, observer: impl FnMut(StoreHandle, &Event) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn store(&self, handle: StoreHandle) -> Option<&ViewStore> {
        self.stores.get(&handle).map(|slot| &slot.store)
    }

    pub fn handles(&self) -> impl Iterator<Item = StoreHandle> + '_ {
        self.stores.keys().copied()
    }

    pub fn listener_count(&self, handle: StoreHandle) -> usize {
        self.stores.get(&handle).map_or(0, |slot| slot.listeners.len())
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// When the next timer fires, if any is scheduled.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    fn emit(&mut self, handle: StoreHandle, events: &[Event]) {
        if let Some(slot) = self.stores.get_mut(&handle) {
            for event in events {
                for (_, listener) in &mut slot.listeners {
                    listener(handle, event);
                }
            }
        }
        for event in events {
            for observer in &mut self.observers {
                observer(handle, event);
            }
        }
    }
}

impl fmt::Debug for ViewRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRuntime")
            .field("stores", &self.stores.len())
            .field("timers", &self.timers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_blocks_syntax::{parse, parse_element};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counter_markup(context: &str) -> String {
        format!(
            r#"<div class="cb-interactive-counter" data-cb-interactive="counter" data-cb-context="{}"><div class="counter-value">0</div></div>"#,
            context.replace('"', "&quot;")
        )
    }

    fn attach(runtime: &mut ViewRuntime, context: &str) -> StoreHandle {
        let markup = counter_markup(context);
        runtime.attach(&parse_element(&markup).unwrap()).unwrap()
    }

    fn recorder(runtime: &mut ViewRuntime, handle: StoreHandle) -> Rc<RefCell<Vec<Event>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        runtime
            .subscribe(handle, move |_, event| sink.borrow_mut().push(*event))
            .unwrap();
        seen
    }

    #[test]
    fn attach_reads_context_and_clamps() {
        let mut runtime = ViewRuntime::new();
        let handle = attach(&mut runtime, r#"{"value":50,"step":2,"min":0,"max":10}"#);

        let store = runtime.store(handle).unwrap();
        assert_eq!(store.value(), 10);
        assert_eq!(store.step(), 2);
        assert_eq!(store.interval(), Duration::from_millis(1000));
    }

    #[rstest]
    #[case(r#"<div data-cb-context="{}"></div>"#, AttachError::NotInteractive)]
    #[case(r#"<div data-cb-interactive="slider" data-cb-context="{}"></div>"#, AttachError::UnknownNamespace("slider".into()))]
    #[case(r#"<div data-cb-interactive="counter"></div>"#, AttachError::MissingContext)]
    #[case(r#"<div data-cb-interactive="counter" data-cb-context="{&quot;min&quot;:3,&quot;max&quot;:1}"></div>"#, AttachError::InvertedBounds { min: 3, max: 1 })]
    #[case(r#"<div data-cb-interactive="counter" data-cb-context="{&quot;step&quot;:0}"></div>"#, AttachError::InvalidStep(0))]
    fn attach_rejects(#[case] markup: &str, #[case] expected: AttachError) {
        let mut runtime = ViewRuntime::new();
        let element = parse_element(markup).unwrap();
        assert_eq!(runtime.attach(&element), Err(expected));
        assert_eq!(runtime.handles().count(), 0);
    }

    #[test]
    fn malformed_context_json_is_reported() {
        let mut runtime = ViewRuntime::new();
        let element = parse_element(r#"<div data-cb-interactive="counter" data-cb-context="{oops"></div>"#).unwrap();
        assert!(matches!(runtime.attach(&element), Err(AttachError::InvalidContext(_))));
    }

    #[rstest]
    #[case(Key::ArrowUp, Some(Action::Increase))]
    #[case(Key::Char('+'), Some(Action::Increase))]
    #[case(Key::ArrowDown, Some(Action::Decrease))]
    #[case(Key::Char('-'), Some(Action::Decrease))]
    #[case(Key::Home, Some(Action::Reset))]
    #[case(Key::Enter, Some(Action::ToggleAutoIncrement))]
    #[case(Key::Space, Some(Action::ToggleAutoIncrement))]
    #[case(Key::Char('x'), None)]
    fn key_bindings(#[case] key: Key, #[case] action: Option<Action>) {
        assert_eq!(key.action(), action);
    }

    #[test]
    fn listeners_see_changes_in_order() {
        let mut runtime = ViewRuntime::new();
        let handle = attach(&mut runtime, r#"{"value":0,"step":1,"min":0,"max":2}"#);
        let seen = recorder(&mut runtime, handle);

        runtime.key(handle, Key::ArrowUp).unwrap();
        runtime.key(handle, Key::ArrowUp).unwrap();
        runtime.key(handle, Key::ArrowUp).unwrap();
        runtime.key(handle, Key::Char('q')).unwrap();
        runtime.key(handle, Key::Home).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                Event::Changed { action: Action::Increase, old: 0, new: 1 },
                Event::Changed { action: Action::Increase, old: 1, new: 2 },
                Event::Changed { action: Action::Reset, old: 2, new: 0 },
            ]
        );
    }

    #[test]
    fn auto_increment_runs_to_max_then_stops() {
        let mut runtime = ViewRuntime::new();
        let handle = attach(
            &mut runtime,
            r#"{"value":0,"step":1,"min":0,"max":3,"autoIncrement":true,"autoIncrementInterval":100}"#,
        );

        assert_eq!(
            runtime.key(handle, Key::Enter).unwrap(),
            vec![Event::AutoIncrement { running: true }]
        );
        let fired = runtime.advance(Duration::from_millis(1_000));

        assert_eq!(
            fired,
            vec![
                (handle, Event::Changed { action: Action::Tick, old: 0, new: 1 }),
                (handle, Event::Changed { action: Action::Tick, old: 1, new: 2 }),
                (handle, Event::Changed { action: Action::Tick, old: 2, new: 3 }),
                (handle, Event::AutoIncrement { running: false }),
            ]
        );
        assert_eq!(runtime.pending_timers(), 0);
        assert_eq!(runtime.now(), Duration::from_millis(1_000));
    }

    #[test]
    fn reset_stops_running_timer() {
        let mut runtime = ViewRuntime::new();
        let handle = attach(
            &mut runtime,
            r#"{"value":0,"min":0,"max":100,"autoIncrement":true,"autoIncrementInterval":100}"#,
        );
        runtime.dispatch(handle, Action::ToggleAutoIncrement).unwrap();
        runtime.advance(Duration::from_millis(250));

        let events = runtime.dispatch(handle, Action::Reset).unwrap();

        assert_eq!(
            events,
            vec![
                Event::Changed { action: Action::Reset, old: 2, new: 0 },
                Event::AutoIncrement { running: false },
            ]
        );
        assert_eq!(runtime.pending_timers(), 0);
        assert!(runtime.advance(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn detach_cancels_timer_and_drops_listeners() {
        let mut runtime = ViewRuntime::new();
        let handle = attach(
            &mut runtime,
            r#"{"value":0,"min":0,"max":100,"autoIncrement":true,"autoIncrementInterval":100}"#,
        );
        let seen = recorder(&mut runtime, handle);
        runtime.dispatch(handle, Action::ToggleAutoIncrement).unwrap();

        runtime.detach(handle).unwrap();

        assert_eq!(runtime.pending_timers(), 0);
        assert_eq!(runtime.listener_count(handle), 0);
        assert_eq!(seen.borrow().last(), Some(&Event::Unmounted));
        assert!(runtime.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(runtime.dispatch(handle, Action::Increase), Err(AttachError::Detached(handle)));
        assert_eq!(runtime.detach(handle), Err(AttachError::Detached(handle)));
    }

    #[test]
    fn stores_are_independent() {
        let mut runtime = ViewRuntime::new();
        let a = attach(&mut runtime, r#"{"value":0,"min":0,"max":10}"#);
        let b = attach(&mut runtime, r#"{"value":5,"min":0,"max":10}"#);

        runtime.dispatch(a, Action::Increase).unwrap();
        runtime.dispatch(b, Action::Decrease).unwrap();

        assert_eq!(runtime.store(a).unwrap().value(), 1);
        assert_eq!(runtime.store(b).unwrap().value(), 4);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut runtime = ViewRuntime::new();
        let handle = attach(&mut runtime, r#"{"value":0,"min":0,"max":10}"#);
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        let id = runtime
            .subscribe(handle, move |_, _| *sink.borrow_mut() += 1)
            .unwrap();

        runtime.dispatch(handle, Action::Increase).unwrap();
        assert!(runtime.unsubscribe(handle, id));
        runtime.dispatch(handle, Action::Increase).unwrap();

        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn observers_see_mounts_for_nested_counters() {
        let mut runtime = ViewRuntime::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        runtime.observe(move |handle, event| sink.borrow_mut().push((handle, *event)));

        let doc = format!(
            r#"<div class="cb-advanced-card"><div class="card-content">{}</div></div>{}"#,
            counter_markup("{}"),
            counter_markup(r#"{"value":3}"#)
        );
        let nodes = parse(&doc).unwrap();
        let handles: Vec<_> = runtime.attach_all(&nodes).into_iter().map(Result::unwrap).collect();

        assert_eq!(handles.len(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![(handles[0], Event::Mounted), (handles[1], Event::Mounted)]
        );
        assert_eq!(runtime.store(handles[1]).unwrap().value(), 3);
    }
}
