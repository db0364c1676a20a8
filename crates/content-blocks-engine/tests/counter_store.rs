use std::time::Duration;

use content_blocks_engine::interactivity::{
    Action, CounterContext, Event, Mode, TimerQueue, ViewRuntime, ViewStore,
};
use content_blocks_engine::schema::clamp;
use content_blocks_engine::{EditableInstance, Registry, deserialize, serialize};
use content_blocks_syntax::parse_element;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn context(value: i64, step: i64, min: i64, max: i64) -> CounterContext {
    CounterContext {
        value,
        step,
        min,
        max,
        ..CounterContext::default()
    }
}

/// Deterministic action sequence from a small linear congruential generator.
fn actions(seed: u64, len: usize) -> Vec<Action> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            match (state >> 33) % 3 {
                0 => Action::Increase,
                1 => Action::Decrease,
                _ => Action::Reset,
            }
        })
        .collect()
}

fn apply(store: &mut ViewStore, timers: &mut TimerQueue, action: Action) {
    match action {
        Action::Increase => {
            store.increase();
        }
        Action::Decrease => {
            store.decrease();
        }
        Action::Reset => {
            store.reset(timers);
        }
        Action::ToggleAutoIncrement => {
            store.toggle_auto_increment(timers);
        }
        Action::Tick => {
            store.tick(timers);
        }
    }
}

#[rstest]
#[case(-1_000_000)]
#[case(-3)]
#[case(0)]
#[case(7)]
#[case(12)]
#[case(i64::MAX)]
fn clamping_is_idempotent(#[case] x: i64) {
    let once = clamp(x, -5, 10);
    assert_eq!(clamp(once, -5, 10), once);
    assert!((-5..=10).contains(&once));
}

#[rstest]
#[case(1, 0, 1, 0, 10)]
#[case(2, 5, 3, -7, 7)]
#[case(3, 0, 100, -100, 100)]
#[case(4, 4, 1, 4, 4)]
fn value_stays_within_bounds(
    #[case] seed: u64,
    #[case] value: i64,
    #[case] step: i64,
    #[case] min: i64,
    #[case] max: i64,
) {
    let mut timers = TimerQueue::new();
    let mut store = ViewStore::new(context(value, step, min, max)).unwrap();
    for action in actions(seed, 500) {
        apply(&mut store, &mut timers, action);
        assert!(min <= store.value() && store.value() <= max, "{action:?} -> {}", store.value());
    }
}

#[test]
fn no_notification_at_bounds() {
    let mut store = ViewStore::new(context(10, 3, -2, 10)).unwrap();
    assert_eq!(store.increase(), None);
    assert_eq!(store.value(), 10);

    let mut store = ViewStore::new(context(-2, 3, -2, 10)).unwrap();
    assert_eq!(store.decrease(), None);
    assert_eq!(store.value(), -2);
}

#[rstest]
#[case(11)]
#[case(42)]
#[case(99)]
fn reset_restores_initial_value_and_idles(#[case] seed: u64) {
    let mut timers = TimerQueue::new();
    let mut store = ViewStore::new(CounterContext {
        auto_increment: true,
        ..context(4, 2, -10, 10)
    })
    .unwrap();
    for action in actions(seed, 50) {
        apply(&mut store, &mut timers, action);
    }
    store.toggle_auto_increment(&mut timers);

    store.reset(&mut timers);

    assert_eq!(store.value(), 4);
    assert_eq!(store.mode(), Mode::Idle);
    assert!(timers.is_empty());
}

#[test]
fn auto_increment_stops_on_reaching_max() {
    let markup = r#"<div data-cb-interactive="counter" data-cb-context="{&quot;value&quot;:8,&quot;step&quot;:2,&quot;min&quot;:0,&quot;max&quot;:10,&quot;autoIncrement&quot;:true,&quot;autoIncrementInterval&quot;:250}"></div>"#;
    let mut runtime = ViewRuntime::new();
    let handle = runtime.attach(&parse_element(markup).unwrap()).unwrap();

    let events = runtime.dispatch(handle, Action::ToggleAutoIncrement).unwrap();
    assert_eq!(events, vec![Event::AutoIncrement { running: true }]);
    assert_eq!(runtime.store(handle).unwrap().mode(), Mode::AutoRunning);

    let fired = runtime.advance(Duration::from_millis(250));

    assert_eq!(
        fired,
        vec![
            (handle, Event::Changed { action: Action::Tick, old: 8, new: 10 }),
            (handle, Event::AutoIncrement { running: false }),
        ]
    );
    let store = runtime.store(handle).unwrap();
    assert_eq!(store.value(), 10);
    assert_eq!(store.mode(), Mode::Idle);
    assert_eq!(runtime.pending_timers(), 0);
    assert!(runtime.advance(Duration::from_secs(10)).is_empty());
}

#[test]
fn eleven_increases_from_a_saved_counter() {
    let registry = Registry::with_blocks().unwrap();
    let component = registry.get("interactive-counter").unwrap();
    let raw = json!({"initialValue": 0, "minValue": 0, "maxValue": 10, "step": 1});
    let instance = EditableInstance::create_with(component, raw.as_object().unwrap()).unwrap();
    let fragment = serialize(&instance);

    let mut runtime = ViewRuntime::new();
    let handle = runtime.attach(&parse_element(fragment.as_str()).unwrap()).unwrap();

    let notified: Vec<bool> = (0..11)
        .map(|_| !runtime.dispatch(handle, Action::Increase).unwrap().is_empty())
        .collect();

    assert_eq!(runtime.store(handle).unwrap().value(), 10);
    assert!(notified[..10].iter().all(|n| *n));
    assert!(!notified[10]);
}

#[test]
fn missing_value_uses_default() {
    let fragment = r#"<div class="cb-interactive-counter counter-style-default button-style-default animation-none" style="text-align: center; border-radius: 8px;" data-cb-interactive="counter" data-cb-context="{&quot;step&quot;:2,&quot;min&quot;:-5,&quot;max&quot;:5}"><h3 class="counter-label">Counter</h3></div>"#;

    let registry = Registry::with_blocks().unwrap();
    let instance = deserialize(fragment, &registry).unwrap();
    assert_eq!(instance.attributes().integer("initialValue"), 0);
    assert_eq!(instance.attributes().integer("step"), 2);

    let mut runtime = ViewRuntime::new();
    let handle = runtime.attach(&parse_element(fragment).unwrap()).unwrap();
    assert_eq!(runtime.store(handle).unwrap().value(), 0);
}
