/*!
 * # Interactivity
 *
 * Client-side behaviour of interactive fragments, without a DOM.
 *
 * - [`ViewStore`]: the per-instance counter state machine (`Idle` /
 *   `AutoRunning`). Pure apart from the timer queue it is handed.
 * - [`TimerQueue`]: repeating timers on a virtual clock, driven explicitly.
 * - [`ViewRuntime`]: attaches stores to parsed fragment elements, routes
 *   actions and key presses, fires timers and notifies listeners.
 *
 * ```rust
 * use std::time::Duration;
 * use content_blocks_engine::interactivity::{Key, ViewRuntime};
 * use content_blocks_syntax::parse_element;
 *
 * let markup = r#"<div data-cb-interactive="counter" data-cb-context="{&quot;value&quot;:9,&quot;max&quot;:10,&quot;autoIncrement&quot;:true,&quot;autoIncrementInterval&quot;:100}"></div>"#;
 *
 * let mut runtime = ViewRuntime::new();
 * let handle = runtime.attach(&parse_element(markup).unwrap()).unwrap();
 *
 * runtime.key(handle, Key::Enter).unwrap();
 * runtime.advance(Duration::from_millis(100));
 *
 * assert_eq!(runtime.store(handle).unwrap().value(), 10);
 * assert_eq!(runtime.pending_timers(), 0);
 * ```
 */

mod runtime;
mod store;
mod timer;

pub use runtime::{AttachError, Event, Key, ListenerId, StoreHandle, ViewRuntime};
pub use store::{Action, CounterContext, Mode, ValueChange, ViewStore};
pub use timer::{TimerId, TimerQueue};
