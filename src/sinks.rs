//! Output sinks for action flags and joystick axes.
//!
//! The actual input injection lives outside this crate; anything implementing
//! [`ActionSink`] / [`JoystickSink`] can be plugged into the tick loop.

use std::collections::HashSet;

use crate::axis::AxisValues;
use crate::error::{WalkerError, WalkerResult};
use crate::gesture::{Action, ActionFlags};

/// Receives level-triggered start/stop calls. Must tolerate repeats.
pub trait ActionSink {
    fn start(&mut self, action: Action) -> WalkerResult<()>;
    fn stop(&mut self, action: Action) -> WalkerResult<()>;
}

pub trait JoystickSink {
    fn set_axes(&mut self, axes: AxisValues) -> WalkerResult<()>;
}

/// Outcome of dispatching one tick.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub started: Vec<Action>,
    pub failures: Vec<WalkerError>,
}

impl DispatchReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies action flags to a sink, one action at a time.
pub struct ActionDispatcher<S: ActionSink> {
    sink: S,
    enabled: bool,
}

impl<S: ActionSink> ActionDispatcher<S> {
    pub fn new(sink: S, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn dispatch(&mut self, flags: &ActionFlags) -> DispatchReport {
        let mut report = DispatchReport::default();
        if !self.enabled {
            return report;
        }

        for action in Action::ALL {
            let result = if flags.get(action) {
                report.started.push(action);
                self.sink.start(action)
            } else {
                self.sink.stop(action)
            };
            if let Err(e) = result {
                report.failures.push(e);
            }
        }
        report
    }

    /// Stop every action so nothing stays held on shutdown.
    pub fn release_all(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        for action in Action::ALL {
            if let Err(e) = self.sink.stop(action) {
                report.failures.push(e);
            }
        }
        report
    }
}

/// Held actions are released on every exit path, including early returns.
impl<S: ActionSink> Drop for ActionDispatcher<S> {
    fn drop(&mut self) {
        for failure in self.release_all().failures {
            log::warn!("Release on shutdown failed: {}", failure);
        }
    }
}

/// Sink that logs press/release transitions.
#[derive(Debug, Default)]
pub struct LogActionSink {
    held: HashSet<Action>,
    transitions: u64,
}

impl LogActionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

impl ActionSink for LogActionSink {
    fn start(&mut self, action: Action) -> WalkerResult<()> {
        if self.held.insert(action) {
            self.transitions += 1;
            log::info!("[ACTION] ▶ {}", action);
        }
        Ok(())
    }

    fn stop(&mut self, action: Action) -> WalkerResult<()> {
        if self.held.remove(&action) {
            self.transitions += 1;
            log::info!("[ACTION] ■ {}", action);
        }
        Ok(())
    }
}

/// Joystick sink that logs axis changes.
#[derive(Debug, Default)]
pub struct LogJoystickSink {
    last: Option<AxisValues>,
}

impl LogJoystickSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<AxisValues> {
        self.last
    }
}

impl JoystickSink for LogJoystickSink {
    fn set_axes(&mut self, axes: AxisValues) -> WalkerResult<()> {
        if self.last != Some(axes) {
            log::debug!("[JOY] x {:>6} y {:>6}", axes.x, axes.y);
            self.last = Some(axes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sink that fails on one action and records everything else.
    #[derive(Default)]
    struct FlakySink {
        failing: Option<Action>,
        calls: Vec<(Action, bool)>,
    }

    impl ActionSink for FlakySink {
        fn start(&mut self, action: Action) -> WalkerResult<()> {
            if self.failing == Some(action) {
                return Err(WalkerError::sink(action.name(), "injected failure"));
            }
            self.calls.push((action, true));
            Ok(())
        }

        fn stop(&mut self, action: Action) -> WalkerResult<()> {
            if self.failing == Some(action) {
                return Err(WalkerError::sink(action.name(), "injected failure"));
            }
            self.calls.push((action, false));
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_level_triggered() {
        let mut dispatcher = ActionDispatcher::new(FlakySink::default(), true);
        let flags = ActionFlags {
            forward: true,
            sprint_modifier: true,
            ..ActionFlags::default()
        };

        let report = dispatcher.dispatch(&flags);
        assert!(report.is_ok());
        assert_eq!(
            report.started,
            vec![Action::Forward, Action::SprintModifier]
        );
        assert_eq!(dispatcher.sink().calls.len(), 9);
        assert!(dispatcher.sink().calls.contains(&(Action::Forward, true)));
        assert!(dispatcher.sink().calls.contains(&(Action::Jump, false)));
    }

    #[test]
    fn test_failure_does_not_abort_dispatch() {
        let sink = FlakySink {
            failing: Some(Action::Left),
            ..FlakySink::default()
        };
        let mut dispatcher = ActionDispatcher::new(sink, true);

        let report = dispatcher.dispatch(&ActionFlags {
            jump: true,
            ..ActionFlags::default()
        });
        assert_eq!(report.failures.len(), 1);
        assert_eq!(dispatcher.sink().calls.len(), 8);
        assert!(dispatcher.sink().calls.contains(&(Action::Jump, true)));
    }

    #[test]
    fn test_disabled_dispatch_is_silent() {
        let mut dispatcher = ActionDispatcher::new(FlakySink::default(), false);
        let report = dispatcher.dispatch(&ActionFlags {
            forward: true,
            ..ActionFlags::default()
        });
        assert!(report.started.is_empty());
        assert!(dispatcher.sink().calls.is_empty());
    }

    /// Sink whose held set outlives the dispatcher that owns it.
    #[derive(Clone, Default)]
    struct SharedSink {
        held: Rc<RefCell<HashSet<Action>>>,
    }

    impl ActionSink for SharedSink {
        fn start(&mut self, action: Action) -> WalkerResult<()> {
            self.held.borrow_mut().insert(action);
            Ok(())
        }

        fn stop(&mut self, action: Action) -> WalkerResult<()> {
            self.held.borrow_mut().remove(&action);
            Ok(())
        }
    }

    fn hold_and_bail(sink: SharedSink) -> WalkerResult<()> {
        let mut dispatcher = ActionDispatcher::new(sink, true);
        dispatcher.dispatch(&ActionFlags {
            forward: true,
            sprint_modifier: true,
            ..ActionFlags::default()
        });
        Err(WalkerError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "output dir not writable",
        )))
    }

    #[test]
    fn test_early_return_releases_held_actions() {
        let sink = SharedSink::default();
        let held = sink.held.clone();

        assert!(hold_and_bail(sink).is_err());
        assert!(held.borrow().is_empty());
    }

    #[test]
    fn test_release_all() {
        let mut dispatcher = ActionDispatcher::new(LogActionSink::new(), true);
        dispatcher.dispatch(&ActionFlags {
            backward: true,
            ..ActionFlags::default()
        });
        assert!(dispatcher.sink().is_held(Action::Backward));

        let report = dispatcher.release_all();
        assert!(report.is_ok());
        assert!(!dispatcher.sink().is_held(Action::Backward));
    }

    #[test]
    fn test_log_sink_idempotent() {
        let mut sink = LogActionSink::new();
        sink.start(Action::Jump).unwrap();
        sink.start(Action::Jump).unwrap();
        sink.stop(Action::Left).unwrap();
        assert_eq!(sink.transitions(), 1);
        sink.stop(Action::Jump).unwrap();
        sink.stop(Action::Jump).unwrap();
        assert_eq!(sink.transitions(), 2);
        assert!(!sink.is_held(Action::Jump));
    }

    #[test]
    fn test_joystick_sink_tracks_last() {
        let mut joy = LogJoystickSink::new();
        assert!(joy.last().is_none());
        joy.set_axes(AxisValues { x: 100, y: -100 }).unwrap();
        assert_eq!(joy.last(), Some(AxisValues { x: 100, y: -100 }));
    }
}
