//! Signal: synchronous broadcast to an ordered list of listeners
//!
//! A [`Signal`] owns the listeners connected to one event source. Emitting
//! calls every listener on the caller's thread, in the order they were
//! connected, handing each the same arguments.
//!
//! Failure contract for [`Signal::emit`]:
//! - a listener that returns an error or panics does not stop the others;
//! - once every listener has run, all failures come back together as one
//!   [`EmitError`] naming each failing listener and its cause.
//!
//! Connecting a listener that is already connected (same handle) is a no-op:
//! it keeps its original position and is still called once per emission.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

pub mod listener;

pub use listener::{Listener, ListenerError, ListenerHandle, ListenerResult, fallible_listener, listener};

/// Errors raised while managing a signal's listeners
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    /// The listener cannot be registered
    #[error("invalid listener for \"{signal}\" signal: {reason}")]
    InvalidListener { signal: String, reason: String },

    /// The listener is not connected to this signal
    #[error("\"{listener}\" is not connected to \"{signal}\" signal")]
    NotConnected { signal: String, listener: String },
}

/// One listener that failed during an emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Position of the listener at emission time
    pub index: usize,
    /// Listener name
    pub listener: String,
    /// Error message, or the panic payload prefixed with `panicked: `
    pub cause: String,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.listener, self.cause)
    }
}

/// Aggregate of every listener failure from one emission
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} listener(s) of \"{signal}\" signal failed: {}", failures.len(), join_failures(failures))]
pub struct EmitError {
    pub signal: String,
    pub failures: Vec<ListenerFailure>,
}

impl EmitError {
    /// Names of the listeners that failed, in invocation order
    pub fn listener_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.listener.as_str()).collect()
    }
}

fn join_failures(failures: &[ListenerFailure]) -> String {
    failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; ")
}

/// An event source with an ordered set of listeners
pub struct Signal<A> {
    name: String,
    listeners: Vec<ListenerHandle<A>>,
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self::new("Signal")
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("listeners", &self.listener_names())
            .finish()
    }
}

impl<A> Signal<A> {
    /// Create an empty signal
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener names in invocation order
    pub fn listener_names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn is_connected(&self, listener: &ListenerHandle<A>) -> bool {
        self.position(listener).is_some()
    }

    /// Register `listener` at the end of the invocation order
    ///
    /// A listener that is already connected stays where it is.
    pub fn connect(&mut self, listener: ListenerHandle<A>) -> Result<(), SignalError> {
        if listener.name().trim().is_empty() {
            return Err(SignalError::InvalidListener {
                signal: self.name.clone(),
                reason: "listener name is blank".to_string(),
            });
        }

        if self.is_connected(&listener) {
            log::debug!(
                "Listener \"{}\" already connected to \"{}\" signal",
                listener.name(),
                self.name
            );
            return Ok(());
        }

        log::debug!("Listener \"{}\" connected to \"{}\" signal", listener.name(), self.name);
        self.listeners.push(listener);
        Ok(())
    }

    /// Remove `listener`, failing if it was never connected
    pub fn disconnect(&mut self, listener: &ListenerHandle<A>) -> Result<(), SignalError> {
        if self.disconnect_quiet(listener) {
            Ok(())
        } else {
            Err(SignalError::NotConnected {
                signal: self.name.clone(),
                listener: listener.name().to_string(),
            })
        }
    }

    /// Remove `listener` if present; returns whether anything was removed
    pub fn disconnect_quiet(&mut self, listener: &ListenerHandle<A>) -> bool {
        match self.position(listener) {
            Some(idx) => {
                self.listeners.remove(idx);
                log::debug!("Removed \"{}\" from \"{}\" signal", listener.name(), self.name);
                true
            }
            None => {
                log::debug!("\"{}\" is not connected to \"{}\" signal", listener.name(), self.name);
                false
            }
        }
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Call every listener with `args`, in connection order
    pub fn emit(&self, args: A) -> Result<(), EmitError> {
        let mut failures = Vec::new();

        for (index, listener) in self.listeners.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.call(&args)));

            let cause = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            log::warn!(
                "Listener \"{}\" of \"{}\" signal failed: {}",
                listener.name(),
                self.name,
                cause
            );
            failures.push(ListenerFailure {
                index,
                listener: listener.name().to_string(),
                cause,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EmitError {
                signal: self.name.clone(),
                failures,
            })
        }
    }

    fn position(&self, listener: &ListenerHandle<A>) -> Option<usize> {
        let target = Arc::as_ptr(listener) as *const ();
        self.listeners
            .iter()
            .position(|l| Arc::as_ptr(l) as *const () == target)
    }
}

impl<A: Send + 'static> Signal<A> {
    /// Run one [`emit`](Self::emit) on a dedicated named thread
    ///
    /// The emission itself is unchanged; the caller gets the thread's handle
    /// and can join it for the aggregated result.
    pub fn emit_detached(self: &Arc<Self>, args: A) -> std::io::Result<JoinHandle<Result<(), EmitError>>> {
        let signal = Arc::clone(self);
        thread::Builder::new()
            .name(format!("Signal Thread {}", self.name))
            .spawn(move || signal.emit(args))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<(String, (i32, i32))>>>;

    fn recorder(name: &str, calls: &Calls) -> ListenerHandle<(i32, i32)> {
        let calls = Arc::clone(calls);
        let owned = name.to_string();
        listener(name, move |args: &(i32, i32)| {
            calls.lock().unwrap().push((owned.clone(), *args));
        })
    }

    #[test]
    fn test_emit_calls_listeners_in_order() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("ready");
        for name in ["A", "B", "C"] {
            signal.connect(recorder(name, &calls)).unwrap();
        }

        signal.emit((1, 2)).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("A".to_string(), (1, 2)),
                ("B".to_string(), (1, 2)),
                ("C".to_string(), (1, 2)),
            ]
        );
    }

    #[test]
    fn test_duplicate_connect_registers_once() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("dup");
        let a = recorder("A", &calls);
        let b = recorder("B", &calls);

        signal.connect(Arc::clone(&a)).unwrap();
        signal.connect(Arc::clone(&b)).unwrap();
        signal.connect(Arc::clone(&a)).unwrap();

        assert_eq!(signal.len(), 2);
        assert_eq!(signal.listener_names(), vec!["A", "B"]);

        signal.emit((0, 0)).unwrap();
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_same_name_different_handles_are_distinct() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("names");
        signal.connect(recorder("A", &calls)).unwrap();
        signal.connect(recorder("A", &calls)).unwrap();
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let mut signal: Signal<()> = Signal::new("blank");
        let err = signal.connect(listener("  ", |_: &()| {})).unwrap_err();
        assert!(matches!(err, SignalError::InvalidListener { .. }));
        assert!(signal.is_empty());
    }

    #[test]
    fn test_disconnect_stops_invocation() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("gone");
        let a = recorder("A", &calls);
        let b = recorder("B", &calls);
        signal.connect(Arc::clone(&a)).unwrap();
        signal.connect(Arc::clone(&b)).unwrap();

        signal.disconnect(&a).unwrap();
        signal.emit((3, 4)).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec![("B".to_string(), (3, 4))]);
    }

    #[test]
    fn test_disconnect_unknown_listener() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("sig");
        let a = recorder("A", &calls);

        let err = signal.disconnect(&a).unwrap_err();
        assert_eq!(
            err,
            SignalError::NotConnected {
                signal: "sig".to_string(),
                listener: "A".to_string(),
            }
        );
        assert!(!signal.disconnect_quiet(&a));
    }

    #[test]
    fn test_failures_are_aggregated_and_others_still_run() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("mixed");
        signal.connect(recorder("first", &calls)).unwrap();
        signal
            .connect(fallible_listener("erring", |_: &(i32, i32)| Err("bad input".into())))
            .unwrap();
        signal.connect(recorder("middle", &calls)).unwrap();
        signal
            .connect(listener("panicking", |_: &(i32, i32)| panic!("listener exploded")))
            .unwrap();
        signal.connect(recorder("last", &calls)).unwrap();

        let err = signal.emit((5, 6)).unwrap_err();

        assert_eq!(err.signal, "mixed");
        assert_eq!(err.listener_names(), vec!["erring", "panicking"]);
        assert_eq!(err.failures[0].index, 1);
        assert_eq!(err.failures[0].cause, "bad input");
        assert_eq!(err.failures[1].cause, "panicked: listener exploded");
        assert!(err.to_string().contains("2 listener(s)"));

        let names: Vec<String> = calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["first", "middle", "last"]);
    }

    #[test]
    fn test_emit_on_empty_signal() {
        let signal: Signal<String> = Signal::default();
        assert_eq!(signal.name(), "Signal");
        assert!(signal.emit("nothing".to_string()).is_ok());
    }

    #[test]
    fn test_emit_detached_joins_with_result() {
        let calls: Calls = Arc::default();
        let mut signal = Signal::new("bg");
        signal.connect(recorder("A", &calls)).unwrap();
        let signal = Arc::new(signal);

        let handle = signal.emit_detached((7, 8)).unwrap();
        assert!(handle.join().unwrap().is_ok());
        assert_eq!(*calls.lock().unwrap(), vec![("A".to_string(), (7, 8))]);
    }

    proptest! {
        #[test]
        fn prop_invocation_follows_connection_order(order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle()) {
            let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
            let mut signal = Signal::new("prop");
            for id in &order {
                let seen = Arc::clone(&seen);
                let id = *id;
                signal.connect(listener(format!("l{id}"), move |_: &()| seen.lock().unwrap().push(id))).unwrap();
            }

            signal.emit(()).unwrap();
            prop_assert_eq!(&*seen.lock().unwrap(), &order);
        }
    }
}
