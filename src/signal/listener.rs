//! Listener trait and closure adapters

use std::sync::Arc;

/// Error a listener may hand back from a call
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single listener invocation
pub type ListenerResult = Result<(), ListenerError>;

/// Shared handle to a registered listener
///
/// Handle identity (the allocation behind the `Arc`) is what a [`Signal`](super::Signal)
/// uses to recognise the same listener across `connect` and `disconnect` calls.
pub type ListenerHandle<A> = Arc<dyn Listener<A>>;

/// Something that can receive a signal's emitted arguments
pub trait Listener<A>: Send + Sync {
    /// Name used in log lines and in aggregated emit errors
    fn name(&self) -> &str;

    /// Handle one emission
    fn call(&self, args: &A) -> ListenerResult;
}

struct FnListener<F> {
    name: String,
    func: F,
}

impl<A, F> Listener<A> for FnListener<F>
where
    F: Fn(&A) -> ListenerResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &A) -> ListenerResult {
        (self.func)(args)
    }
}

/// Wrap an infallible closure as a listener
pub fn listener<A, F>(name: impl Into<String>, func: F) -> ListenerHandle<A>
where
    A: 'static,
    F: Fn(&A) + Send + Sync + 'static,
{
    Arc::new(FnListener {
        name: name.into(),
        func: move |args: &A| -> ListenerResult {
            func(args);
            Ok(())
        },
    })
}

/// Wrap a closure that may fail as a listener
pub fn fallible_listener<A, F>(name: impl Into<String>, func: F) -> ListenerHandle<A>
where
    A: 'static,
    F: Fn(&A) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(FnListener { name: name.into(), func })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_name_and_call() {
        let l = listener("printer", |args: &(i32, i32)| {
            assert_eq!(*args, (1, 2));
        });
        assert_eq!(l.name(), "printer");
        assert!(l.call(&(1, 2)).is_ok());
    }

    #[test]
    fn test_fallible_listener_error() {
        let l = fallible_listener("broken", |_: &u8| Err("boom".into()));
        let err = l.call(&0).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
