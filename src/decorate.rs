//! Wrappers that add behaviour around a closure
//!
//! Retrying, conditional execution, timing, platform guards and running
//! work on a named thread or tokio task.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("This function is only supported on: {supported}. Your platform ({current}) is not supported.")]
pub struct UnsupportedPlatform {
    pub supported: String,
    pub current: &'static str,
}

/// Fail unless the running OS (as in `std::env::consts::OS`) is listed
pub fn ensure_platform(supported: &[&str]) -> Result<(), UnsupportedPlatform> {
    let current = std::env::consts::OS;
    if supported.contains(&current) {
        return Ok(());
    }
    Err(UnsupportedPlatform {
        supported: if supported.is_empty() {
            "None".to_string()
        } else {
            supported.join(", ")
        },
        current,
    })
}

/// How often and how patiently to retry
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    pub wait: Duration,
    /// Double the wait after every failed attempt
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            wait: Duration::from_secs(1),
            exponential: false,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn exponential(mut self, exponential: bool) -> Self {
        self.exponential = exponential;
        self
    }

    /// Pause before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        if self.exponential {
            self.wait.saturating_mul(2u32.saturating_pow(attempt))
        } else {
            self.wait
        }
    }
}

enum Step<T, E> {
    Done(Result<T, E>),
    Wait(Duration),
}

/// Outcome of one attempt; shared by the sync and async loops
fn judge<T, E, P>(name: &str, policy: &RetryPolicy, attempt: u32, result: Result<T, E>, ignore: &P) -> Step<T, E>
where
    E: Display,
    P: Fn(&E) -> bool,
{
    match result {
        Ok(value) => Step::Done(Ok(value)),
        Err(e) if ignore(&e) => Step::Done(Err(e)),
        Err(e) if attempt >= policy.retries => {
            log::debug!("[Retry - limit reached] {}. Error: {}", name, e);
            Step::Done(Err(e))
        }
        Err(e) => {
            log::error!("[Retry - {}] {}. Error: {}", attempt, name, e);
            Step::Wait(policy.delay(attempt))
        }
    }
}

/// Run `op` until it succeeds or the policy gives up; returns the last error
pub fn retry<T, E, F>(name: &str, policy: &RetryPolicy, op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    retry_unless(name, policy, |_| false, op)
}

/// Like [`retry`], but errors matching `ignore` are returned at once
pub fn retry_unless<T, E, F, P>(name: &str, policy: &RetryPolicy, ignore: P, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match judge(name, policy, attempt, op(), &ignore) {
            Step::Done(result) => return result,
            Step::Wait(pause) => thread::sleep(pause),
        }
        attempt += 1;
    }
}

/// Like [`retry`], but hands the final error to `on_failure`
pub fn retry_or_else<T, E, F, G>(name: &str, policy: &RetryPolicy, op: F, on_failure: G) -> T
where
    E: Display,
    F: FnMut() -> Result<T, E>,
    G: FnOnce(E) -> T,
{
    retry(name, policy, op).unwrap_or_else(on_failure)
}

/// Async [`retry_unless`], sleeping on the tokio timer
pub async fn retry_async<T, E, F, Fut, P>(name: &str, policy: &RetryPolicy, ignore: P, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match judge(name, policy, attempt, op().await, &ignore) {
            Step::Done(result) => return result,
            Step::Wait(pause) => tokio::time::sleep(pause).await,
        }
        attempt += 1;
    }
}

/// `f()` when `condition` holds, otherwise `default` without calling `f`
pub fn conditional<T>(condition: bool, default: T, f: impl FnOnce() -> T) -> T {
    if condition { f() } else { default }
}

pub async fn conditional_async<T, Fut>(condition: bool, default: T, f: impl FnOnce() -> Fut) -> T
where
    Fut: Future<Output = T>,
{
    if condition { f().await } else { default }
}

/// Run `f` and log what it returned and how long it took
pub fn timed<T: Debug>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();

    log::info!(
        "[LOG_IT] \"{}\" ran and returned \"{:?}\" [Time taken: {:.6} seconds]",
        name,
        value,
        elapsed.as_secs_f64()
    );
    value
}

/// Run `f` on a new named thread, logging an error result
///
/// Dropping the handle detaches the thread.
pub fn run_threaded<T, E, F>(name: &str, f: F) -> io::Result<JoinHandle<Result<T, E>>>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let label = name.to_string();
    thread::Builder::new().name(name.to_string()).spawn(move || {
        let result = f();
        if let Err(e) = &result {
            log::error!("Error occurred in {} threaded function: {}", label, e);
        }
        result
    })
}

/// Spawn `fut` on the current tokio runtime, logging an error result
///
/// Panics outside a tokio runtime, like `tokio::spawn`.
pub fn spawn_task<T, E, F>(name: &str, fut: F) -> tokio::task::JoinHandle<Result<T, E>>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    let label = name.to_string();
    tokio::spawn(async move {
        let result = fut.await;
        if let Err(e) = &result {
            log::error!("Error occurred in {} task: {}", label, e);
        }
        result
    })
}
