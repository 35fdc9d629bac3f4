use crate::wrapper::{Wrapper, lock, schedule};
use crate::{CallResult, Function, Invocation, Output};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{error, trace};

/// Which edges of a burst are allowed to fire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThrottleOptions {
    pub leading: bool,
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self { leading: true, trailing: true }
    }
}

/// At most one execution per `wait` window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Throttle {
    wait: Duration,
    options: ThrottleOptions,
}

impl Throttle {
    pub fn new(wait: Duration) -> Self {
        Self { wait, options: ThrottleOptions::default() }
    }

    pub fn options(mut self, options: ThrottleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn leading(mut self, leading: bool) -> Self {
        self.options.leading = leading;
        self
    }

    pub fn trailing(mut self, trailing: bool) -> Self {
        self.options.trailing = trailing;
        self
    }
}

impl Wrapper<Function> for Throttle {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let throttler = Arc::new(Throttler {
            f,
            wait: self.wait,
            options: self.options,
            state: Mutex::new(ThrottleState::default()),
        });
        Function::new(move |invocation| throttler.call(invocation))
    }
}

pub fn throttle(wait: Duration, options: ThrottleOptions, f: Function) -> Function {
    Throttle::new(wait).options(options).wrap(f)
}

#[derive(Default)]
struct ThrottleState {
    /// start of the current window, `None` before the first execution
    previous: Option<Instant>,
    timer: Option<AbortHandle>,
    pending: Option<Invocation>,
    result: Option<Value>,
}

struct Throttler {
    f: Function,
    wait: Duration,
    options: ThrottleOptions,
    state: Mutex<ThrottleState>,
}

impl Throttler {
    fn call(self: &Arc<Self>, invocation: Invocation) -> CallResult {
        let now = Instant::now();
        let run_now = {
            let mut state = lock(&self.state);
            if state.previous.is_none() && !self.options.leading {
                state.previous = Some(now);
            }

            let remaining = state.previous.map_or(Duration::ZERO, |previous| {
                self.wait.saturating_sub(now.saturating_duration_since(previous))
            });

            if remaining.is_zero() {
                if let Some(timer) = state.timer.take() {
                    timer.abort();
                }
                state.previous = Some(now);
                state.pending = None;
                Some(invocation)
            } else {
                state.pending = Some(invocation);
                if state.timer.is_none() && self.options.trailing {
                    let handle = schedule("throttle", Arc::clone(self).later(remaining))?;
                    state.timer = Some(handle.abort_handle());
                    trace!(remaining_ms = remaining.as_millis(), "throttle trailing call scheduled");
                }
                None
            }
        };

        if let Some(invocation) = run_now {
            let value = self.f.call(invocation)?.into_value();
            lock(&self.state).result.clone_from(&value);
        }

        Ok(Output::from(lock(&self.state).result.clone()))
    }

    async fn later(self: Arc<Self>, remaining: Duration) {
        tokio::time::sleep(remaining).await;

        let pending = {
            let mut state = lock(&self.state);
            state.previous = if self.options.leading { Some(Instant::now()) } else { None };
            state.timer = None;
            state.pending.take()
        };

        if let Some(invocation) = pending {
            match self.f.call(invocation) {
                Ok(output) => lock(&self.state).result = output.into_value(),
                Err(e) => error!(cause = %e, "throttled call failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Function, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        let f = Function::from_args(move |_| json!(counted.fetch_add(1, Ordering::SeqCst) + 1));
        (f, count)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn options_default_to_both_edges() {
        let options: ThrottleOptions = serde_json::from_value(json!({"leading": false})).unwrap();
        assert_eq!(options, ThrottleOptions { leading: false, trailing: true });

        let options: ThrottleOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, ThrottleOptions::default());
    }

    #[tokio::test(start_paused = true)]
    async fn without_leading_fires_once_after_wait() {
        let (f, count) = counter();
        let f = Throttle::new(ms(500)).leading(false).wrap(f);

        f.invoke([]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(550)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn without_leading_fires_once_per_window() {
        let (f, count) = counter();
        let f = Throttle::new(ms(100)).leading(false).wrap(f);

        f.invoke([]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // calls at t=0,30,..,270: windows close at t=100, t=220 and t=340
        for _ in 0..9 {
            tokio::time::sleep(ms(30)).await;
            f.invoke([]).unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::sleep(ms(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn leading_fires_immediately_then_trails() {
        let (f, count) = counter();
        let f = throttle(ms(100), ThrottleOptions::default(), f);

        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));

        tokio::time::sleep(ms(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn without_trailing_drops_the_rest_of_the_window() {
        let (f, count) = counter();
        let f = Throttle::new(ms(100)).trailing(false).wrap(f);

        f.invoke([]).unwrap();
        f.invoke([]).unwrap();
        f.invoke([]).unwrap();
        tokio::time::sleep(ms(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        f.invoke([]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
