//! Collapses bursts of calls into one execution.
//!
//! Every call records its time and arguments. The first call of a burst starts a timer for
//! `wait`; when it fires and the last call is less than `wait` old, the timer re-arms for
//! the remainder. Once the burst is over the timer clears itself and, unless `immediate`,
//! runs the function with the latest arguments. With `immediate` the function instead runs
//! synchronously on the first call of each burst.

use crate::wrapper::{Wrapper, lock, schedule};
use crate::{CallResult, Function, Invocation, Output};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Debounce {
    wait: Duration,
    immediate: bool,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self { wait, immediate: false }
    }

    /// fire on the leading edge of a burst instead of the trailing one
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }
}

impl Wrapper<Function> for Debounce {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let debouncer = Arc::new(Debouncer {
            f,
            wait: self.wait,
            immediate: self.immediate,
            state: Mutex::new(DebounceState::default()),
        });
        Function::new(move |invocation| debouncer.call(invocation))
    }
}

pub fn debounce(wait: Duration, immediate: bool, f: Function) -> Function {
    Debounce::new(wait).immediate(immediate).wrap(f)
}

#[derive(Default)]
struct DebounceState {
    last_call: Option<Instant>,
    scheduled: bool,
    pending: Option<Invocation>,
    result: Option<Value>,
}

struct Debouncer {
    f: Function,
    wait: Duration,
    immediate: bool,
    state: Mutex<DebounceState>,
}

impl Debouncer {
    fn call(self: &Arc<Self>, invocation: Invocation) -> CallResult {
        let run_now = {
            let mut state = lock(&self.state);
            state.last_call = Some(Instant::now());
            let call_now = self.immediate && !state.scheduled;

            if !state.scheduled {
                schedule("debounce", Arc::clone(self).later())?;
                state.scheduled = true;
            }

            if call_now {
                state.pending = None;
                Some(invocation)
            } else {
                state.pending = Some(invocation);
                None
            }
        };

        if let Some(invocation) = run_now {
            let value = self.f.call(invocation)?.into_value();
            lock(&self.state).result.clone_from(&value);
        }

        Ok(Output::from(lock(&self.state).result.clone()))
    }

    async fn later(self: Arc<Self>) {
        let mut sleep_for = self.wait;
        let pending = loop {
            tokio::time::sleep(sleep_for).await;

            let mut state = lock(&self.state);
            let since_last = state.last_call.map_or(self.wait, |last| last.elapsed());
            if since_last < self.wait && !since_last.is_zero() {
                sleep_for = self.wait - since_last;
                trace!(remaining_ms = sleep_for.as_millis(), "debounce timer re-armed");
                continue;
            }

            state.scheduled = false;
            break if self.immediate { None } else { state.pending.take() };
        };

        if let Some(invocation) = pending {
            match self.f.call(invocation) {
                Ok(output) => lock(&self.state).result = output.into_value(),
                Err(e) => error!(cause = %e, "debounced call failed"),
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

    #[tokio::test(start_paused = true)]
    async fn trailing_burst_runs_once_after_the_last_call() {
        let (f, count) = counter();
        let f = debounce(ms(100), false, f);

        for _ in 0..5 {
            assert!(f.invoke([]).unwrap().is_unit());
            tokio::time::sleep(ms(40)).await;
        }
        // last call at t=160, execution due at t=260
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_call_uses_latest_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let f = debounce(
            ms(100),
            false,
            Function::from_args(move |args| {
                lock(&recorded).push(args[0].clone());
                Value::Null
            }),
        );

        f.invoke([json!(1)]).unwrap();
        f.invoke([json!(2)]).unwrap();
        f.invoke([json!(3)]).unwrap();
        tokio::time::sleep(ms(150)).await;

        assert_eq!(*lock(&seen), vec![json!(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_runs_on_the_leading_edge_only() {
        let (f, count) = counter();
        let f = debounce(ms(100), true, f);

        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(ms(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // a new burst after the idle period fires again
        assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(2)));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_fire_separately() {
        let (f, count) = counter();
        let f = debounce(ms(100), false, f);

        f.invoke([]).unwrap();
        f.invoke([]).unwrap();
        tokio::time::sleep(ms(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        f.invoke([]).unwrap();
        f.invoke([]).unwrap();
        tokio::time::sleep(ms(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn instances_are_independent() {
        let (f, count) = counter();
        let first = debounce(ms(100), false, f.clone());
        let second = debounce(ms(100), false, f);

        first.invoke([]).unwrap();
        second.invoke([]).unwrap();
        tokio::time::sleep(ms(150)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
