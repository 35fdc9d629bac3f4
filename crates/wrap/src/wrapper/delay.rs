use crate::wrapper::{Wrapper, schedule};
use crate::{Function, Invocation, Output, Promise, Timer, WrapError};
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::error;

/// Runs every call once `wait` has elapsed.
///
/// By default a call returns [`Output::Timer`], which can cancel the pending execution. In
/// promise mode it returns [`Output::Promise`] resolving with the settled result instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Delay {
    wait: Duration,
    promise: bool,
}

impl Delay {
    pub fn new(wait: Duration) -> Self {
        Self { wait, promise: false }
    }

    pub fn promise(mut self) -> Self {
        self.promise = true;
        self
    }
}

impl Wrapper<Function> for Delay {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let Delay { wait, promise } = *self;
        Function::new(move |invocation| {
            let handle = schedule("delay", run_later(f.clone(), invocation, wait, promise))?;
            Ok(scheduled_output(handle, promise))
        })
    }
}

/// Runs every call on the next scheduler turn, never synchronously.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Defer {
    promise: bool,
}

impl Defer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn promise(mut self) -> Self {
        self.promise = true;
        self
    }
}

impl Wrapper<Function> for Defer {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let promise = self.promise;
        Function::new(move |invocation| {
            let handle = schedule("defer", run_later(f.clone(), invocation, Duration::ZERO, promise))?;
            Ok(scheduled_output(handle, promise))
        })
    }
}

pub fn delay(wait: Duration, f: Function) -> Function {
    Delay::new(wait).wrap(f)
}

pub fn defer(f: Function) -> Function {
    Defer::new().wrap(f)
}

async fn run_later(
    f: Function,
    invocation: Invocation,
    wait: Duration,
    promise: bool,
) -> Result<Option<Value>, WrapError> {
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }

    let result = match f.call(invocation) {
        Ok(output) => output.settle().await,
        Err(e) => Err(e),
    };

    // nobody can observe the result of a timer, so report it here
    if !promise && let Err(e) = &result {
        error!(cause = %e, "scheduled call failed");
    }
    result
}

fn scheduled_output(handle: JoinHandle<Result<Option<Value>, WrapError>>, promise: bool) -> Output {
    if promise { Output::Promise(Promise::from_task(handle)) } else { Output::Timer(Timer::new(handle.abort_handle())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn counter() -> (Function, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        let f = Function::from_args(move |_| json!(counted.fetch_add(1, Ordering::SeqCst)));
        (f, count)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn recorder() -> (Function, Arc<Mutex<Vec<Value>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        let f = Function::from_args(move |args| {
            recorded.lock().unwrap().push(args[0].clone());
            Value::Null
        });
        (f, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_calls_run_in_deadline_order() {
        let (f, calls) = recorder();
        let slow = delay(ms(100), f.clone());
        let fast = delay(ms(50), f.clone());
        let next = defer(f);

        slow.invoke([json!(1)]).unwrap();
        fast.invoke([json!(2)]).unwrap();
        next.invoke([json!(3)]).unwrap();
        for n in 4..=9 {
            fast.invoke([json!(n)]).unwrap();
        }

        tokio::time::sleep(ms(200)).await;
        assert_eq!(*calls.lock().unwrap(), [3, 2, 4, 5, 6, 7, 8, 9, 1].map(|n| json!(n)));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_runs_after_wait() {
        let (f, count) = counter();
        let f = delay(ms(100), f);

        let output = f.invoke([]).unwrap();
        assert!(matches!(output, Output::Timer(_)));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_promise_resolves_with_result() {
        let (f, count) = counter();
        let f = Delay::new(ms(50)).promise().wrap(f);

        let promise = f.invoke([]).unwrap().into_promise().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert_eq!(promise.await, Ok(Some(json!(0))));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_runs() {
        let (f, count) = counter();
        let f = delay(ms(100), f);

        let timer = f.invoke([]).unwrap().into_timer().unwrap();
        timer.cancel();

        tokio::time::sleep(ms(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(timer.is_finished());
    }

    #[tokio::test]
    async fn defer_is_not_synchronous() {
        let (f, count) = counter();
        let f = defer(f);

        f.invoke([]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn defer_promise_propagates_errors() {
        let f = Defer::new().promise().wrap(Function::new(|_| Err(WrapError::raised("boom"))));

        let promise = f.invoke([]).unwrap().into_promise().unwrap();
        assert_eq!(promise.await, Err(WrapError::raised("boom")));
    }

    #[test]
    fn requires_a_runtime() {
        let (f, _count) = counter();
        let f = delay(ms(10), f);
        assert!(matches!(f.invoke([]), Err(WrapError::NoRuntime { wrapper: "delay" })));
    }
}
