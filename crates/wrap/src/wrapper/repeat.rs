use crate::wrapper::{Wrapper, schedule};
use crate::{Function, Output, Timer};
use serde_json::Value;
use std::time::Duration;
use tracing::error;

/// Calls the function `times` times per call.
///
/// Without a wait the calls run back to back and their results come back as an array;
/// with a wait they run one per tick in the background and the results are dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Repeat {
    times: usize,
    wait: Duration,
}

impl Repeat {
    pub fn new(times: usize) -> Self {
        Self { times, wait: Duration::ZERO }
    }

    pub fn every(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

impl Wrapper<Function> for Repeat {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let Repeat { times, wait } = *self;

        if wait.is_zero() {
            return Function::new(move |invocation| {
                let mut results = Vec::with_capacity(times);
                for _ in 0..times {
                    results.push(f.call(invocation.clone())?.into_value().unwrap_or(Value::Null));
                }
                Ok(Output::Value(Value::Array(results)))
            });
        }

        Function::new(move |invocation| {
            let f = f.clone();
            let handle = schedule("repeat", async move {
                for round in 0..times {
                    tokio::time::sleep(wait).await;
                    if let Err(e) = f.call(invocation.clone()) {
                        error!(cause = %e, round, "repeated call failed, stop repeating");
                        return;
                    }
                }
            })?;
            Ok(Output::Timer(Timer::new(handle.abort_handle())))
        })
    }
}

pub fn repeat(times: usize, wait: Duration, f: Function) -> Function {
    Repeat::new(times).every(wait).wrap(f)
}
