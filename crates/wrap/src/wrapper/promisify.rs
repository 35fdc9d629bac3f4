use crate::{Function, Invocation, Output, Promise, WrapError};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::trace;

/// Completion callback of a callback-style function, shaped `(error, results...)`.
#[derive(Debug)]
pub struct Callback {
    sender: oneshot::Sender<Result<Vec<Value>, Value>>,
}

impl Callback {
    /// a truthy `error` rejects, anything else resolves with `results`
    pub fn call(self, error: Value, results: Vec<Value>) {
        if is_truthy(&error) { self.reject(error) } else { self.resolve(results) }
    }

    pub fn resolve(self, results: Vec<Value>) {
        self.complete(Ok(results));
    }

    pub fn reject(self, error: Value) {
        self.complete(Err(error));
    }

    fn complete(self, result: Result<Vec<Value>, Value>) {
        if self.sender.send(result).is_err() {
            trace!("promise dropped before the callback fired");
        }
    }
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Turns a callback-style function into one returning a [`Promise`].
///
/// The promise resolves with the array of results handed to the callback, or rejects with
/// [`WrapError::Rejected`] carrying the error. Errors raised by `f` itself reject too.
pub fn promisify<F>(f: F) -> Function
where
    F: Fn(Invocation, Callback) -> Result<(), WrapError> + Send + Sync + 'static,
{
    Function::new(move |invocation| {
        let (sender, receiver) = oneshot::channel();

        if let Err(e) = f(invocation, Callback { sender }) {
            return Ok(Output::Promise(Promise::rejected(e)));
        }

        Ok(Output::Promise(Promise::new(async move {
            match receiver.await {
                Ok(Ok(results)) => Ok(Some(Value::Array(results))),
                Ok(Err(error)) => Err(WrapError::Rejected(error)),
                Err(_closed) => Err(WrapError::CallbackDropped),
            }
        })))
    })
}
