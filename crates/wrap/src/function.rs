//! The dynamic function model every wrapper works on.
//!
//! A [`Function`] is a cheaply cloneable, thread-safe callable that takes an [`Invocation`]
//! (an optional receiver plus JSON arguments) and produces an [`Output`]. Wrappers take a
//! `Function` and return another one, so any wrapper can be stacked on any other.

use crate::WrapError;
use futures::future::BoxFuture;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::task::{AbortHandle, JoinHandle};

pub type CallResult = Result<Output, WrapError>;

/// The value a method is called on.
pub trait Receiver: fmt::Debug + Send + Sync + 'static {
    /// look up a named property on the receiver
    fn property(&self, name: &str) -> Option<Value>;

    /// the receiver as a plain value
    fn snapshot(&self) -> Value;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl Receiver for Value {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn snapshot(&self) -> Value {
        self.clone()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub type This = Arc<dyn Receiver>;

/// A single call: receiver and arguments.
#[derive(Clone, Debug, Default)]
pub struct Invocation {
    receiver: Option<This>,
    args: Vec<Value>,
}

impl Invocation {
    pub fn new(args: Vec<Value>) -> Self {
        Self { receiver: None, args }
    }

    pub fn from_parts(receiver: Option<This>, args: Vec<Value>) -> Self {
        Self { receiver, args }
    }

    /// set the receiver, replacing any previous one
    pub fn on(mut self, receiver: This) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn receiver(&self) -> Option<&This> {
        self.receiver.as_ref()
    }

    /// the receiver downcast to its concrete type
    pub fn receiver_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let receiver = Arc::clone(self.receiver.as_ref()?);
        receiver.into_any().downcast::<T>().ok()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Vec<Value> {
        &mut self.args
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn into_parts(self) -> (Option<This>, Vec<Value>) {
        (self.receiver, self.args)
    }
}

impl From<Vec<Value>> for Invocation {
    fn from(args: Vec<Value>) -> Self {
        Self::new(args)
    }
}

type DynFn = dyn Fn(Invocation) -> CallResult + Send + Sync;

/// Identity of a [`Function`]; clones share it, wrapping produces a new one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FunctionId(usize);

#[derive(Clone)]
pub struct Function {
    inner: Arc<DynFn>,
}

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Invocation) -> CallResult + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// a function that ignores its receiver and maps its arguments to a value
    pub fn from_args<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self::new(move |invocation| Ok(Output::Value(f(invocation.args()))))
    }

    #[inline]
    pub fn call(&self, invocation: Invocation) -> CallResult {
        (self.inner)(invocation)
    }

    /// call without a receiver
    pub fn invoke<I>(&self, args: I) -> CallResult
    where
        I: IntoIterator<Item = Value>,
    {
        self.call(Invocation::new(args.into_iter().collect()))
    }

    pub fn id(&self) -> FunctionId {
        FunctionId(Arc::as_ptr(&self.inner).cast::<()>().addr())
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        self.id() == other.id()
    }

    /// a handle that does not keep the function, or anything it captures, alive
    pub fn downgrade(&self) -> WeakFunction {
        WeakFunction { inner: Arc::downgrade(&self.inner) }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("id", &self.id()).finish()
    }
}

/// A non-owning [`Function`] handle, see [`Function::downgrade`].
#[derive(Clone)]
pub struct WeakFunction {
    inner: Weak<DynFn>,
}

impl WeakFunction {
    pub fn upgrade(&self) -> Option<Function> {
        self.inner.upgrade().map(|inner| Function { inner })
    }
}

impl fmt::Debug for WeakFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakFunction").field("alive", &(self.inner.strong_count() > 0)).finish()
    }
}

/// What a call produced.
#[derive(Debug)]
pub enum Output {
    /// no result
    Unit,
    Value(Value),
    /// work handed to the scheduler, only cancellable
    Timer(Timer),
    /// work handed to the scheduler, resolving with its settled result
    Promise(Promise),
}

impl Output {
    pub fn is_unit(&self) -> bool {
        matches!(self, Output::Unit)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Output::Value(value) => Some(value),
            _ => None,
        }
    }

    /// the synchronous result, `None` for everything but [`Output::Value`]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Output::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_timer(self) -> Option<Timer> {
        match self {
            Output::Timer(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn into_promise(self) -> Option<Promise> {
        match self {
            Output::Promise(promise) => Some(promise),
            _ => None,
        }
    }

    /// wait for the eventual result; promises are flattened, timers settle to no result
    pub fn settle(self) -> BoxFuture<'static, Result<Option<Value>, WrapError>> {
        match self {
            Output::Unit | Output::Timer(_) => Box::pin(futures::future::ready(Ok(None))),
            Output::Value(value) => Box::pin(futures::future::ready(Ok(Some(value)))),
            Output::Promise(promise) => Box::pin(promise),
        }
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Output::Value(value)
    }
}

impl From<Option<Value>> for Output {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Output::Unit, Output::Value)
    }
}

/// Handle of a scheduled call.
#[derive(Debug, Clone)]
pub struct Timer {
    handle: AbortHandle,
}

impl Timer {
    pub(crate) fn new(handle: AbortHandle) -> Self {
        Self { handle }
    }

    /// cancel the scheduled call if it has not run yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// A future resolving with the eventual result of a call.
pub struct Promise {
    inner: BoxFuture<'static, Result<Option<Value>, WrapError>>,
}

impl Promise {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<Value>, WrapError>> + Send + 'static,
    {
        Self { inner: Box::pin(future) }
    }

    pub fn resolved(value: Option<Value>) -> Self {
        Self::new(futures::future::ready(Ok(value)))
    }

    pub fn rejected(error: WrapError) -> Self {
        Self::new(futures::future::ready(Err(error)))
    }

    pub(crate) fn from_task(handle: JoinHandle<Result<Option<Value>, WrapError>>) -> Self {
        Self::new(async move { handle.await? })
    }
}

impl Future for Promise {
    type Output = Result<Option<Value>, WrapError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}
