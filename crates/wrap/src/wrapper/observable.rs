use crate::{CallResult, Function, Invocation, Output};
use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

type BeforeHook = Box<dyn Fn(&mut Invocation) -> ControlFlow<()> + Send + Sync>;
type AfterHook = Box<dyn Fn(&Output) -> Option<Value> + Send + Sync>;

/// A function with two swappable hooks around every call.
///
/// `before` sees the invocation and may rewrite its arguments; returning
/// [`ControlFlow::Break`] skips the call and yields no result. `after` sees the output and
/// may replace it by returning `Some`.
#[derive(Clone)]
pub struct Observable {
    inner: Arc<ObservableInner>,
}

struct ObservableInner {
    f: Function,
    before: ArcSwapOption<BeforeHook>,
    after: ArcSwapOption<AfterHook>,
}

impl Observable {
    pub fn new(f: Function) -> Self {
        Self { inner: Arc::new(ObservableInner { f, before: ArcSwapOption::empty(), after: ArcSwapOption::empty() }) }
    }

    pub fn set_before<H>(&self, hook: H)
    where
        H: Fn(&mut Invocation) -> ControlFlow<()> + Send + Sync + 'static,
    {
        let hook: BeforeHook = Box::new(hook);
        self.inner.before.store(Some(Arc::new(hook)));
    }

    pub fn clear_before(&self) {
        self.inner.before.store(None);
    }

    pub fn set_after<H>(&self, hook: H)
    where
        H: Fn(&Output) -> Option<Value> + Send + Sync + 'static,
    {
        let hook: AfterHook = Box::new(hook);
        self.inner.after.store(Some(Arc::new(hook)));
    }

    pub fn clear_after(&self) {
        self.inner.after.store(None);
    }

    pub fn call(&self, mut invocation: Invocation) -> CallResult {
        if let Some(before) = self.inner.before.load_full()
            && before(&mut invocation).is_break()
        {
            return Ok(Output::Unit);
        }

        let output = self.inner.f.call(invocation)?;

        if let Some(after) = self.inner.after.load_full()
            && let Some(replaced) = after(&output)
        {
            return Ok(Output::Value(replaced));
        }
        Ok(output)
    }

    /// the observed function, hooks set later still apply to it
    pub fn function(&self) -> Function {
        let observable = self.clone();
        Function::new(move |invocation| observable.call(invocation))
    }
}

impl From<Observable> for Function {
    fn from(observable: Observable) -> Self {
        observable.function()
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("f", &self.inner.f)
            .field("before", &self.inner.before.load().is_some())
            .field("after", &self.inner.after.load().is_some())
            .finish()
    }
}

pub fn observable(f: Function) -> Observable {
    Observable::new(f)
}
