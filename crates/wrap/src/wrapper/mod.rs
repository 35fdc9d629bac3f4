mod allow;
mod debounce;
mod delay;
mod deprecate;
mod observable;
mod promisify;
mod repeat;
mod shape;
mod throttle;

use crate::{Function, WrapError};
use std::future::Future;
use std::marker::PhantomData;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub(crate) use crate::sync::lock;

pub use allow::{Allow, allow, once};
pub use debounce::{Debounce, debounce};
pub use delay::{Defer, Delay, defer, delay};
pub use deprecate::{DEFAULT_DEPRECATION, Deprecate, deprecate, suppress_warnings};
pub use observable::{Observable, observable};
pub use promisify::{Callback, is_truthy, promisify};
pub use repeat::{Repeat, repeat};
pub use shape::{Methodize, bind, methodize, multicast, multiset, reduce, spread};
pub use throttle::{Throttle, ThrottleOptions, throttle};

/// A wrapper that can wrap a function to another
pub trait Wrapper<F> {
    /// the wrapper's output
    type Out;

    /// wrap the function to another
    fn wrap(&self, f: F) -> Self::Out;
}

/// A list of [`Wrapper`], which will wrap a function to another
pub struct Wrappers<Head, Tail, F> {
    head: Head,
    tail: Tail,
    _phantom: PhantomData<F>,
}

/// An identity wrappers, which does not do any wrapping
pub type IdentityWrappers<F> = Wrappers<IdentityWrapper, IdentityWrapper, F>;

impl<F> IdentityWrappers<F> {
    fn new() -> Self {
        Self { head: IdentityWrapper, tail: IdentityWrapper, _phantom: PhantomData }
    }
}

impl<F> Default for IdentityWrappers<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// An identity wrapper, which does not do any wrapping
#[derive(Default, Copy, Clone, Debug)]
pub struct IdentityWrapper;

impl<F> Wrapper<F> for IdentityWrapper {
    type Out = F;

    #[inline]
    fn wrap(&self, f: F) -> Self::Out {
        f
    }
}

impl<Head, Tail, F> Wrappers<Head, Tail, F>
where
    Head: Wrapper<F>,
    Tail: Wrapper<Head::Out>,
{
    /// add a [`Wrapper`] to the end of the [`Wrappers`], the argument [`Wrapper`] will wrap at last
    pub fn and_then<NewW>(self, wrapper: NewW) -> Wrappers<Self, NewW, F>
    where
        NewW: Wrapper<Tail::Out>,
    {
        Wrappers { head: self, tail: wrapper, _phantom: PhantomData }
    }
}

impl<Head, Tail, F> Wrapper<F> for Wrappers<Head, Tail, F>
where
    Head: Wrapper<F>,
    Tail: Wrapper<Head::Out>,
{
    type Out = Tail::Out;

    fn wrap(&self, f: F) -> Self::Out {
        let wrapped = self.head.wrap(f);
        self.tail.wrap(wrapped)
    }
}

impl<Head, Tail, F> std::fmt::Debug for Wrappers<Head, Tail, F>
where
    Head: std::fmt::Debug,
    Tail: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrappers").field("head", &self.head).field("tail", &self.tail).finish()
    }
}

/// A [`Wrapper`] made of a closure
#[derive(Copy, Clone)]
pub struct WrapperFn<W> {
    w: W,
}

pub fn wrapper_fn<W>(w: W) -> WrapperFn<W>
where
    W: Fn(Function) -> Function,
{
    WrapperFn { w }
}

impl<W> Wrapper<Function> for WrapperFn<W>
where
    W: Fn(Function) -> Function,
{
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        (self.w)(f)
    }
}

impl<W> std::fmt::Debug for WrapperFn<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperFn").finish_non_exhaustive()
    }
}

pub(crate) fn schedule<Fut>(wrapper: &'static str, future: Fut) -> Result<JoinHandle<Fut::Output>, WrapError>
where
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Ok(handle.spawn(future)),
        Err(e) => {
            tracing::error!(cause = %e, wrapper, "no runtime to schedule on");
            Err(WrapError::no_runtime(wrapper))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::wrapper::{IdentityWrapper, Wrapper, Wrappers, wrapper_fn};
    use crate::{Function, Output};
    use serde_json::{Value, json};

    fn suffix(tag: &'static str) -> impl Fn(Function) -> Function {
        move |f: Function| {
            Function::new(move |invocation| {
                let value = f.call(invocation)?.into_value().unwrap_or(Value::Null);
                Ok(Output::Value(json!(format!("{tag} {}", value.as_str().unwrap_or_default()))))
            })
        }
    }

    #[test]
    fn test_and_then() {
        let wrappers: Wrappers<IdentityWrapper, IdentityWrapper, Function> = Wrappers::default();

        let wrappers = wrappers.and_then(wrapper_fn(suffix("s1"))).and_then(wrapper_fn(suffix("s2")));

        let f = wrappers.wrap(Function::from_args(|args| {
            json!(format!("s0 {}", args[0].as_str().unwrap_or_default()))
        }));

        let result = f.invoke([json!("Hello")]).unwrap().into_value();
        assert_eq!(result, Some(json!("s2 s1 s0 Hello")));
    }

    #[test]
    fn schedule_outside_runtime_fails() {
        let result = super::schedule("test", async {});
        assert!(matches!(result, Err(crate::WrapError::NoRuntime { wrapper: "test" })));
    }
}
