//! Higher-order function wrappers.
//!
//! Every wrapper takes a [`Function`] and returns a new one with different timing, call-count,
//! binding or error-handling behavior:
//!
//! - timing: [`delay`], [`defer`], [`debounce`], [`throttle`], [`repeat`]
//! - call count: [`allow`], [`once`]
//! - call shape: [`bind`], [`methodize`], [`spread`], [`multicast`], [`multiset`], [`reduce`]
//! - diagnostics: [`deprecate`], [`suppress_warnings`], [`observable`], [`promisify`]
//!
//! Wrappers with options are also available as structs implementing [`Wrapper`], which can be
//! chained with [`Wrappers`]. Timing wrappers schedule on the current tokio runtime.
//!
//! # Example
//!
//! ```
//! use micro_wrap::{Function, once};
//! use serde_json::json;
//!
//! let init = once(Function::from_args(|_| json!("ready")));
//!
//! assert_eq!(init.invoke([]).unwrap().into_value(), Some(json!("ready")));
//! assert!(init.invoke([]).unwrap().is_unit());
//! ```

mod error;
mod function;
mod warning;

pub mod sync;
pub mod wrapper;

pub use error::WrapError;
pub use function::{
    CallResult, Function, FunctionId, Invocation, Output, Promise, Receiver, This, Timer, WeakFunction,
};
pub use warning::{SilentSink, SinkGuard, TracingSink, WarningSink, Warnings, WarningsBuilder};
pub use wrapper::{
    Allow, Callback, DEFAULT_DEPRECATION, Debounce, Defer, Delay, Deprecate, IdentityWrapper, Methodize, Observable,
    Repeat, Throttle, ThrottleOptions, Wrapper, WrapperFn, Wrappers, allow, bind, debounce, defer, delay, deprecate,
    is_truthy, methodize, multicast, multiset, observable, once, promisify, reduce, repeat, spread, suppress_warnings,
    throttle, wrapper_fn,
};
