//! Wrappers that change how a call is shaped: its receiver or its argument list.

use crate::wrapper::Wrapper;
use crate::{Function, Invocation, Output, This, WrapError};
use serde_json::Value;
use std::iter;
use tracing::debug;

/// Fixes the receiver and leading arguments for good, the call-site receiver is ignored.
pub fn bind(receiver: Option<This>, leading: Vec<Value>, f: Function) -> Function {
    Function::new(move |invocation| {
        let (_, args) = invocation.into_parts();
        let args = leading.iter().cloned().chain(args).collect();
        f.call(Invocation::from_parts(receiver.clone(), args))
    })
}

/// Turns a free function taking `self`-like leading parameters into a method.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Methodize {
    properties: Vec<String>,
}

impl Methodize {
    /// prepend the receiver itself
    pub fn new() -> Self {
        Self::default()
    }

    /// prepend the named properties of the receiver, in order
    pub fn properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { properties: properties.into_iter().map(Into::into).collect() }
    }
}

impl Wrapper<Function> for Methodize {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let properties = self.properties.clone();
        Function::new(move |invocation| {
            let (receiver, args) = invocation.into_parts();
            let receiver = receiver.ok_or_else(|| WrapError::missing_receiver("methodize"))?;

            let leading: Vec<Value> = if properties.is_empty() {
                vec![receiver.snapshot()]
            } else {
                properties.iter().map(|name| receiver.property(name).unwrap_or(Value::Null)).collect()
            };

            f.call(Invocation::new(leading.into_iter().chain(args).collect()))
        })
    }
}

pub fn methodize<I, S>(properties: I, f: Function) -> Function
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Methodize::properties(properties).wrap(f)
}

/// Calls `f` with all arguments gathered into one array.
pub fn spread(f: Function) -> Function {
    Function::new(move |invocation| {
        let (receiver, args) = invocation.into_parts();
        f.call(Invocation::from_parts(receiver, vec![Value::Array(args)]))
    })
}

/// Maps `f` over a leading array argument, or forwards a plain call.
pub fn multicast(f: Function) -> Function {
    Function::new(move |invocation| {
        let (receiver, args) = invocation.into_parts();
        let mut args = args.into_iter();

        match args.next() {
            Some(Value::Array(items)) => {
                let rest: Vec<Value> = args.collect();
                let results = items
                    .into_iter()
                    .map(|item| {
                        let call_args = iter::once(item).chain(rest.iter().cloned()).collect();
                        let output = f.call(Invocation::from_parts(receiver.clone(), call_args))?;
                        Ok(output.into_value().unwrap_or(Value::Null))
                    })
                    .collect::<Result<Vec<_>, WrapError>>()?;
                Ok(Output::Value(Value::Array(results)))
            }
            first => f.call(Invocation::from_parts(receiver, first.into_iter().chain(args).collect())),
        }
    })
}

/// Calls `f(key, value)` for every entry of a leading object argument.
///
/// Arrays are walked as `("index", item)` pairs. Any other leading argument, the single
/// `(key, value)` form included, is ignored.
pub fn multiset(f: Function) -> Function {
    Function::new(move |invocation| {
        let (receiver, args) = invocation.into_parts();

        match args.into_iter().next() {
            Some(Value::Object(entries)) => {
                for (key, value) in entries {
                    f.call(Invocation::from_parts(receiver.clone(), vec![Value::String(key), value]))?;
                }
            }
            Some(Value::Array(items)) => {
                for (index, item) in items.into_iter().enumerate() {
                    f.call(Invocation::from_parts(receiver.clone(), vec![Value::String(index.to_string()), item]))?;
                }
            }
            other => debug!(key = ?other, "multiset called without a map, nothing to set"),
        }

        Ok(Output::Unit)
    })
}

/// Left fold of all arguments through the binary `f`.
pub fn reduce(f: Function) -> Function {
    Function::new(move |invocation| {
        let (_, args) = invocation.into_parts();
        let mut args = args.into_iter();

        let first = args
            .next()
            .ok_or_else(|| WrapError::invalid_argument("reduce", "empty argument list with no initial value"))?;
        let folded = args.try_fold(first, |acc, current| {
            f.invoke([acc, current]).map(|output| output.into_value().unwrap_or(Value::Null))
        })?;

        Ok(Output::Value(folded))
    })
}
