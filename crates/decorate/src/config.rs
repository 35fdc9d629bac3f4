//! Positional JSON configuration given at a decorator site.

use crate::DecorateError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub(crate) struct ConfigArgs<'a> {
    wrapper: &'static str,
    args: &'a [Value],
}

impl<'a> ConfigArgs<'a> {
    pub(crate) fn new(wrapper: &'static str, args: &'a [Value]) -> Self {
        Self { wrapper, args }
    }

    fn invalid(&self, reason: impl ToString) -> DecorateError {
        DecorateError::invalid_config(self.wrapper, reason)
    }

    /// `None` for a missing or `null` argument
    fn get(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index).filter(|value| !value.is_null())
    }

    pub(crate) fn count(&self, index: usize) -> Result<usize, DecorateError> {
        self.get(index)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.invalid(format!("argument {index} must be a non-negative integer")))
    }

    pub(crate) fn millis(&self, index: usize) -> Result<Duration, DecorateError> {
        self.get(index)
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
            .ok_or_else(|| self.invalid(format!("argument {index} must be a wait in milliseconds")))
    }

    pub(crate) fn millis_or(&self, index: usize, default: Duration) -> Result<Duration, DecorateError> {
        match self.get(index) {
            None => Ok(default),
            Some(_) => self.millis(index),
        }
    }

    pub(crate) fn flag_or(&self, index: usize, default: bool) -> Result<bool, DecorateError> {
        match self.get(index) {
            None => Ok(default),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(other) => Err(self.invalid(format!("argument {index} must be a boolean, got {other}"))),
        }
    }

    pub(crate) fn string(&self, index: usize) -> Result<Option<String>, DecorateError> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(format!("argument {index} must be a string, got {other}"))),
        }
    }

    /// every argument as a string
    pub(crate) fn strings(&self) -> Result<Vec<String>, DecorateError> {
        self.args
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| self.invalid(format!("`{value}` is not a name")))
            })
            .collect()
    }

    pub(crate) fn parse_or_default<T: DeserializeOwned + Default>(&self, index: usize) -> Result<T, DecorateError> {
        match self.get(index) {
            None => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| self.invalid(e)),
        }
    }
}
