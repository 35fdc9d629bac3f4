use crate::{DecorateError, Object};
use micro_wrap::Function;
use std::fmt;
use std::sync::Arc;

pub type Getter = Arc<dyn Fn(&Arc<Object>) -> Result<Function, DecorateError> + Send + Sync>;
pub type Setter = Arc<dyn Fn(Function) -> Result<(), DecorateError> + Send + Sync>;
pub type Initializer = Arc<dyn Fn() -> Function + Send + Sync>;

/// How a class member is stored: either a data member (`value` or `initializer`) or an
/// accessor (`get` and/or `set`), plus its flags.
#[derive(Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<Function>,
    pub initializer: Option<Initializer>,
    pub get: Option<Getter>,
    pub set: Option<Setter>,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// a method as a class body defines it: writable, configurable, not enumerable
    pub fn method(f: Function) -> Self {
        Self { value: Some(f), writable: true, configurable: true, ..Self::default() }
    }

    /// a member created by plain assignment, which is also enumerable
    pub fn assigned(f: Function) -> Self {
        Self { enumerable: true, ..Self::method(f) }
    }

    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// whether this carries anything a decorator could work on
    pub fn is_descriptor_like(&self) -> bool {
        self.value.is_some() || self.initializer.is_some() || self.is_accessor()
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("value", &self.value)
            .field("initializer", &self.initializer.is_some())
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("writable", &self.writable)
            .field("enumerable", &self.enumerable)
            .field("configurable", &self.configurable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_like() {
        assert!(!PropertyDescriptor::default().is_descriptor_like());

        let method = PropertyDescriptor::method(Function::from_args(|_| json!(1)));
        assert!(method.is_descriptor_like());
        assert!(!method.is_accessor());
        assert!(method.writable && method.configurable && !method.enumerable);

        let lazy = PropertyDescriptor {
            initializer: Some(Arc::new(|| Function::from_args(|_| json!(2)))),
            ..PropertyDescriptor::default()
        };
        assert!(lazy.is_descriptor_like());

        let setter_only = PropertyDescriptor {
            set: Some(Arc::new(|_: Function| -> Result<(), DecorateError> { Ok(()) })),
            ..PropertyDescriptor::default()
        };
        assert!(setter_only.is_descriptor_like());
        assert!(setter_only.is_accessor());
    }
}
