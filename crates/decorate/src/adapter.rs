//! Turns a [`MethodWrapper`] into a decorator usable both bare and with configuration.

use crate::{Class, DecorateError, PropertyDescriptor};
use micro_wrap::Function;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a wrapper sees while decorating a member.
pub struct DecoratorContext<'a> {
    target: &'a Arc<Class>,
    key: &'a str,
    descriptor: &'a mut PropertyDescriptor,
}

impl<'a> DecoratorContext<'a> {
    pub fn new(target: &'a Arc<Class>, key: &'a str, descriptor: &'a mut PropertyDescriptor) -> Self {
        Self { target, key, descriptor }
    }

    pub fn target(&self) -> &Arc<Class> {
        self.target
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn descriptor(&self) -> &PropertyDescriptor {
        self.descriptor
    }

    pub fn descriptor_mut(&mut self) -> &mut PropertyDescriptor {
        self.descriptor
    }
}

impl fmt::Debug for DecoratorContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorContext")
            .field("target", &self.target.name())
            .field("key", &self.key)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// A function wrapper that can decorate class members.
///
/// `apply` gets the member's current function plus the configuration given at the decorator
/// site. Returning `Some` replaces the member's value; returning `None` keeps whatever the
/// wrapper left in the descriptor.
pub trait MethodWrapper: Send + Sync {
    fn name(&self) -> &str;

    fn apply(
        &self,
        context: &mut DecoratorContext<'_>,
        config: &[Value],
        f: Function,
    ) -> Result<Option<Function>, DecorateError>;
}

/// Something that rewrites a member descriptor, see [`Class::decorate`].
pub trait MemberDecorator: Send + Sync {
    fn decorate(
        &self,
        target: &Arc<Class>,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> Result<PropertyDescriptor, DecorateError>;
}

/// The two ways a decorator gets called.
#[derive(Debug)]
pub enum DecoratorCall {
    /// `@wrapper` directly on a member
    Attach { target: Arc<Class>, key: String, descriptor: PropertyDescriptor },
    /// `@wrapper(config...)`, yielding the decorator to attach
    Configure(Vec<Value>),
}

#[derive(Debug)]
pub enum Decorated {
    Descriptor(PropertyDescriptor),
    Configured(ConfiguredDecorator),
}

impl Decorated {
    pub fn into_descriptor(self) -> Option<PropertyDescriptor> {
        match self {
            Decorated::Descriptor(descriptor) => Some(descriptor),
            Decorated::Configured(_) => None,
        }
    }

    pub fn into_configured(self) -> Option<ConfiguredDecorator> {
        match self {
            Decorated::Configured(configured) => Some(configured),
            Decorated::Descriptor(_) => None,
        }
    }
}

/// A wrapper adapted into a decorator.
#[derive(Clone)]
pub struct Decorator {
    wrapper: Arc<dyn MethodWrapper>,
}

pub fn to_decorator(wrapper: Arc<dyn MethodWrapper>) -> Decorator {
    Decorator { wrapper }
}

impl Decorator {
    pub fn wrapper(&self) -> &Arc<dyn MethodWrapper> {
        &self.wrapper
    }

    pub fn call(&self, call: DecoratorCall) -> Result<Decorated, DecorateError> {
        match call {
            DecoratorCall::Attach { target, key, descriptor } => {
                self.decorate(&target, &key, descriptor).map(Decorated::Descriptor)
            }
            DecoratorCall::Configure(config) => Ok(Decorated::Configured(self.configure(config))),
        }
    }

    /// `@wrapper` with no configuration
    pub fn attach(
        &self,
        target: &Arc<Class>,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> Result<PropertyDescriptor, DecorateError> {
        self.decorate(target, key, descriptor)
    }

    /// `@wrapper(config...)`
    pub fn configure(&self, config: Vec<Value>) -> ConfiguredDecorator {
        ConfiguredDecorator { wrapper: Arc::clone(&self.wrapper), config }
    }
}

impl MemberDecorator for Decorator {
    fn decorate(
        &self,
        target: &Arc<Class>,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> Result<PropertyDescriptor, DecorateError> {
        if !descriptor.is_descriptor_like() {
            return Err(DecorateError::not_a_descriptor(key));
        }
        apply(self.wrapper.as_ref(), target, key, descriptor, &[])
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator").field("wrapper", &self.wrapper.name()).finish()
    }
}

/// A decorator with its configuration bound, ready to attach.
#[derive(Clone)]
pub struct ConfiguredDecorator {
    wrapper: Arc<dyn MethodWrapper>,
    config: Vec<Value>,
}

impl ConfiguredDecorator {
    pub fn config(&self) -> &[Value] {
        &self.config
    }

    pub fn attach(
        &self,
        target: &Arc<Class>,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> Result<PropertyDescriptor, DecorateError> {
        self.decorate(target, key, descriptor)
    }
}

impl MemberDecorator for ConfiguredDecorator {
    fn decorate(
        &self,
        target: &Arc<Class>,
        key: &str,
        descriptor: PropertyDescriptor,
    ) -> Result<PropertyDescriptor, DecorateError> {
        apply(self.wrapper.as_ref(), target, key, descriptor, &self.config)
    }
}

impl fmt::Debug for ConfiguredDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredDecorator")
            .field("wrapper", &self.wrapper.name())
            .field("config", &self.config)
            .finish()
    }
}

/// The generic decorator: uses any wrapper as a decorator with the given configuration.
pub fn decorator(wrapper: Arc<dyn MethodWrapper>, config: Vec<Value>) -> ConfiguredDecorator {
    to_decorator(wrapper).configure(config)
}

fn apply(
    wrapper: &dyn MethodWrapper,
    target: &Arc<Class>,
    key: &str,
    mut descriptor: PropertyDescriptor,
    config: &[Value],
) -> Result<PropertyDescriptor, DecorateError> {
    let f = descriptor
        .value
        .clone()
        .or_else(|| target.get(key))
        .ok_or_else(|| DecorateError::missing_member(target.name(), key))?;

    let mut context = DecoratorContext::new(target, key, &mut descriptor);
    if let Some(wrapped) = wrapper.apply(&mut context, config, f)? {
        descriptor.value = Some(wrapped);
    }
    Ok(descriptor)
}

/// A [`MethodWrapper`] from a closure over the context, configuration and function.
pub struct MethodWrapperFn<F> {
    name: String,
    f: F,
}

pub fn method_wrapper<F>(name: impl Into<String>, f: F) -> MethodWrapperFn<F>
where
    F: Fn(&mut DecoratorContext<'_>, &[Value], Function) -> Result<Option<Function>, DecorateError> + Send + Sync,
{
    MethodWrapperFn { name: name.into(), f }
}

impl<F> fmt::Debug for MethodWrapperFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodWrapperFn").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> MethodWrapper for MethodWrapperFn<F>
where
    F: Fn(&mut DecoratorContext<'_>, &[Value], Function) -> Result<Option<Function>, DecorateError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        &self,
        context: &mut DecoratorContext<'_>,
        config: &[Value],
        f: Function,
    ) -> Result<Option<Function>, DecorateError> {
        (self.f)(context, config, f)
    }
}
