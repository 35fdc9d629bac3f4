//! Wrappers that need the decoration context rather than just the function.

use crate::config::ConfigArgs;
use crate::{DecorateError, DecoratorContext, MethodWrapper, Object, PropertyDescriptor};
use micro_wrap::{DEFAULT_DEPRECATION, Deprecate, Function, Invocation, This, Warnings, Wrapper};
use serde_json::Value;
use std::sync::Arc;

/// Turns a method into an accessor that hands out a per-instance bound copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct BindMember;

/// `f` with its receiver fixed to `object`, which it keeps alive.
fn bind_to(object: &Arc<Object>, f: Function) -> Function {
    let instance = Arc::clone(object);
    Function::new(move |invocation| {
        let (_, args) = invocation.into_parts();
        f.call(Invocation::from_parts(Some(Arc::clone(&instance) as This), args))
    })
}

impl MethodWrapper for BindMember {
    fn name(&self) -> &str {
        "bind"
    }

    fn apply(
        &self,
        context: &mut DecoratorContext<'_>,
        _config: &[Value],
        f: Function,
    ) -> Result<Option<Function>, DecorateError> {
        let target = Arc::downgrade(context.target());
        let key = context.key().to_owned();
        let descriptor = context.descriptor_mut();

        descriptor.value = None;
        descriptor.initializer = None;
        descriptor.writable = false;
        descriptor.set = Some(Arc::new(move |value: Function| {
            let target = target.upgrade().ok_or(DecorateError::Dropped)?;
            target.define_property(&key, PropertyDescriptor::method(value))
        }));
        descriptor.get = Some(Arc::new(move |object: &Arc<Object>| -> Result<Function, DecorateError> {
            Ok(object.bound(&f, || bind_to(object, f.clone())))
        }));
        Ok(None)
    }
}

/// Deprecation notice naming the class and member.
#[derive(Debug, Clone, Default)]
pub struct DeprecateMember {
    warnings: Warnings,
}

impl DeprecateMember {
    pub fn new(warnings: Warnings) -> Self {
        Self { warnings }
    }
}

impl MethodWrapper for DeprecateMember {
    fn name(&self) -> &str {
        "deprecate"
    }

    fn apply(
        &self,
        context: &mut DecoratorContext<'_>,
        config: &[Value],
        f: Function,
    ) -> Result<Option<Function>, DecorateError> {
        let config = ConfigArgs::new("deprecate", config);
        let message = config.string(0)?;
        let message = message.as_deref().unwrap_or(DEFAULT_DEPRECATION);

        let mut deprecate = Deprecate::new()
            .message(format!("DEPRECATION {}#{}: {message}", context.target().name(), context.key()))
            .warnings(self.warnings.clone());
        if let Some(url) = config.string(1)? {
            deprecate = deprecate.url(url);
        }
        Ok(Some(deprecate.wrap(f)))
    }
}

/// Sets whether the member shows up in [`Class::keys`](crate::Class::keys); only an
/// explicit `false` hides it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumerableMember;

impl MethodWrapper for EnumerableMember {
    fn name(&self) -> &str {
        "enumerable"
    }

    fn apply(
        &self,
        context: &mut DecoratorContext<'_>,
        config: &[Value],
        _f: Function,
    ) -> Result<Option<Function>, DecorateError> {
        context.descriptor_mut().enumerable = !matches!(config.first(), Some(Value::Bool(false)));
        Ok(None)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReadonlyMember;

impl MethodWrapper for ReadonlyMember {
    fn name(&self) -> &str {
        "readonly"
    }

    fn apply(
        &self,
        context: &mut DecoratorContext<'_>,
        _config: &[Value],
        _f: Function,
    ) -> Result<Option<Function>, DecorateError> {
        let descriptor = context.descriptor_mut();
        descriptor.writable = false;
        descriptor.configurable = false;
        Ok(None)
    }
}
