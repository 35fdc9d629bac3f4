//! Class member decorators built from [`micro_wrap`] wrappers.
//!
//! A [`Class`] holds members as [`PropertyDescriptor`]s. Any [`MethodWrapper`] can be adapted
//! with [`to_decorator`] and then used bare ([`Decorator::attach`]) or with configuration
//! ([`Decorator::configure`]). The [`Registry`] resolves decorators by name, kind or wrapper
//! identity, swapping in the context-aware versions of `bind`, `deprecate`, `enumerable` and
//! `readonly`.
//!
//! # Example
//!
//! ```
//! use micro_decorate::{Class, Registry};
//! use micro_wrap::Function;
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let class = Class::builder("Service")
//!     .method("start", Function::from_args(|_| json!("started")))
//!     .decorator("start", registry.decorator("once").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let service = class.new_object();
//! assert_eq!(service.invoke("start", vec![]).unwrap().into_value(), Some(json!("started")));
//! assert!(service.invoke("start", vec![]).unwrap().is_unit());
//! ```

mod adapter;
mod class;
mod config;
mod contextual;
mod descriptor;
mod error;
mod registry;

pub use adapter::{
    ConfiguredDecorator, Decorated, Decorator, DecoratorCall, DecoratorContext, MemberDecorator, MethodWrapper,
    MethodWrapperFn, decorator, method_wrapper, to_decorator,
};
pub use class::{Class, ClassBuilder, Object, enumerable, readonly};
pub use contextual::{BindMember, DeprecateMember, EnumerableMember, ReadonlyMember};
pub use descriptor::{Getter, Initializer, PropertyDescriptor, Setter};
pub use error::DecorateError;
pub use registry::{DecoratorRef, GenericDecorator, Registry, RegistryBuilder, Resolved, StandardWrapper, WrapperKind};
