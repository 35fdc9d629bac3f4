//! Named decoration targets and their instances.

use crate::{DecorateError, MemberDecorator, PropertyDescriptor};
use micro_wrap::sync::{lock, read, write};
use micro_wrap::{CallResult, Function, FunctionId, Invocation, Receiver, This, WeakFunction};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use tracing::trace;

/// A class-like target: a name plus members stored as [`PropertyDescriptor`]s.
///
/// Members are shared by every [`Object`] instantiated from the class, so state a wrapper
/// keeps (an `allow` counter, a debounce timer) is shared across instances too.
pub struct Class {
    name: String,
    members: RwLock<BTreeMap<String, PropertyDescriptor>>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), members: RwLock::new(BTreeMap::new()) })
    }

    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self, key: &str) -> Option<PropertyDescriptor> {
        read(&self.members).get(key).cloned()
    }

    /// the data value of a member; accessors need an instance, see [`Object::method`]
    pub fn get(&self, key: &str) -> Option<Function> {
        read(&self.members).get(key).and_then(|descriptor| descriptor.value.clone())
    }

    pub fn has(&self, key: &str) -> bool {
        read(&self.members).contains_key(key)
    }

    /// every member name, in order
    pub fn members(&self) -> Vec<String> {
        read(&self.members).keys().cloned().collect()
    }

    /// the names of enumerable members, in order
    pub fn keys(&self) -> Vec<String> {
        read(&self.members)
            .iter()
            .filter(|(_, descriptor)| descriptor.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Defines or redefines a member. An initializer is evaluated once, here.
    pub fn define_property(&self, key: &str, mut descriptor: PropertyDescriptor) -> Result<(), DecorateError> {
        if descriptor.value.is_none()
            && let Some(initializer) = descriptor.initializer.take()
        {
            descriptor.value = Some(initializer());
        }

        let mut members = write(&self.members);
        if let Some(existing) = members.get(key)
            && !existing.configurable
        {
            return Err(DecorateError::not_configurable(&self.name, key));
        }

        trace!(class = %self.name, key, "define member");
        members.insert(key.to_owned(), descriptor);
        Ok(())
    }

    /// Assigns a member the way `target[key] = f` would: through a setter if there is one,
    /// creating an enumerable member if there is none.
    pub fn set(&self, key: &str, f: Function) -> Result<(), DecorateError> {
        let Some(existing) = self.descriptor(key) else {
            return self.define_property(key, PropertyDescriptor::assigned(f));
        };

        if let Some(set) = existing.set {
            return set(f);
        }
        if existing.is_accessor() || !existing.writable {
            return Err(DecorateError::read_only(&self.name, key));
        }

        let mut members = write(&self.members);
        if let Some(member) = members.get_mut(key) {
            member.value = Some(f);
        }
        Ok(())
    }

    /// Runs `decorators` over the member `key`, the last one first, and defines the result.
    pub fn decorate(self: &Arc<Self>, key: &str, decorators: &[Arc<dyn MemberDecorator>]) -> Result<(), DecorateError> {
        let mut descriptor = self.descriptor(key).ok_or_else(|| DecorateError::missing_member(&self.name, key))?;
        if descriptor.value.is_some() || descriptor.initializer.is_some() {
            descriptor.writable = true;
        }

        for decorator in decorators.iter().rev() {
            descriptor = decorator.decorate(self, key, descriptor)?;
        }

        self.define_property(key, descriptor)
    }

    pub fn instantiate(self: &Arc<Self>, fields: Map<String, Value>) -> Arc<Object> {
        Arc::new(Object {
            class: Arc::clone(self),
            fields: RwLock::new(fields),
            bound: Mutex::new(HashMap::new()),
        })
    }

    pub fn new_object(self: &Arc<Self>) -> Arc<Object> {
        self.instantiate(Map::new())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class").field("name", &self.name).field("members", &self.members()).finish()
    }
}

/// Defines a class from methods and the decorators written above them.
#[must_use]
pub struct ClassBuilder {
    name: String,
    methods: Vec<(String, Function)>,
    decorators: Vec<(String, Arc<dyn MemberDecorator>)>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), methods: Vec::new(), decorators: Vec::new() }
    }

    pub fn method(mut self, key: impl Into<String>, f: Function) -> Self {
        self.methods.push((key.into(), f));
        self
    }

    /// Adds a decorator to the member `key`. Decorators of one member are listed top to
    /// bottom and applied bottom to top.
    pub fn decorator<D: MemberDecorator + 'static>(mut self, key: impl Into<String>, decorator: D) -> Self {
        self.decorators.push((key.into(), Arc::new(decorator)));
        self
    }

    /// a method together with its decorators, listed top to bottom
    pub fn decorated<I>(mut self, key: impl Into<String>, f: Function, decorators: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn MemberDecorator>>,
    {
        let key = key.into();
        self.decorators.extend(decorators.into_iter().map(|decorator| (key.clone(), decorator)));
        self.methods.push((key, f));
        self
    }

    pub fn build(self) -> Result<Arc<Class>, DecorateError> {
        let class = Class::new(self.name);
        for (key, f) in &self.methods {
            class.define_property(key, PropertyDescriptor::method(f.clone()))?;
        }

        let mut pending: Vec<(String, Vec<Arc<dyn MemberDecorator>>)> = Vec::new();
        for (key, decorator) in self.decorators {
            match pending.iter_mut().find(|(pending_key, _)| *pending_key == key) {
                Some((_, decorators)) => decorators.push(decorator),
                None => pending.push((key, vec![decorator])),
            }
        }

        for (key, decorators) in &pending {
            class.decorate(key, decorators)?;
        }

        Ok(class)
    }
}

impl fmt::Debug for ClassBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("name", &self.name)
            .field("methods", &self.methods.iter().map(|(key, _)| key).collect::<Vec<_>>())
            .field("decorators", &self.decorators.len())
            .finish()
    }
}

/// An instance of a [`Class`], usable as the receiver of its methods.
pub struct Object {
    class: Arc<Class>,
    fields: RwLock<Map<String, Value>>,
    bound: Mutex<HashMap<FunctionId, WeakFunction>>,
}

impl Object {
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        read(&self.fields).get(name).cloned()
    }

    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        write(&self.fields).insert(name.into(), value.into());
    }

    pub fn with_fields<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        f(&mut write(&self.fields))
    }

    /// Looks a method up the way `obj.key` would, running getters against this instance.
    pub fn method(self: &Arc<Self>, key: &str) -> Result<Function, DecorateError> {
        let descriptor =
            self.class.descriptor(key).ok_or_else(|| DecorateError::missing_member(self.class.name(), key))?;

        match (descriptor.get, descriptor.value) {
            (Some(get), _) => get(self),
            (None, Some(value)) => Ok(value),
            (None, None) => Err(DecorateError::missing_member(self.class.name(), key)),
        }
    }

    /// `obj.key(args...)`
    pub fn invoke(self: &Arc<Self>, key: &str, args: Vec<Value>) -> Result<micro_wrap::Output, DecorateError> {
        let f = self.method(key)?;
        Ok(self.call(&f, args)?)
    }

    /// calls `f` with this instance as its receiver
    pub fn call(self: &Arc<Self>, f: &Function, args: Vec<Value>) -> CallResult {
        let this: This = Arc::clone(self) as This;
        f.call(Invocation::from_parts(Some(this), args))
    }

    /// The per-instance bound version of `f`, created by `bind` on first access.
    ///
    /// The cache only holds weak handles, a bound function owns its instance. Once every
    /// handed-out copy is dropped the next access binds again.
    pub(crate) fn bound(&self, f: &Function, bind: impl FnOnce() -> Function) -> Function {
        let mut cache = lock(&self.bound);
        if let Some(bound) = cache.get(&f.id()).and_then(WeakFunction::upgrade) {
            return bound;
        }
        let bound = bind();
        cache.insert(f.id(), bound.downgrade());
        bound
    }
}

impl Receiver for Object {
    fn property(&self, name: &str) -> Option<Value> {
        self.field(name)
    }

    fn snapshot(&self) -> Value {
        Value::Object(read(&self.fields).clone())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("class", &self.class.name).field("fields", &*read(&self.fields)).finish()
    }
}

/// Defines `key` on `class` as a non-writable, non-configurable member holding `f`, with
/// the given enumerability.
pub fn enumerable(class: &Class, key: &str, is_enumerable: bool, f: Function) -> Result<Function, DecorateError> {
    class.define_property(
        key,
        PropertyDescriptor { value: Some(f.clone()), enumerable: is_enumerable, ..PropertyDescriptor::default() },
    )?;
    Ok(f)
}

/// Defines `key` on `class` as a member holding `f` that can be neither assigned nor redefined.
pub fn readonly(class: &Class, key: &str, f: Function) -> Result<Function, DecorateError> {
    class.define_property(key, PropertyDescriptor { value: Some(f.clone()), ..PropertyDescriptor::default() })?;
    Ok(f)
}
