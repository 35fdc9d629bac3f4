//! Name, kind and identity lookup of decorators.

use crate::config::ConfigArgs;
use crate::contextual::{BindMember, DeprecateMember, EnumerableMember, ReadonlyMember};
use crate::{ConfiguredDecorator, DecorateError, Decorator, DecoratorContext, MethodWrapper, decorator, to_decorator};
use micro_wrap::{
    Allow, Debounce, Defer, Delay, Deprecate, Function, Methodize, Repeat, This, Throttle, ThrottleOptions, Warnings,
    Wrapper, bind, multicast, multiset, reduce, spread, suppress_warnings,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The built-in wrappers that can act as decorators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    Allow,
    Bind,
    Debounce,
    Defer,
    Delay,
    Deprecate,
    Enumerable,
    Methodize,
    Multicast,
    Multiset,
    Once,
    Readonly,
    Reduce,
    Repeat,
    Spread,
    SuppressWarnings,
    Throttle,
}

impl WrapperKind {
    pub const ALL: [WrapperKind; 17] = [
        WrapperKind::Allow,
        WrapperKind::Bind,
        WrapperKind::Debounce,
        WrapperKind::Defer,
        WrapperKind::Delay,
        WrapperKind::Deprecate,
        WrapperKind::Enumerable,
        WrapperKind::Methodize,
        WrapperKind::Multicast,
        WrapperKind::Multiset,
        WrapperKind::Once,
        WrapperKind::Readonly,
        WrapperKind::Reduce,
        WrapperKind::Repeat,
        WrapperKind::Spread,
        WrapperKind::SuppressWarnings,
        WrapperKind::Throttle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WrapperKind::Allow => "allow",
            WrapperKind::Bind => "bind",
            WrapperKind::Debounce => "debounce",
            WrapperKind::Defer => "defer",
            WrapperKind::Delay => "delay",
            WrapperKind::Deprecate => "deprecate",
            WrapperKind::Enumerable => "enumerable",
            WrapperKind::Methodize => "methodize",
            WrapperKind::Multicast => "multicast",
            WrapperKind::Multiset => "multiset",
            WrapperKind::Once => "once",
            WrapperKind::Readonly => "readonly",
            WrapperKind::Reduce => "reduce",
            WrapperKind::Repeat => "repeat",
            WrapperKind::Spread => "spread",
            WrapperKind::SuppressWarnings => "suppress_warnings",
            WrapperKind::Throttle => "throttle",
        }
    }

    /// whether decorating with this kind needs the class, key or descriptor
    pub fn is_contextual(self) -> bool {
        matches!(self, WrapperKind::Bind | WrapperKind::Deprecate | WrapperKind::Enumerable | WrapperKind::Readonly)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for WrapperKind {
    type Err = DecorateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WrapperKind::ALL.into_iter().find(|kind| kind.name() == s).ok_or_else(|| DecorateError::unknown_wrapper(s))
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A built-in wrapper driven only by its JSON configuration.
#[derive(Debug, Clone)]
pub struct StandardWrapper {
    kind: WrapperKind,
    warnings: Warnings,
}

impl StandardWrapper {
    pub fn new(kind: WrapperKind, warnings: Warnings) -> Self {
        Self { kind, warnings }
    }

    pub fn kind(&self) -> WrapperKind {
        self.kind
    }

    /// wraps `f` the way `kind(config..., f)` would
    pub fn wrap(&self, config: &[Value], f: Function) -> Result<Function, DecorateError> {
        let args = ConfigArgs::new(self.kind.name(), config);
        let warnings = self.warnings.clone();

        let wrapped = match self.kind {
            WrapperKind::Allow => Allow::new(args.count(0)?).warnings(warnings).wrap(f),
            WrapperKind::Once => Allow::new(1).warnings(warnings).wrap(f),
            WrapperKind::Bind => {
                let receiver = config.first().map(|value| Arc::new(value.clone()) as This);
                bind(receiver, config.iter().skip(1).cloned().collect(), f)
            }
            WrapperKind::Debounce => Debounce::new(args.millis(0)?).immediate(args.flag_or(1, false)?).wrap(f),
            WrapperKind::Throttle => {
                let options: ThrottleOptions = args.parse_or_default(1)?;
                Throttle::new(args.millis(0)?).options(options).wrap(f)
            }
            WrapperKind::Delay => {
                let delay = Delay::new(args.millis(0)?);
                if args.flag_or(1, false)? { delay.promise().wrap(f) } else { delay.wrap(f) }
            }
            WrapperKind::Defer => {
                if args.flag_or(0, false)? { Defer::new().promise().wrap(f) } else { Defer::new().wrap(f) }
            }
            WrapperKind::Repeat => Repeat::new(args.count(0)?).every(args.millis_or(1, Duration::ZERO)?).wrap(f),
            WrapperKind::Methodize => {
                let names = args.strings()?;
                if names.is_empty() { Methodize::new().wrap(f) } else { Methodize::properties(names).wrap(f) }
            }
            WrapperKind::Deprecate => {
                let mut deprecate = Deprecate::new().warnings(warnings);
                if let Some(message) = args.string(0)? {
                    deprecate = deprecate.message(message);
                }
                if let Some(url) = args.string(1)? {
                    deprecate = deprecate.url(url);
                }
                deprecate.wrap(f)
            }
            WrapperKind::SuppressWarnings => suppress_warnings(&warnings, f),
            WrapperKind::Spread => spread(f),
            WrapperKind::Multicast => multicast(f),
            WrapperKind::Multiset => multiset(f),
            WrapperKind::Reduce => reduce(f),
            WrapperKind::Enumerable | WrapperKind::Readonly => f,
        };
        Ok(wrapped)
    }
}

impl MethodWrapper for StandardWrapper {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn apply(
        &self,
        _context: &mut DecoratorContext<'_>,
        config: &[Value],
        f: Function,
    ) -> Result<Option<Function>, DecorateError> {
        self.wrap(config, f).map(Some)
    }
}

/// The generic adapter, usable with any wrapper.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDecorator;

impl GenericDecorator {
    pub fn with(&self, wrapper: Arc<dyn MethodWrapper>, config: Vec<Value>) -> ConfiguredDecorator {
        decorator(wrapper, config)
    }
}

pub enum DecoratorRef<'a> {
    Generic,
    Name(&'a str),
    Kind(WrapperKind),
    Wrapper(Arc<dyn MethodWrapper>),
}

impl fmt::Debug for DecoratorRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoratorRef::Generic => f.write_str("Generic"),
            DecoratorRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
            DecoratorRef::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            DecoratorRef::Wrapper(wrapper) => f.debug_tuple("Wrapper").field(&wrapper.name()).finish(),
        }
    }
}

#[derive(Debug)]
pub enum Resolved {
    Generic(GenericDecorator),
    Decorator(Decorator),
}

impl Resolved {
    pub fn into_decorator(self) -> Option<Decorator> {
        match self {
            Resolved::Decorator(decorator) => Some(decorator),
            Resolved::Generic(_) => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Resolved::Generic(_))
    }
}

struct Entry {
    wrapper: Arc<dyn MethodWrapper>,
    contextual: Option<Arc<dyn MethodWrapper>>,
}

impl Entry {
    fn decorator(&self) -> Decorator {
        to_decorator(Arc::clone(self.contextual.as_ref().unwrap_or(&self.wrapper)))
    }
}

/// The wrappers available as decorators, sharing one warning channel.
///
/// `observable` and `promisify` are absent: neither produces a plain member function.
pub struct Registry {
    warnings: Warnings,
    builtins: Vec<Entry>,
    custom: HashMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// the plain wrapper of a built-in kind, the handle [`DecoratorRef::Wrapper`] recognizes
    pub fn wrapper(&self, kind: WrapperKind) -> Arc<dyn MethodWrapper> {
        Arc::clone(&self.builtins[kind.index()].wrapper)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn MethodWrapper>> {
        self.entry(name).map(|entry| Arc::clone(&entry.wrapper))
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        match name.parse::<WrapperKind>() {
            Ok(kind) if kind.is_contextual() => Some(&self.builtins[kind.index()]),
            Ok(kind) => self.custom.get(name).or(Some(&self.builtins[kind.index()])),
            Err(_) => self.custom.get(name),
        }
    }

    pub fn get_decorator(&self, lookup: DecoratorRef<'_>) -> Result<Resolved, DecorateError> {
        match lookup {
            DecoratorRef::Generic | DecoratorRef::Name("decorator") => Ok(Resolved::Generic(GenericDecorator)),
            DecoratorRef::Name(name) => self
                .entry(name)
                .map(|entry| Resolved::Decorator(entry.decorator()))
                .ok_or_else(|| DecorateError::unknown_wrapper(name)),
            DecoratorRef::Kind(kind) => self.get_decorator(DecoratorRef::Name(kind.name())),
            DecoratorRef::Wrapper(wrapper) => {
                let known = self
                    .builtins
                    .iter()
                    .chain(self.custom.values())
                    .find(|entry| Arc::ptr_eq(&entry.wrapper, &wrapper));
                match known {
                    Some(entry) => Ok(Resolved::Decorator(entry.decorator())),
                    None => {
                        debug!(wrapper = wrapper.name(), "adapting an unregistered wrapper");
                        Ok(Resolved::Decorator(to_decorator(wrapper)))
                    }
                }
            }
        }
    }

    /// `get_decorator(Name(name))` for callers that want the decorator itself
    pub fn decorator(&self, name: &str) -> Result<Decorator, DecorateError> {
        self.entry(name).map(Entry::decorator).ok_or_else(|| DecorateError::unknown_wrapper(name))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("warnings", &self.warnings)
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[must_use]
pub struct RegistryBuilder {
    warnings: Option<Warnings>,
    custom: Vec<(String, Arc<dyn MethodWrapper>)>,
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("warnings", &self.warnings)
            .field("custom", &self.custom.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish()
    }
}

impl RegistryBuilder {
    fn new() -> Self {
        Self { warnings: None, custom: Vec::new() }
    }

    /// the channel every warning wrapper of this registry reports to
    pub fn warnings(mut self, warnings: Warnings) -> Self {
        self.warnings = Some(warnings);
        self
    }

    /// Registers a wrapper under `name`. It shadows a built-in of the same name unless that
    /// built-in is context-aware.
    pub fn register(mut self, name: impl Into<String>, wrapper: Arc<dyn MethodWrapper>) -> Self {
        self.custom.push((name.into(), wrapper));
        self
    }

    pub fn build(self) -> Registry {
        let warnings = self.warnings.unwrap_or_default();

        let builtins = WrapperKind::ALL
            .into_iter()
            .map(|kind| {
                let wrapper: Arc<dyn MethodWrapper> = Arc::new(StandardWrapper::new(kind, warnings.clone()));
                let contextual: Option<Arc<dyn MethodWrapper>> = match kind {
                    WrapperKind::Bind => Some(Arc::new(BindMember)),
                    WrapperKind::Deprecate => Some(Arc::new(DeprecateMember::new(warnings.clone()))),
                    WrapperKind::Enumerable => Some(Arc::new(EnumerableMember)),
                    WrapperKind::Readonly => Some(Arc::new(ReadonlyMember)),
                    _ => None,
                };
                Entry { wrapper, contextual }
            })
            .collect();

        let custom = self
            .custom
            .into_iter()
            .map(|(name, wrapper)| (name, Entry { wrapper, contextual: None }))
            .collect();

        Registry { warnings, builtins, custom }
    }
}
