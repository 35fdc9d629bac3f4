use micro_wrap::WrapError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecorateError {
    #[error("wrapper error: {source}")]
    Wrap {
        #[from]
        source: WrapError,
    },

    #[error("descriptor of `{key}` has no value, initializer, getter or setter")]
    NotADescriptor { key: String },

    #[error("`{class}` has no member `{key}`")]
    MissingMember { class: String, key: String },

    #[error("unknown wrapper `{name}`")]
    UnknownWrapper { name: String },

    #[error("invalid config for `{wrapper}`: {reason}")]
    InvalidConfig { wrapper: String, reason: String },

    #[error("`{class}#{key}` is not configurable")]
    NotConfigurable { class: String, key: String },

    #[error("`{class}#{key}` is read-only")]
    ReadOnly { class: String, key: String },

    #[error("the decorated class was dropped")]
    Dropped,
}

impl DecorateError {
    pub fn not_a_descriptor<S: ToString>(key: S) -> Self {
        Self::NotADescriptor { key: key.to_string() }
    }

    pub fn missing_member<C: ToString, K: ToString>(class: C, key: K) -> Self {
        Self::MissingMember { class: class.to_string(), key: key.to_string() }
    }

    pub fn unknown_wrapper<S: ToString>(name: S) -> Self {
        Self::UnknownWrapper { name: name.to_string() }
    }

    pub fn invalid_config<W: ToString, S: ToString>(wrapper: W, str: S) -> Self {
        Self::InvalidConfig { wrapper: wrapper.to_string(), reason: str.to_string() }
    }

    pub fn not_configurable<C: ToString, K: ToString>(class: C, key: K) -> Self {
        Self::NotConfigurable { class: class.to_string(), key: key.to_string() }
    }

    pub fn read_only<C: ToString, K: ToString>(class: C, key: K) -> Self {
        Self::ReadOnly { class: class.to_string(), key: key.to_string() }
    }
}

/// lets method bodies use `?` on member lookups
impl From<DecorateError> for WrapError {
    fn from(e: DecorateError) -> Self {
        match e {
            DecorateError::Wrap { source } => source,
            other => WrapError::raised(other),
        }
    }
}
