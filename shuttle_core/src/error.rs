use thiserror::Error;

pub type MarshalResult<T> = Result<T, MarshalError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarshalError {
    /// The codec could not encode a compound value.
    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    /// The codec could not rebuild a compound value from its stored bytes.
    #[error("Unserialization failed: {reason}")]
    Deserialization { reason: String },

    #[error("Class '{name}' not found")]
    TypeLookup { name: String },

    #[error("Failed to instantiate object from class '{class}': {reason}")]
    Instantiation { class: String, reason: String },

    #[error("Failed to register '{name}' in the function table: {reason}")]
    Registration { name: String, reason: String },

    #[error("Object of class '{class}' carries no message queue handle")]
    DetachedHandle { class: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MarshalError {
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization { reason: reason.into() }
    }

    pub fn deserialization(reason: impl Into<String>) -> Self {
        Self::Deserialization { reason: reason.into() }
    }

    pub fn type_lookup(name: &str) -> Self {
        Self::TypeLookup { name: name.to_string() }
    }

    pub fn instantiation(class: &str, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            class: class.to_string(),
            reason: reason.into(),
        }
    }

    pub fn registration(name: &str, reason: impl Into<String>) -> Self {
        Self::Registration {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn detached_handle(class: &str) -> Self {
        Self::DetachedHandle { class: class.to_string() }
    }

    /// True for the codec failures in either direction.
    pub fn is_codec_failure(&self) -> bool {
        matches!(
            self,
            MarshalError::Serialization { .. } | MarshalError::Deserialization { .. }
        )
    }
}
