//! Structured error types for axismap.
//!
//! Errors are reserved for programmer mistakes at the registration
//! boundary. Translation queries that miss return `None` instead, since
//! an unmapped visual or rendered position is an expected condition, not
//! a failure.

/// All errors that can occur while registering or updating index maps.
#[derive(Debug, thiserror::Error)]
pub enum AxismapError {
    /// A map with the same name is already registered. Registration never
    /// overwrites: silently replacing a map would corrupt the state of the
    /// feature that registered it first.
    #[error("map \"{0}\" is already registered")]
    DuplicateMap(String),

    /// No map is registered under the given name.
    #[error("no map registered under \"{0}\"")]
    UnknownMap(String),

    /// A value map was accessed with a payload type it does not hold.
    #[error("map \"{0}\" holds a different payload type")]
    PayloadType(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AxismapError>;
