use thiserror::Error;

/// Error type for `Registry` and `View` operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Deregistering a listener that has no registration under the exact type
    #[error("listener is not registered for type `{type_name}`")]
    NotFound { type_name: &'static str },
    /// Stored state whose runtime type disagrees with the key it is stored under
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),
}

pub type Result<T, E = LookupError> = std::result::Result<T, E>;
