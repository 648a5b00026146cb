use crate::{ErasedEntry, TypeKey};

mod sealed {
    /// Private marker trait ensures all required traits are impl'd while users only need to impl their desired mark
    pub trait EntryRequirements:
        'static
        + Send
        + Sync
        + Clone
        + Eq
        + std::any::Any
        + std::fmt::Debug
        + std::hash::Hash
    {
    }
}

/// Bound required of every value stored in a `Registry`, and of the generic parameters of derived entries
pub trait EntryRequirements: sealed::EntryRequirements {}
impl<
        T: 'static
            + Send
            + Sync
            + Clone
            + Eq
            + std::any::Any
            + std::fmt::Debug
            + std::hash::Hash,
    > sealed::EntryRequirements for T
{
}
impl<T: sealed::EntryRequirements> EntryRequirements for T {}

/// `EntryMarker` places a type in the entry hierarchy and should be derived for each entry type.
///
/// `_parent` names the declared supertype, `None` only for the root `Object`.
/// `_into_parent` converts a value into that supertype, which is how a view over a
/// base type sees the values stored under its subtypes.
pub trait EntryMarker: EntryRequirements {
    fn _parent() -> Option<TypeKey>;
    fn _into_parent(self) -> Option<ErasedEntry>;
}
