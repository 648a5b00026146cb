use crate::{markers::EntryMarker, ErasedEntry, Object};
use std::{
    any::TypeId,
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
};

/// Runtime descriptor of an entry type and its link to the declared parent type.
///
/// Keys compare and hash by `TypeId` only, the remaining fields are derived from it.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    short_name: fn() -> String,
    parent: fn() -> Option<TypeKey>,
    upcast: fn(ErasedEntry) -> Option<ErasedEntry>,
}

/// Erased conversion of a `T` into its parent, `None` if `value` is not a `T` or `T` is the root
fn upcast<T: EntryMarker>(value: ErasedEntry) -> Option<ErasedEntry> {
    value.downcast::<T>()?._into_parent()
}

impl TypeKey {
    pub fn of<T: EntryMarker>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            short_name: tynm::type_name::<T>,
            parent: T::_parent,
            upcast: upcast::<T>,
        }
    }

    /// Full type path, eg. `alloc::string::String`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module paths, eg. `String`
    pub fn short_name(&self) -> String {
        (self.short_name)()
    }

    pub fn parent(&self) -> Option<TypeKey> {
        (self.parent)()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Walks from this key up through each declared parent, ending at the root
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(*self),
            seen: Vec::new(),
        }
    }

    /// True if `self` is `other` or has `other` somewhere in its ancestor chain
    pub fn is_subtype_of(&self, other: &TypeKey) -> bool {
        self.ancestors().any(|key| key == *other)
    }

    /// Converts `value`, stored under `self`, into the ancestor type `T` by walking the parent chain.
    /// `None` if `T` is not an ancestor or `value` does not match `self`.
    ///
    /// The root `Object` wraps the stored value itself, so its concrete type stays recoverable.
    pub(crate) fn project<T: EntryMarker>(&self, value: ErasedEntry) -> Option<T> {
        let target = TypeKey::of::<T>();
        if value.type_key() != *self {
            return None;
        }
        if target == TypeKey::of::<Object>() && *self != target {
            if !self.is_subtype_of(&target) {
                return None;
            }
            return ErasedEntry::new(Object::from(value)).downcast::<T>();
        }
        let mut value = value;
        for key in self.ancestors() {
            if key == target {
                return value.downcast::<T>();
            }
            value = (key.upcast)(value)?;
        }
        None
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Iterator over a key followed by each of its ancestors
pub struct Ancestors {
    next: Option<TypeKey>,
    seen: Vec<TypeId>,
}

impl Iterator for Ancestors {
    type Item = TypeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next.take()?;
        if self.seen.contains(&key.id) {
            tracing::error!(
                type_name = key.name,
                "cyclic entry hierarchy, stopping the ancestor walk"
            );
            return None;
        }
        self.seen.push(key.id);
        self.next = key.parent();
        Some(key)
    }
}
