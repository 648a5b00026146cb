use crate::{markers::EntryMarker, TypeKey};
use std::{
    any::Any,
    fmt::Debug,
    hash::{Hash, Hasher},
    path::PathBuf,
};

/// Used to wrap any passed hashers to support `Entry::_hash_entry()`
// ----------------------------------------------------------
struct EntryHasher<'a>(&'a mut dyn Hasher);

impl<'a> Hasher for EntryHasher<'a> {
    fn finish(&self) -> u64 {
        self.0.finish()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes)
    }
}
// ----------------------------------------------------------

/// Object safe view of an `EntryMarker` type, allowing values of different types to share storage
pub trait Entry: Send + Sync + Debug + Any + 'static {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
    fn type_key(&self) -> TypeKey;
    fn _clone_entry(&self) -> Box<dyn Entry>;
    fn _partial_equals_entry(&self, other: &dyn Any) -> bool;
    fn _hash_entry(&self, state: &mut dyn Hasher);
    fn _into_parent_entry(self: Box<Self>) -> Option<ErasedEntry>;
}

// Blanket implementation for all entry types
impl<T: EntryMarker> Entry for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn _clone_entry(&self) -> Box<dyn Entry> {
        Box::new(self.clone())
    }

    fn _partial_equals_entry(&self, other: &dyn Any) -> bool {
        if let Some(other) = other.downcast_ref::<T>() {
            self == other
        } else {
            false
        }
    }

    fn _hash_entry(&self, state: &mut dyn Hasher) {
        let mut wrapper = EntryHasher(state);
        std::any::type_name::<T>().hash(&mut wrapper);
        self.hash(&mut wrapper);
    }

    fn _into_parent_entry(self: Box<Self>) -> Option<ErasedEntry> {
        (*self)._into_parent()
    }
}

/// A type erased entry value. Equality and hashing consider both the concrete type and the value.
pub struct ErasedEntry(Box<dyn Entry>);

impl ErasedEntry {
    pub fn new<T: EntryMarker>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn type_key(&self) -> TypeKey {
        self.0.type_key()
    }

    pub fn is<T: EntryMarker>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: EntryMarker>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Takes the value back out as `T`, `None` if the stored value is of another type
    pub fn downcast<T: EntryMarker>(self) -> Option<T> {
        self.0.into_any().downcast::<T>().ok().map(|value| *value)
    }

    /// Converts the value into its declared parent type, `None` at the root
    pub fn into_parent(self) -> Option<ErasedEntry> {
        self.0._into_parent_entry()
    }
}

impl Clone for ErasedEntry {
    fn clone(&self) -> Self {
        Self(self.0._clone_entry())
    }
}

impl PartialEq for ErasedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0._partial_equals_entry(other.0.as_any())
    }
}

impl Eq for ErasedEntry {}

impl Hash for ErasedEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0._hash_entry(state);
    }
}

impl Debug for ErasedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

/// Root of the entry hierarchy. Any entry converts into an `Object`, so a view over
/// `Object` observes every value held by a registry.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Object(ErasedEntry);

impl Object {
    pub fn new<T: EntryMarker>(value: T) -> Self {
        Self(ErasedEntry::new(value))
    }

    /// Key of the wrapped value's concrete type
    pub fn inner_type(&self) -> TypeKey {
        self.0.type_key()
    }

    pub fn is<T: EntryMarker>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: EntryMarker>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn into_inner(self) -> ErasedEntry {
        self.0
    }
}

impl From<ErasedEntry> for Object {
    fn from(entry: ErasedEntry) -> Self {
        Self(entry)
    }
}

impl EntryMarker for Object {
    fn _parent() -> Option<TypeKey> {
        None
    }

    fn _into_parent(self) -> Option<ErasedEntry> {
        None
    }
}

/// Implements `EntryMarker` with `Object` as the parent
macro_rules! object_entries {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EntryMarker for $ty {
                fn _parent() -> Option<TypeKey> {
                    Some(TypeKey::of::<Object>())
                }

                fn _into_parent(self) -> Option<ErasedEntry> {
                    Some(ErasedEntry::new(Object::new(self)))
                }
            }
        )*
    };
}

object_entries!(
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    PathBuf,
);

#[cfg(test)]
mod tests {
    use super::{ErasedEntry, Object};
    use crate::TypeKey;
    use std::hash::{DefaultHasher, Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn erased_equality() {
        assert_eq!(ErasedEntry::new(7u32), ErasedEntry::new(7u32));
        assert_ne!(ErasedEntry::new(7u32), ErasedEntry::new(8u32));
        // Same numeric value, different concrete type
        assert_ne!(ErasedEntry::new(7u32), ErasedEntry::new(7u64));
        assert_ne!(
            ErasedEntry::new(String::from("Badger")),
            ErasedEntry::new("Badger")
        );
    }

    #[test]
    fn erased_hash() {
        assert_eq!(
            hash_of(&ErasedEntry::new(String::from("Stoat"))),
            hash_of(&ErasedEntry::new(String::from("Stoat")))
        );
        assert_ne!(
            hash_of(&ErasedEntry::new(String::from("Stoat"))),
            hash_of(&ErasedEntry::new(String::from("Weasel")))
        );
        assert_ne!(hash_of(&ErasedEntry::new(1u8)), hash_of(&ErasedEntry::new(1i8)));
    }

    #[test]
    fn erased_clone_and_downcast() {
        let entry = ErasedEntry::new(String::from("Ferret"));
        let cloned = entry.clone();
        assert_eq!(entry, cloned);
        assert!(cloned.is::<String>());
        assert!(!cloned.is::<u8>());
        assert_eq!(cloned.downcast_ref::<String>().map(String::as_str), Some("Ferret"));
        assert_eq!(entry.clone().downcast::<u8>(), None);
        assert_eq!(entry.downcast::<String>(), Some(String::from("Ferret")));
    }

    #[test]
    fn erased_type_key() {
        assert_eq!(ErasedEntry::new(1i64).type_key(), TypeKey::of::<i64>());
        assert_eq!(
            ErasedEntry::new(Object::new(1i64)).type_key(),
            TypeKey::of::<Object>()
        );
    }

    #[test]
    fn into_parent() {
        let parent = ErasedEntry::new(42usize).into_parent().unwrap();
        assert_eq!(parent.type_key(), TypeKey::of::<Object>());
        let object = parent.downcast::<Object>().unwrap();
        assert!(object.is::<usize>());
        assert_eq!(object.downcast_ref::<usize>(), Some(&42));
        assert_eq!(object.inner_type(), TypeKey::of::<usize>());
        assert!(ErasedEntry::new(object).into_parent().is_none());
    }

    #[test]
    fn debug() {
        assert_eq!(format!("{:?}", ErasedEntry::new(3u8)), "3");
        assert_eq!(
            format!("{:?}", Object::new(String::from("Weasel"))),
            "Object(\"Weasel\")"
        );
    }
}
