use crate::{
    markers::EntryMarker, registry::Change, Registry, RemovalBatch, Result, TypeKey,
};
use std::marker::PhantomData;

/// Typed handle for changing and querying the values of `T` held by a `Registry`.
///
/// A view holds no state of its own, every view over `T` from the same registry operates on the
/// same values. Reads include the values of every subtype of `T`, mutations only touch `T`.
pub struct View<T> {
    registry: Registry,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: EntryMarker> std::fmt::Debug for View<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("type_key", &TypeKey::of::<T>())
            .finish()
    }
}

impl<T: EntryMarker> View<T> {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            registry,
            _phantom: PhantomData,
        }
    }

    pub fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn add(&self, value: T) -> Result<()> {
        self.registry.update(true, |values, _| {
            values.add(value.clone());
            ((), Some(Change::added(vec![value])))
        })
    }

    /// Removes one occurrence of `value`. Listeners are only notified if it was present.
    pub fn remove(&self, value: T) -> Result<bool> {
        self.registry.update(false, |values, _| {
            if values.remove(&value) {
                (true, Some(Change::removed(vec![value])))
            } else {
                (false, None)
            }
        })
    }

    /// Adds each value, duplicates included, notifying listeners once with all of them
    pub fn add_all(&self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let additions: Vec<T> = values.into_iter().collect();
        self.registry.update(true, |stored, _| {
            stored.extend(additions.iter().cloned());
            ((), Some(Change::added(additions)))
        })
    }

    /// Removes one occurrence of each value, ignoring values that are not present.
    /// The removals delivered to delta listeners follow the registry's `RemovalBatch` policy.
    pub fn remove_all(&self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let requested: Vec<T> = values.into_iter().collect();
        self.registry.update::<T, _>(false, |stored, config| {
            let effective: Vec<T> = requested
                .iter()
                .filter(|value| stored.remove(*value))
                .cloned()
                .collect();
            let removals = match config.removal_batch {
                RemovalBatch::Requested => requested,
                RemovalBatch::Effective => effective,
            };
            ((), Some(Change::removed(removals)))
        })
    }

    /// Replaces the values stored under `T` with `value` as one change
    pub fn replace_all_with(&self, value: T) -> Result<()> {
        self.replace_all_with_all(std::iter::once(value))
    }

    /// Replaces the values stored under `T` with `values`. Listeners are notified once, with the
    /// previous values as removals and the new values as additions, and never observe the
    /// intermediate empty state.
    pub fn replace_all_with_all(&self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let additions: Vec<T> = values.into_iter().collect();
        self.registry.update(true, |stored, _| {
            let removals = stored.list();
            stored.clear();
            stored.extend(additions.iter().cloned());
            (
                (),
                Some(Change {
                    additions,
                    removals,
                }),
            )
        })
    }

    /// Every value of `T` and its subtypes, in no particular order
    pub fn list(&self) -> Vec<T> {
        self.registry.collect::<T>()
    }

    /// Any one value of `T` or its subtypes, `None` if there are none
    pub fn first(&self) -> Option<T> {
        self.registry.first::<T>()
    }

    pub fn size(&self) -> usize {
        self.registry.size::<T>()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn contains(&self, value: &T) -> bool {
        self.list().contains(value)
    }
}
