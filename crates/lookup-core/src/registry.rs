use crate::{
    listener::{Batch, ErasedListener},
    markers::EntryMarker,
    CountedMultiset, ErasedEntry, Listener, LookupConfig, LookupError, Result, TypeKey, View,
};
use parking_lot::ReentrantMutex;
use std::{any::Any, cell::RefCell, collections::HashMap, sync::Arc};

/// Type erased `CountedMultiset` holding the values stored under one `TypeKey`
pub(crate) trait Bag: Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn size(&self) -> usize;
    fn erased(&self) -> Vec<ErasedEntry>;
    fn first_erased(&self) -> Option<ErasedEntry>;
}

impl<T: EntryMarker> Bag for CountedMultiset<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn size(&self) -> usize {
        CountedMultiset::size(self)
    }

    fn erased(&self) -> Vec<ErasedEntry> {
        self.list().into_iter().map(ErasedEntry::new).collect()
    }

    fn first_erased(&self) -> Option<ErasedEntry> {
        self.first().map(ErasedEntry::new)
    }
}

/// Values added and removed by one mutating call
pub(crate) struct Change<T> {
    pub additions: Vec<T>,
    pub removals: Vec<T>,
}

impl<T> Change<T> {
    pub fn added(additions: Vec<T>) -> Self {
        Self {
            additions,
            removals: Vec::new(),
        }
    }

    pub fn removed(removals: Vec<T>) -> Self {
        Self {
            additions: Vec::new(),
            removals,
        }
    }
}

#[derive(Default)]
struct State {
    listeners: HashMap<TypeKey, Vec<Arc<dyn ErasedListener>>>,
    values: HashMap<TypeKey, Box<dyn Bag>>,
}

impl State {
    /// Listeners registered on `key` and each of its ancestors, in registration order
    fn listeners_for(&self, key: &TypeKey) -> Vec<Arc<dyn ErasedListener>> {
        key.ancestors()
            .filter_map(|ancestor| self.listeners.get(&ancestor))
            .flatten()
            .cloned()
            .collect()
    }

    /// The multiset stored under `T`, created on first use when `create` is set
    fn bag_mut<T: EntryMarker>(&mut self, create: bool) -> Result<Option<&mut CountedMultiset<T>>> {
        let key = TypeKey::of::<T>();
        let bag = if create {
            Some(
                self.values
                    .entry(key)
                    .or_insert_with(|| Box::new(CountedMultiset::<T>::new()) as Box<dyn Bag>),
            )
        } else {
            self.values.get_mut(&key)
        };
        match bag {
            Some(bag) => bag
                .as_any_mut()
                .downcast_mut::<CountedMultiset<T>>()
                .map(Some)
                .ok_or_else(|| {
                    LookupError::Inconsistent(format!(
                        "values stored under `{}` are not of that type",
                        key.name()
                    ))
                }),
            None => Ok(None),
        }
    }

    /// Stored multisets whose type is `target` or one of its subtypes
    fn subtypes_of<'a>(
        &'a self,
        target: &'a TypeKey,
    ) -> impl Iterator<Item = (&'a TypeKey, &'a dyn Bag)> + 'a {
        self.values
            .iter()
            .filter(move |(key, _)| key.is_subtype_of(target))
            .map(|(key, bag)| (key, &**bag as &dyn Bag))
    }

    fn collect<T: EntryMarker>(&self) -> Vec<T> {
        let target = TypeKey::of::<T>();
        let mut results = Vec::new();
        for (key, bag) in self.subtypes_of(&target) {
            results.extend(
                bag.erased()
                    .into_iter()
                    .filter_map(|value| project_logged::<T>(key, value)),
            );
        }
        results
    }

    fn first<T: EntryMarker>(&self) -> Option<T> {
        let target = TypeKey::of::<T>();
        let first = self.subtypes_of(&target).find_map(|(key, bag)| {
            bag.first_erased()
                .and_then(|value| project_logged::<T>(key, value))
        });
        first
    }

    fn size(&self, target: &TypeKey) -> usize {
        self.subtypes_of(target).map(|(_, bag)| bag.size()).sum()
    }

    fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    fn entry_count(&self) -> usize {
        self.values.values().map(|bag| bag.size()).sum()
    }
}

fn project_logged<T: EntryMarker>(key: &TypeKey, value: ErasedEntry) -> Option<T> {
    let projected = key.project::<T>(value);
    if projected.is_none() {
        tracing::error!(
            stored = key.name(),
            target = std::any::type_name::<T>(),
            "stored value could not be converted to the view type"
        );
    }
    projected
}

struct Shared {
    config: LookupConfig,
    state: ReentrantMutex<RefCell<State>>,
}

/// In-process registry storing values keyed by their entry type.
///
/// Listeners registered on a type are notified of changes to that type and all of its subtypes.
/// Every operation holds one lock for its whole duration, including listener dispatch. The lock
/// is reentrant, so listeners may call back into the registry from the dispatching thread.
/// `Registry` is a cheap handle, clones share the same contents.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(guard) = self.shared.state.try_lock() else {
            return f
                .debug_struct("Registry")
                .field("state", &"<locked>")
                .finish();
        };
        let result = match guard.try_borrow() {
            Ok(state) => f
                .debug_struct("Registry")
                .field("types", &state.values.len())
                .field("entries", &state.entry_count())
                .field("listeners", &state.listener_count())
                .finish(),
            Err(_) => f
                .debug_struct("Registry")
                .field("state", &"<updating>")
                .finish(),
        };
        result
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    pub fn with_config(config: impl Into<LookupConfig>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: config.into(),
                state: ReentrantMutex::new(RefCell::new(State::default())),
            }),
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.shared.config
    }

    /// Registers interest in `T` and its subtypes. Registering the same listener more than once
    /// records each registration, and each must be deregistered separately.
    pub fn register<T: EntryMarker>(&self, listener: Listener<T>) {
        let key = TypeKey::of::<T>();
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        let listeners = state.listeners.entry(key).or_default();
        listeners.push(Arc::new(listener));
        tracing::debug!(
            type_name = key.name(),
            registrations = listeners.len(),
            "registered listener"
        );
    }

    /// Removes one registration of `listener` under exactly `T`
    pub fn deregister<T: EntryMarker>(&self, listener: &Listener<T>) -> Result<()> {
        let key = TypeKey::of::<T>();
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        let listeners = state
            .listeners
            .get_mut(&key)
            .ok_or(LookupError::NotFound {
                type_name: key.name(),
            })?;
        let position = listeners
            .iter()
            .position(|registered| {
                registered
                    .as_any()
                    .downcast_ref::<Listener<T>>()
                    .is_some_and(|registered| registered.same(listener))
            })
            .ok_or(LookupError::NotFound {
                type_name: key.name(),
            })?;
        listeners.remove(position);
        tracing::debug!(
            type_name = key.name(),
            registrations = listeners.len(),
            "deregistered listener"
        );
        Ok(())
    }

    /// Returns a `View` over `T` and its subtypes. Views are cheap and interchangeable.
    pub fn view<T: EntryMarker>(&self) -> View<T> {
        View::new(self.clone())
    }

    /// Number of registrations under exactly `T`
    pub fn listener_count<T: EntryMarker>(&self) -> usize {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        state
            .listeners
            .get(&TypeKey::of::<T>())
            .map_or(0, Vec::len)
    }

    /// Applies `update` to the multiset of `T` and dispatches the resulting change, all under the lock.
    /// When `create` is unset and nothing is stored under `T`, `update` sees an empty multiset.
    pub(crate) fn update<T, R>(
        &self,
        create: bool,
        update: impl FnOnce(&mut CountedMultiset<T>, &LookupConfig) -> (R, Option<Change<T>>),
    ) -> Result<R>
    where
        T: EntryMarker,
    {
        let guard = self.shared.state.lock();
        let (result, dispatch) = {
            let mut state = guard.borrow_mut();
            let mut scratch = CountedMultiset::new();
            let bag = match state.bag_mut::<T>(create)? {
                Some(bag) => bag,
                None => &mut scratch,
            };
            let (result, change) = update(bag, &self.shared.config);
            let dispatch = change
                .map(|change| Batch::new(change.additions, change.removals))
                .filter(|batch| self.shared.config.notify_empty || !batch.is_empty())
                .map(|batch| {
                    let listeners = state.listeners_for(&batch.origin);
                    (batch, listeners)
                })
                .filter(|(_, listeners)| !listeners.is_empty());
            (result, dispatch)
        };
        if let Some((batch, listeners)) = dispatch {
            tracing::trace!(
                type_name = batch.origin.name(),
                listeners = listeners.len(),
                additions = batch.additions.len(),
                removals = batch.removals.len(),
                "dispatching change"
            );
            for listener in listeners.iter() {
                listener.notify(self, &batch);
            }
        }
        drop(guard);
        Ok(result)
    }

    /// Runs `read` against the current contents under the lock
    fn read<R>(&self, read: impl FnOnce(&State) -> R) -> R {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        read(&state)
    }

    pub(crate) fn collect<T: EntryMarker>(&self) -> Vec<T> {
        self.read(|state| state.collect::<T>())
    }

    pub(crate) fn first<T: EntryMarker>(&self) -> Option<T> {
        self.read(|state| state.first::<T>())
    }

    pub(crate) fn size<T: EntryMarker>(&self) -> usize {
        self.read(|state| state.size(&TypeKey::of::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Listener, LookupError, Registry};
    use std::sync::{Arc, Mutex};

    #[test]
    fn debug() {
        let registry = Registry::new();
        assert_eq!(
            format!("{:?}", registry),
            "Registry { types: 0, entries: 0, listeners: 0 }"
        );
        registry.register(Listener::<u8>::snapshot(|_: &[u8]| {}));
        registry.view::<u8>().add(1).unwrap();
        registry.view::<u8>().add(1).unwrap();
        registry.view::<String>().add(String::new()).unwrap();
        assert_eq!(
            format!("{:?}", registry),
            "Registry { types: 2, entries: 3, listeners: 1 }"
        );
    }

    #[test]
    fn debug_during_dispatch() {
        let registry = Registry::new();
        let inner = registry.clone();
        let seen = Arc::new(Mutex::new(String::new()));
        let recorded = seen.clone();
        registry.register(Listener::<u8>::snapshot(move |_: &[u8]| {
            *recorded.lock().unwrap() = format!("{:?}", inner);
        }));
        registry.view::<u8>().add(4).unwrap();
        // The state is not borrowed while listeners run
        assert_eq!(
            *seen.lock().unwrap(),
            "Registry { types: 1, entries: 1, listeners: 1 }"
        );
    }

    #[test]
    fn register_duplicates() {
        let registry = Registry::new();
        let listener = Listener::<String>::snapshot(|_: &[String]| {});
        registry.register(listener.clone());
        registry.register(listener.clone());
        assert_eq!(registry.listener_count::<String>(), 2);

        registry.deregister(&listener).unwrap();
        assert_eq!(registry.listener_count::<String>(), 1);
        registry.deregister(&listener).unwrap();
        assert_eq!(registry.listener_count::<String>(), 0);
        assert_eq!(
            registry.deregister(&listener),
            Err(LookupError::NotFound {
                type_name: std::any::type_name::<String>()
            })
        );
    }

    #[test]
    fn deregister_unknown() {
        let registry = Registry::new();
        let registered = Listener::<u32>::delta_fn(|_| {}, |_| {});
        let other = Listener::<u32>::delta_fn(|_| {}, |_| {});

        // No list exists for the type yet
        assert!(matches!(
            registry.deregister(&registered),
            Err(LookupError::NotFound { .. })
        ));

        registry.register(registered.clone());
        assert!(matches!(
            registry.deregister(&other),
            Err(LookupError::NotFound { .. })
        ));
        // Registrations under another type are unaffected
        let on_u64 = Listener::<u64>::delta_fn(|_| {}, |_| {});
        registry.register(on_u64.clone());
        registry.deregister(&registered).unwrap();
        assert_eq!(registry.listener_count::<u64>(), 1);
        assert_eq!(registry.listener_count::<u32>(), 0);
    }

    #[test]
    fn remove_does_not_create_storage() {
        let registry = Registry::new();
        assert!(!registry.view::<u16>().remove(3).unwrap());
        registry.view::<u16>().remove_all([1, 2]).unwrap();
        assert_eq!(
            format!("{:?}", registry),
            "Registry { types: 0, entries: 0, listeners: 0 }"
        );
        // Emptied storage persists
        registry.view::<u16>().add(3).unwrap();
        registry.view::<u16>().remove(3).unwrap();
        assert_eq!(
            format!("{:?}", registry),
            "Registry { types: 1, entries: 0, listeners: 0 }"
        );
    }

    #[test]
    fn clones_share_contents() {
        let registry = Registry::new();
        let clone = registry.clone();
        clone.view::<char>().add('x').unwrap();
        assert_eq!(registry.view::<char>().list(), vec!['x']);
        assert_eq!(registry.config(), clone.config());
    }
}
