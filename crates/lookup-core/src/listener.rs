use crate::{markers::EntryMarker, ErasedEntry, Registry, TypeKey};
use std::{any::Any, fmt::Debug, marker::PhantomData, sync::Arc};

/// Receives the full contents of the registered type whenever it, or any of its subtypes, change
pub trait SnapshotListener<T>: Send + Sync + 'static {
    fn on_changed(&self, results: &[T]);
}
impl<T, F> SnapshotListener<T> for F
where
    F: Fn(&[T]) + Send + Sync + 'static,
{
    fn on_changed(&self, results: &[T]) {
        self(results)
    }
}

/// Receives only the values added or removed by each change.
/// Each method is only called with a non-empty batch.
pub trait DeltaListener<T>: Send + Sync + 'static {
    fn on_added(&self, additions: &[T]);
    fn on_removed(&self, removals: &[T]);
}

/// `DeltaListener` built from a pair of closures
struct DeltaFns<T, A, R> {
    added: A,
    removed: R,
    _phantom: PhantomData<fn(&[T])>,
}

impl<T: 'static, A, R> DeltaListener<T> for DeltaFns<T, A, R>
where
    A: Fn(&[T]) + Send + Sync + 'static,
    R: Fn(&[T]) + Send + Sync + 'static,
{
    fn on_added(&self, additions: &[T]) {
        (self.added)(additions)
    }

    fn on_removed(&self, removals: &[T]) {
        (self.removed)(removals)
    }
}

/// A listener and the notification style it receives.
///
/// Clones share the same listener, and `deregister` matches on that shared identity.
pub enum Listener<T> {
    Snapshot(Arc<dyn SnapshotListener<T>>),
    Delta(Arc<dyn DeltaListener<T>>),
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Snapshot(listener) => Self::Snapshot(Arc::clone(listener)),
            Self::Delta(listener) => Self::Delta(Arc::clone(listener)),
        }
    }
}

/// Impl Debug manually as the listener traits don't require `Debug`
impl<T> Debug for Listener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot(_) => f.debug_tuple("Snapshot").field(&"<SnapshotListener>").finish(),
            Self::Delta(_) => f.debug_tuple("Delta").field(&"<DeltaListener>").finish(),
        }
    }
}

impl<T: 'static> Listener<T> {
    pub fn snapshot(listener: impl SnapshotListener<T>) -> Self {
        Self::Snapshot(Arc::new(listener))
    }

    pub fn delta(listener: impl DeltaListener<T>) -> Self {
        Self::Delta(Arc::new(listener))
    }

    /// Creates a delta listener from separate addition and removal callbacks
    pub fn delta_fn<A, R>(added: A, removed: R) -> Self
    where
        A: Fn(&[T]) + Send + Sync + 'static,
        R: Fn(&[T]) + Send + Sync + 'static,
    {
        Self::Delta(Arc::new(DeltaFns {
            added,
            removed,
            _phantom: PhantomData,
        }))
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, Self::Delta(_))
    }

    /// True if both handles refer to the same listener
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Snapshot(a), Self::Snapshot(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Self::Delta(a), Self::Delta(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl<T> From<Arc<dyn SnapshotListener<T>>> for Listener<T> {
    fn from(listener: Arc<dyn SnapshotListener<T>>) -> Self {
        Self::Snapshot(listener)
    }
}

impl<T> From<Arc<dyn DeltaListener<T>>> for Listener<T> {
    fn from(listener: Arc<dyn DeltaListener<T>>) -> Self {
        Self::Delta(listener)
    }
}

/// The values added and removed by one mutating call, stored as the mutated type `origin`
pub(crate) struct Batch {
    pub origin: TypeKey,
    pub additions: Vec<ErasedEntry>,
    pub removals: Vec<ErasedEntry>,
}

impl Batch {
    pub fn new<T: EntryMarker>(additions: Vec<T>, removals: Vec<T>) -> Self {
        Self {
            origin: TypeKey::of::<T>(),
            additions: additions.into_iter().map(ErasedEntry::new).collect(),
            removals: removals.into_iter().map(ErasedEntry::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Converts `values` to the listener's type `T`, an ancestor of `origin`
    fn project<T: EntryMarker>(&self, values: &[ErasedEntry]) -> Vec<T> {
        values
            .iter()
            .filter_map(|value| {
                let projected = self.origin.project::<T>(value.clone());
                if projected.is_none() {
                    tracing::error!(
                        origin = self.origin.name(),
                        target = std::any::type_name::<T>(),
                        "batch value could not be converted for listener"
                    );
                }
                projected
            })
            .collect()
    }
}

/// Type erased `Listener` as stored by the `Registry`
pub(crate) trait ErasedListener: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn notify(&self, registry: &Registry, batch: &Batch);
}

impl<T: EntryMarker> ErasedListener for Listener<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn notify(&self, registry: &Registry, batch: &Batch) {
        match self {
            Self::Snapshot(listener) => listener.on_changed(&registry.view::<T>().list()),
            Self::Delta(listener) => {
                let removals = batch.project::<T>(&batch.removals);
                if !removals.is_empty() {
                    listener.on_removed(&removals);
                }
                let additions = batch.project::<T>(&batch.additions);
                if !additions.is_empty() {
                    listener.on_added(&additions);
                }
            }
        }
    }
}
