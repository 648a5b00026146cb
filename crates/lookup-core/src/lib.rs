// map `self` to `lookup_core` allowing the use of derive macros that use `::lookup_core::..`
extern crate self as lookup_core;
mod config;
mod debug;
mod entry;
mod error;
mod listener;
mod markers;
mod multiset;
mod registry;
mod type_key;
mod view;

pub use config::LookupConfig;
pub use config::RemovalBatch;
pub use debug::SliceDebug;
pub use entry::Entry;
pub use entry::ErasedEntry;
pub use entry::Object;
pub use error::LookupError;
pub use error::Result;
pub use listener::DeltaListener;
pub use listener::Listener;
pub use listener::SnapshotListener;
pub use lookup_derive::entry;
pub use lookup_derive::EntryMarker;
pub use markers::EntryMarker;
pub use markers::EntryRequirements;
pub use multiset::CountedMultiset;
pub use registry::Registry;
pub use type_key::Ancestors;
pub use type_key::TypeKey;
pub use view::View;
