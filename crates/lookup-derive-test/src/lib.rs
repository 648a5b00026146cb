#[cfg(test)]
mod tests {
    use lookup_core::{EntryMarker, EntryRequirements, Object, Registry, TypeKey};
    use lookup_derive::entry;

    /// Helper function to ensure a type implements EntryMarker
    fn has_impl_marker<T: EntryMarker>() {}

    /// Helper function to ensure a type satisfies the entry requirements
    fn has_requirements<T: EntryRequirements>() {}

    /// Test `entry` attribute and `EntryMarker` derive macros for simple structs
    #[test]
    fn entry_marker_derive() {
        // Using `entry` attribute macro
        #[entry]
        struct TestEntryA;

        // Using `entry` attribute macro with existing derive
        // The `#[entry]` macro will duplicate derives if after any `#derive(...)]`
        #[entry]
        #[derive(Clone)]
        struct TestEntryB(String, Vec<u128>);

        // Using `EntryMarker` derive macro
        #[derive(Clone, PartialEq, Eq, Hash, Debug, lookup_derive::EntryMarker)]
        struct TestEntryC {
            x: u8,
            y: u8,
        }

        has_impl_marker::<TestEntryA>();
        has_impl_marker::<TestEntryB>();
        has_impl_marker::<TestEntryC>();
        has_requirements::<TestEntryC>();

        // Without a declared parent every entry sits directly under `Object`
        assert_eq!(TestEntryA::_parent(), Some(TypeKey::of::<Object>()));
        let parent = TestEntryC { x: 1, y: 2 }._into_parent().unwrap();
        assert!(parent.is::<Object>());
        let object = parent.downcast::<Object>().unwrap();
        assert_eq!(
            object.downcast_ref::<TestEntryC>(),
            Some(&TestEntryC { x: 1, y: 2 })
        );
    }

    /// Test `entry` attribute and `EntryMarker` derive macros with generics
    #[test]
    fn generic_marker_derive() {
        // Using `entry` attribute macro
        #[entry]
        struct GenericEntry<T>(T);
        has_impl_marker::<GenericEntry<u128>>();
        has_impl_marker::<GenericEntry<String>>();

        // This should fail to compile if uncommented, as GenericType does not implement EntryRequirements
        //struct GenericType;
        //has_impl_marker::<GenericEntry<GenericType>>();

        // Using `EntryMarker` derive macro
        #[derive(Clone, PartialEq, Eq, Hash, Debug, lookup_derive::EntryMarker)]
        struct GenericEntry2<T>(T);
        has_impl_marker::<GenericEntry2<u128>>();
        has_impl_marker::<GenericEntry2<String>>();

        // Each instantiation is its own type
        assert_ne!(
            TypeKey::of::<GenericEntry<u8>>(),
            TypeKey::of::<GenericEntry<u16>>()
        );
    }

    #[entry]
    struct Animal(String);

    #[entry(parent = Animal)]
    struct Mustelid(String);

    #[derive(Clone, PartialEq, Eq, Hash, Debug, lookup_derive::EntryMarker)]
    #[parent(Mustelid)]
    struct Ferret(String);

    impl From<Mustelid> for Animal {
        fn from(value: Mustelid) -> Self {
            Animal(value.0)
        }
    }

    impl From<Ferret> for Mustelid {
        fn from(value: Ferret) -> Self {
            Mustelid(value.0)
        }
    }

    /// Test declaring parents with both macros
    #[test]
    fn parent_chain() {
        assert_eq!(Mustelid::_parent(), Some(TypeKey::of::<Animal>()));
        assert_eq!(Ferret::_parent(), Some(TypeKey::of::<Mustelid>()));

        let ferret = TypeKey::of::<Ferret>();
        assert!(ferret.is_subtype_of(&TypeKey::of::<Animal>()));
        assert!(ferret.is_subtype_of(&TypeKey::of::<Object>()));
        assert!(!TypeKey::of::<Animal>().is_subtype_of(&ferret));
        assert_eq!(
            ferret.ancestors().collect::<Vec<_>>(),
            vec![
                TypeKey::of::<Ferret>(),
                TypeKey::of::<Mustelid>(),
                TypeKey::of::<Animal>(),
                TypeKey::of::<Object>(),
            ]
        );

        let parent = Ferret("Jill".to_string())._into_parent().unwrap();
        assert_eq!(
            parent.downcast::<Mustelid>(),
            Some(Mustelid("Jill".to_string()))
        );
    }

    /// Test derived entries stored in a registry and read through their ancestors
    #[test]
    fn registry_hierarchy() {
        let lookup = Registry::new();
        lookup.view::<Ferret>().add(Ferret("Jill".to_string())).unwrap();
        lookup.view::<Mustelid>().add(Mustelid("Stoat".to_string())).unwrap();
        lookup.view::<Animal>().add(Animal("Badger".to_string())).unwrap();

        assert_eq!(lookup.view::<Ferret>().size(), 1);
        assert_eq!(lookup.view::<Mustelid>().size(), 2);
        assert_eq!(lookup.view::<Animal>().size(), 3);

        let mut animals = lookup.view::<Animal>().list();
        animals.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            animals,
            vec![
                Animal("Badger".to_string()),
                Animal("Jill".to_string()),
                Animal("Stoat".to_string()),
            ]
        );

        // The root sees each value as the type it was stored as
        let objects = lookup.view::<Object>().list();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects.iter().filter(|object| object.is::<Ferret>()).count(), 1);
        assert_eq!(objects.iter().filter(|object| object.is::<Mustelid>()).count(), 1);
        assert_eq!(objects.iter().filter(|object| object.is::<Animal>()).count(), 1);
        assert!(objects.contains(&Object::new(Ferret("Jill".to_string()))));
    }
}
