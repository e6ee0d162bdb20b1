#[cfg(test)]
pub mod test {
    use crate::load::ValueMap;
    use crate::registry::{FlagDef, FlagRef, FlagSet};

    /// The declaration block most loader and usage tests start from: two
    /// defaulted scalars, a defaulted boolean, and two tri-state booleans.
    pub struct ServiceFlags {
        pub set: FlagSet,
        pub name1: FlagRef<String>,
        pub name2: FlagRef<i64>,
        pub name3: FlagRef<bool>,
        pub name4: FlagRef<Option<bool>>,
        pub name5: FlagRef<Option<bool>>,
    }

    impl ServiceFlags {
        pub fn new() -> Self {
            let mut set = FlagSet::new();
            let name1 = set
                .add(FlagDef::<String>::new("name1", "Set name1").default("ben folds"))
                .unwrap();
            let name2 = set
                .add(FlagDef::<i64>::new("name2", "Set name2").default(42))
                .unwrap();
            let name3 = set
                .add(FlagDef::<bool>::new("name3", "Set name3").default(false))
                .unwrap();
            let name4 = set
                .add_optional(FlagDef::<bool>::new("name4", "Set name4"))
                .unwrap();
            let name5 = set
                .add_optional(FlagDef::<bool>::new("name5", "Set name5"))
                .unwrap();
            Self {
                set,
                name1,
                name2,
                name3,
                name4,
                name5,
            }
        }
    }

    #[test]
    fn service_flags_start_at_their_defaults() {
        let fixture = ServiceFlags::new();
        assert_eq!(fixture.name1.get(), "ben folds");
        assert_eq!(fixture.name2.get(), 42);
        assert!(!fixture.name3.get());
        assert_eq!(fixture.name4.get(), None);
        assert_eq!(fixture.name5.get(), None);
        assert_eq!(fixture.set.len(), 6);
    }

    // -- Helpers for building sources -------------------------------------------

    pub fn value_map(entries: &[(&str, Option<&str>)]) -> ValueMap {
        entries
            .iter()
            .map(|&(name, value)| (name.to_string(), value.map(str::to_string)))
            .collect()
    }

    pub fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }
}
