//! Flag declaration and the descriptor table.
//!
//! A [`FlagSet`] owns one [`Flag`] descriptor per registered flag, in
//! registration order, plus an exact-match index over canonical names and
//! aliases. Descriptors are type-erased: each holds boxed setter, renderer,
//! and validator closures over an `Rc<RefCell<_>>` storage cell shared with
//! the [`FlagRef`] handed back at registration. The set is single-threaded;
//! declare and load flags on the thread that owns them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{FlagError, ValueError};
use crate::load::Warnings;
use crate::value::FlagValue;

/// An alternate name for a flag.
///
/// Active aliases behave exactly like the canonical name and show up in
/// usage text; deprecated aliases still load but produce a warning and are
/// left out of usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: String,
    deprecated: bool,
}

impl Alias {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }
}

/// A flag declaration, built fluently and handed to [`FlagSet::add`] or
/// [`FlagSet::add_optional`].
///
/// ```
/// use flagstone::{Duration, FlagDef};
///
/// let def = FlagDef::<Duration>::new("timeout", "Give up after this long")
///     .default(Duration::seconds(30))
///     .alias("deadline");
/// ```
pub struct FlagDef<T: FlagValue> {
    name: String,
    help: String,
    aliases: Vec<Alias>,
    default: Option<T>,
    validator: Option<Box<dyn Fn(&T) -> Result<(), String>>>,
}

impl<T: FlagValue> FlagDef<T> {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            aliases: Vec::new(),
            default: None,
            validator: None,
        }
    }

    /// The value the flag holds when no source assigns it. A flag registered
    /// through [`FlagSet::add`] without a default is required.
    pub fn default(mut self, value: impl Into<T>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Adds an active alias. Repeatable; aliases keep their declaration
    /// order in usage text.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(Alias {
            name: name.into(),
            deprecated: false,
        });
        self
    }

    /// Adds a deprecated alias: loading through it warns
    /// `Loaded deprecated flag '<alias>'` and usage text omits it.
    pub fn deprecated_alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(Alias {
            name: name.into(),
            deprecated: true,
        });
        self
    }

    /// Validates every freshly assigned value. An `Err` message aborts the
    /// load and is surfaced to the caller verbatim.
    pub fn validator(mut self, validate: impl Fn(&T) -> Result<(), String> + 'static) -> Self {
        self.validator = Some(Box::new(validate));
        self
    }
}

/// A cheap handle to a flag's typed storage cell.
///
/// Cloning shares the cell. `get` clones the current value, so reads after
/// a successful load see whatever the highest-precedence source assigned.
pub struct FlagRef<S> {
    cell: Rc<RefCell<S>>,
}

impl<S: Clone> FlagRef<S> {
    pub fn get(&self) -> S {
        self.cell.borrow().clone()
    }
}

impl<S> Clone for FlagRef<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for FlagRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FlagRef").field(&self.cell.borrow()).finish()
    }
}

type Setter = Box<dyn Fn(&str) -> Result<(), ValueError>>;
type Renderer = Box<dyn Fn() -> Option<String>>;
type Validator = Box<dyn Fn() -> Result<(), String>>;

/// One registered flag: names, help, and the type-erased accessors the
/// loader and usage renderer work through.
pub struct Flag {
    name: String,
    help: String,
    aliases: Vec<Alias>,
    boolean: bool,
    required: bool,
    default_text: Option<String>,
    loaded_name: Option<String>,
    setter: Setter,
    renderer: Renderer,
    validator: Option<Validator>,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// True for `bool` and `Option<bool>` flags; they take bare-presence
    /// and `--no-name` forms.
    pub fn is_boolean(&self) -> bool {
        self.boolean
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The stringified default, or `None` when the flag has no default.
    pub fn default_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    /// The identifier the most recent assignment came through (canonical
    /// name or alias), or the canonical name if never assigned.
    pub fn effective_name(&self) -> &str {
        self.loaded_name.as_deref().unwrap_or(&self.name)
    }

    /// The current value as text: `Some` for any assigned or defaulted
    /// value, `None` for unset optional storage.
    pub fn stringify(&self) -> Option<String> {
        (self.renderer)()
    }

    pub(crate) fn set(&self, text: &str) -> Result<(), ValueError> {
        (self.setter)(text)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match &self.validator {
            Some(validate) => validate(),
            None => Ok(()),
        }
    }

    pub(crate) fn record_assignment(&mut self, used_name: &str) {
        self.loaded_name = Some(used_name.to_string());
    }

    pub(crate) fn is_assigned(&self) -> bool {
        self.loaded_name.is_some()
    }

    pub(crate) fn is_deprecated_alias(&self, name: &str) -> bool {
        self.aliases
            .iter()
            .any(|alias| alias.name == name && alias.deprecated)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("boolean", &self.boolean)
            .field("required", &self.required)
            .field("default_text", &self.default_text)
            .field("loaded_name", &self.loaded_name)
            .finish_non_exhaustive()
    }
}

/// The flag registry: declarations, typed storage, and the entry point for
/// loading and usage rendering.
///
/// A fresh set already contains the built-in boolean `--help` flag
/// (default `false`); it is always first in iteration and usage order.
#[derive(Debug)]
pub struct FlagSet {
    flags: Vec<Flag>,
    index: HashMap<String, usize>,
    program_name: String,
    usage_message: Option<String>,
    last_warnings: Warnings,
    help: FlagRef<bool>,
}

impl FlagSet {
    pub fn new() -> Self {
        let mut set = Self {
            flags: Vec::new(),
            index: HashMap::new(),
            program_name: String::new(),
            usage_message: None,
            last_warnings: Warnings::default(),
            help: FlagRef {
                cell: Rc::new(RefCell::new(false)),
            },
        };
        set.help = set
            .add(FlagDef::new("help", "Prints this help message").default(false))
            .expect("flagstone: failed to register the built-in --help flag");
        set
    }

    /// Registers a flag with plain storage `T`.
    ///
    /// With a [`default`](FlagDef::default) the flag is optional and starts
    /// at that value; without one it is **required** and every load fails
    /// unless some source assigns it. Reading the returned [`FlagRef`]
    /// before a load yields the default, or `T::default()` for a required
    /// flag. Boolean flags must carry a default here; a boolean without one
    /// needs the unset state and belongs in [`add_optional`](Self::add_optional).
    pub fn add<T: FlagValue + Default>(
        &mut self,
        def: FlagDef<T>,
    ) -> Result<FlagRef<T>, FlagError> {
        let FlagDef {
            name,
            help,
            aliases,
            default,
            validator,
        } = def;

        if T::IS_BOOLEAN && default.is_none() {
            return Err(FlagError::RequiredBoolean { name });
        }

        self.claim_names(&name, &aliases)?;

        let required = default.is_none();
        let default_text = default.as_ref().map(FlagValue::render);
        let cell = Rc::new(RefCell::new(default.unwrap_or_default()));

        let setter: Setter = {
            let cell = Rc::clone(&cell);
            Box::new(move |text| {
                *cell.borrow_mut() = T::parse(text)?;
                Ok(())
            })
        };
        let renderer: Renderer = {
            let cell = Rc::clone(&cell);
            Box::new(move || Some(cell.borrow().render()))
        };
        let validator: Option<Validator> = validator.map(|validate| {
            let cell = Rc::clone(&cell);
            Box::new(move || validate(&*cell.borrow())) as Validator
        });

        self.flags.push(Flag {
            name,
            help,
            aliases,
            boolean: T::IS_BOOLEAN,
            required,
            default_text,
            loaded_name: None,
            setter,
            renderer,
            validator,
        });

        Ok(FlagRef { cell })
    }

    /// Registers a flag with optional storage `Option<T>`.
    ///
    /// The flag starts unset (`None`) and is never required; assignment
    /// stores `Some`. `Option<bool>` gives a boolean flag the full
    /// unset / false / true range. A default, if given, pre-fills the cell
    /// with `Some(default)`.
    pub fn add_optional<T: FlagValue>(
        &mut self,
        def: FlagDef<T>,
    ) -> Result<FlagRef<Option<T>>, FlagError> {
        let FlagDef {
            name,
            help,
            aliases,
            default,
            validator,
        } = def;

        self.claim_names(&name, &aliases)?;

        let default_text = default.as_ref().map(FlagValue::render);
        let cell = Rc::new(RefCell::new(default));

        let setter: Setter = {
            let cell = Rc::clone(&cell);
            Box::new(move |text| {
                *cell.borrow_mut() = Some(T::parse(text)?);
                Ok(())
            })
        };
        let renderer: Renderer = {
            let cell = Rc::clone(&cell);
            Box::new(move || cell.borrow().as_ref().map(FlagValue::render))
        };
        let validator: Option<Validator> = validator.map(|validate| {
            let cell = Rc::clone(&cell);
            Box::new(move || match cell.borrow().as_ref() {
                Some(value) => validate(value),
                None => Ok(()),
            }) as Validator
        });

        self.flags.push(Flag {
            name,
            help,
            aliases,
            boolean: T::IS_BOOLEAN,
            required: false,
            default_text,
            loaded_name: None,
            setter,
            renderer,
            validator,
        });

        Ok(FlagRef { cell })
    }

    /// The built-in `--help` flag's current value.
    pub fn help(&self) -> bool {
        self.help.get()
    }

    /// The name shown in the default usage header. Argv-based loads set it
    /// from the basename of `argv[0]`; this overrides that.
    pub fn set_program_name(&mut self, name: impl Into<String>) {
        self.program_name = name.into();
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Replaces the whole `Usage: <program> [options]` header line.
    pub fn set_usage_message(&mut self, message: impl Into<String>) {
        self.usage_message = Some(message.into());
    }

    /// Warnings from the most recent successful load.
    pub fn warnings(&self) -> &Warnings {
        &self.last_warnings
    }

    /// Looks a flag up by canonical name or alias.
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.index.get(name).map(|&slot| &self.flags[slot])
    }

    /// Iterates descriptors in registration order, `--help` first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Flag)> {
        self.flags.iter().map(|flag| (flag.name(), flag))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub(crate) fn lookup_slot(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn slot(&self, slot: usize) -> &Flag {
        &self.flags[slot]
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Flag {
        &mut self.flags[slot]
    }

    pub(crate) fn descriptors(&self) -> &[Flag] {
        &self.flags
    }

    pub(crate) fn usage_message(&self) -> Option<&str> {
        self.usage_message.as_deref()
    }

    pub(crate) fn set_last_warnings(&mut self, warnings: Warnings) {
        self.last_warnings = warnings;
    }

    // Validates and indexes a declaration's names atomically: on error the
    // index is untouched.
    fn claim_names(&mut self, name: &str, aliases: &[Alias]) -> Result<(), FlagError> {
        let slot = self.flags.len();
        let mut claimed: Vec<&str> = Vec::with_capacity(1 + aliases.len());

        for candidate in std::iter::once(name).chain(aliases.iter().map(Alias::name)) {
            if candidate.is_empty() {
                return Err(FlagError::InvalidName {
                    name: candidate.to_string(),
                    reason: "flag names cannot be empty".to_string(),
                });
            }
            if candidate.starts_with("no-") {
                return Err(FlagError::InvalidName {
                    name: candidate.to_string(),
                    reason: "the 'no-' prefix is reserved for negating boolean flags".to_string(),
                });
            }
            if self.index.contains_key(candidate) || claimed.contains(&candidate) {
                return Err(FlagError::AlreadyRegistered {
                    name: candidate.to_string(),
                });
            }
            claimed.push(candidate);
        }

        for candidate in claimed {
            self.index.insert(candidate.to_string(), slot);
        }
        Ok(())
    }
}

impl Default for FlagSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;

    #[test]
    fn new_set_registers_help_first() {
        let set = FlagSet::new();
        let (name, flag) = set.iter().next().unwrap();
        assert_eq!(name, "help");
        assert!(flag.is_boolean());
        assert_eq!(flag.default_text(), Some("false"));
        assert!(!set.help());
    }

    #[test]
    fn add_with_default_reads_back_before_any_load() {
        let mut set = FlagSet::new();
        let name1 = set
            .add(FlagDef::<String>::new("name1", "Set name1").default("ben folds"))
            .unwrap();
        assert_eq!(name1.get(), "ben folds");

        let flag = set.flag("name1").unwrap();
        assert!(!flag.is_required());
        assert_eq!(flag.default_text(), Some("ben folds"));
    }

    #[test]
    fn add_without_default_is_required() {
        let mut set = FlagSet::new();
        set.add(FlagDef::<String>::new("required_flag", "No default here"))
            .unwrap();
        let flag = set.flag("required_flag").unwrap();
        assert!(flag.is_required());
        assert_eq!(flag.default_text(), None);
    }

    #[test]
    fn add_optional_starts_unset() {
        let mut set = FlagSet::new();
        let name4 = set
            .add_optional(FlagDef::<bool>::new("name4", "Set name4"))
            .unwrap();
        assert_eq!(name4.get(), None);

        let flag = set.flag("name4").unwrap();
        assert!(flag.is_boolean());
        assert!(!flag.is_required());
        assert_eq!(flag.stringify(), None);
    }

    #[test]
    fn required_boolean_is_rejected() {
        let mut set = FlagSet::new();
        let err = set.add(FlagDef::<bool>::new("verbose", "Talk more")).unwrap_err();
        assert!(matches!(err, FlagError::RequiredBoolean { name } if name == "verbose"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut set = FlagSet::new();
        set.add(FlagDef::<i64>::new("port", "Listen port").default(0))
            .unwrap();

        let again = set.add(FlagDef::<i64>::new("port", "Listen port").default(0));
        assert!(matches!(again, Err(FlagError::AlreadyRegistered { name }) if name == "port"));

        // Collisions through aliases count too, in both directions.
        let alias_hits_name = set.add(
            FlagDef::<i64>::new("listen_port", "Listen port")
                .default(0)
                .alias("port"),
        );
        assert!(alias_hits_name.is_err());

        let self_collision = set.add(
            FlagDef::<i64>::new("bind", "Bind port")
                .default(0)
                .alias("bind"),
        );
        assert!(self_collision.is_err());
    }

    #[test]
    fn rejected_declaration_leaves_no_index_entries() {
        let mut set = FlagSet::new();
        let err = set.add(
            FlagDef::<String>::new("fresh", "Fresh flag")
                .default("x")
                .alias("help"),
        );
        assert!(err.is_err());
        // "fresh" must not have been claimed by the failed declaration.
        assert!(set.flag("fresh").is_none());
        set.add(FlagDef::<String>::new("fresh", "Fresh flag").default("x"))
            .unwrap();
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut set = FlagSet::new();
        assert!(matches!(
            set.add(FlagDef::<String>::new("", "Empty").default("x")),
            Err(FlagError::InvalidName { .. })
        ));
        assert!(matches!(
            set.add(FlagDef::<String>::new("no-frills", "Reserved").default("x")),
            Err(FlagError::InvalidName { .. })
        ));
    }

    #[test]
    fn lookup_covers_aliases() {
        let mut set = FlagSet::new();
        set.add_optional(FlagDef::<String>::new("name6", "Also set name6").alias("alias6"))
            .unwrap();
        assert_eq!(set.flag("alias6").unwrap().name(), "name6");
        assert!(set.flag("alias7").is_none());
    }

    #[test]
    fn iteration_keeps_registration_order() {
        let mut set = FlagSet::new();
        set.add(FlagDef::<String>::new("name1", "Set name1").default("ben folds"))
            .unwrap();
        set.add(FlagDef::<i64>::new("name2", "Set name2").default(42))
            .unwrap();
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["help", "name1", "name2"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn setter_updates_ref_and_stringify() {
        let mut set = FlagSet::new();
        let name2 = set
            .add(FlagDef::<i64>::new("name2", "Set name2").default(42))
            .unwrap();

        set.flag("name2").unwrap().set("1337").unwrap();
        assert_eq!(name2.get(), 1337);
        assert_eq!(set.flag("name2").unwrap().stringify(), Some("1337".to_string()));

        let err = set.flag("name2").unwrap().set("billy joel").unwrap_err();
        assert_eq!(err.to_string(), "Failed to convert into required type");
    }

    #[test]
    fn effective_name_tracks_assignments() {
        let mut set = FlagSet::new();
        set.add_optional(FlagDef::<String>::new("name6", "Also set name6").alias("alias6"))
            .unwrap();

        assert_eq!(set.flag("name6").unwrap().effective_name(), "name6");

        let slot = set.lookup_slot("alias6").unwrap();
        set.slot_mut(slot).record_assignment("alias6");
        assert_eq!(set.flag("name6").unwrap().effective_name(), "alias6");
        assert!(set.flag("name6").unwrap().is_assigned());
    }

    #[test]
    fn validator_sees_stored_values() {
        let mut set = FlagSet::new();
        set.add(
            FlagDef::<Duration>::new("duration", "Duration to test validation")
                .default(Duration::seconds(10))
                .validator(|value| {
                    if *value > Duration::hours(1) {
                        Err("Expected --duration to be less than 1 hour".to_string())
                    } else {
                        Ok(())
                    }
                }),
        )
        .unwrap();

        let flag = set.flag("duration").unwrap();
        flag.set("30mins").unwrap();
        assert_eq!(flag.validate(), Ok(()));

        flag.set("2hrs").unwrap();
        assert_eq!(
            flag.validate(),
            Err("Expected --duration to be less than 1 hour".to_string())
        );
    }

    #[test]
    fn deprecated_alias_is_tracked_per_name() {
        let mut set = FlagSet::new();
        set.add_optional(
            FlagDef::<String>::new("name6", "Also set name6").deprecated_alias("alias6"),
        )
        .unwrap();

        let flag = set.flag("name6").unwrap();
        assert!(flag.is_deprecated_alias("alias6"));
        assert!(!flag.is_deprecated_alias("name6"));
    }
}
