//! Loading: merging sources into typed flag storage.
//!
//! Every load mode reduces to the same core: one or more sources, each a
//! list of (name, optional text) pairs, processed from lowest to highest
//! precedence. Within a source a second assignment to the same flag is an
//! error; across sources the later (higher-precedence) source silently
//! overwrites the earlier one, which is how `--name1=x` beats
//! `PREFIX_name1=y` beats a map entry. Loading is transactional in its
//! reporting: the first error aborts and is returned, and warnings are only
//! handed back on success.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Serialize;

use crate::args;
use crate::env;
use crate::error::{FlagError, ValueError};
use crate::registry::FlagSet;

/// Explicit name-to-value assignments for [`FlagSet::load`].
///
/// Keys are flag names: canonical or alias, with or without a `no-` prefix.
/// A `None` value is bare presence (boolean `true`); `Some("")` is an
/// explicit empty text, which is a legitimate value for non-boolean flags.
pub type ValueMap = BTreeMap<String, Option<String>>;

/// A non-fatal observation from a load, such as use of a deprecated alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
}

/// All warnings from one load, in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Warnings {
    pub warnings: Vec<Warning>,
}

impl Warnings {
    fn push(&mut self, message: String) {
        self.warnings.push(Warning { message });
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// One resolved assignment: which flag, the identifier it came through, and
/// the effective text to store.
struct Assignment {
    slot: usize,
    used: String,
    text: String,
}

impl FlagSet {
    /// Loads from an explicit map. Unknown names are errors.
    pub fn load(&mut self, values: &ValueMap) -> Result<Warnings, FlagError> {
        self.run(vec![map_pairs(values)], false)
    }

    /// Loads from the environment, then from `values`; map entries override
    /// environment ones. `unknowns_allowed` skips unrecognized names in both
    /// sources instead of failing.
    pub fn load_with_env(
        &mut self,
        values: &ValueMap,
        unknowns_allowed: bool,
        env_prefix: &str,
    ) -> Result<Warnings, FlagError> {
        let environment = env::prefixed_pairs(env_prefix, std::env::vars());
        self.run(vec![environment, map_pairs(values)], unknowns_allowed)
    }

    /// Loads from environment variables carrying `env_prefix` only.
    pub fn load_env(&mut self, env_prefix: &str) -> Result<Warnings, FlagError> {
        let environment = env::prefixed_pairs(env_prefix, std::env::vars());
        self.run(vec![environment], false)
    }

    /// Loads from an argument vector (program name at index 0), preceded by
    /// an environment snapshot when `env_prefix` is given; command-line
    /// assignments override environment ones. Unknown flags are errors.
    /// Sets the program name from the basename of `args[0]`.
    pub fn load_args(
        &mut self,
        env_prefix: Option<&str>,
        args: &[String],
    ) -> Result<Warnings, FlagError> {
        self.assign_program_name(args);

        let scanned = args::scan(args);
        let mut sources = Vec::with_capacity(2);
        if let Some(prefix) = env_prefix {
            sources.push(env::prefixed_pairs(prefix, std::env::vars()));
        }
        sources.push(scanned.pairs);
        self.run(sources, false)
    }

    /// Like [`load_args`](Self::load_args), and on success rewrites `args`
    /// to the program name plus the non-flag tokens in their original
    /// order, dropping flag tokens and the `--` terminator. On error the
    /// vector is left untouched.
    pub fn load_args_in_place(
        &mut self,
        env_prefix: Option<&str>,
        args: &mut Vec<String>,
    ) -> Result<Warnings, FlagError> {
        self.assign_program_name(args);

        let scanned = args::scan(args);
        let mut sources = Vec::with_capacity(2);
        if let Some(prefix) = env_prefix {
            sources.push(env::prefixed_pairs(prefix, std::env::vars()));
        }
        sources.push(scanned.pairs);

        let warnings = self.run(sources, false)?;
        args::compact(args, &scanned.nonflags);
        Ok(warnings)
    }

    fn assign_program_name(&mut self, args: &[String]) {
        let Some(first) = args.first() else { return };
        let basename = Path::new(first)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.set_program_name(basename);
    }

    // The core: sources ordered lowest to highest precedence.
    fn run(
        &mut self,
        sources: Vec<Vec<(String, Option<String>)>>,
        unknowns_allowed: bool,
    ) -> Result<Warnings, FlagError> {
        let mut warnings = Warnings::default();

        for source in sources {
            let mut assigned: HashSet<usize> = HashSet::new();
            for (name, value) in source {
                let resolved = self.resolve(&name, value.as_deref(), unknowns_allowed)?;
                let Some(assignment) = resolved else {
                    continue;
                };
                if !assigned.insert(assignment.slot) {
                    return Err(FlagError::Duplicate {
                        name: assignment.used,
                    });
                }
                self.apply(assignment, &mut warnings)?;
            }
        }

        for flag in self.descriptors() {
            if flag.is_required() && !flag.is_assigned() {
                return Err(FlagError::MissingRequired {
                    name: flag.name().to_string(),
                });
            }
        }

        self.set_last_warnings(warnings.clone());
        Ok(warnings)
    }

    // Turns one (name, value) pair into an assignment. `Ok(None)` means an
    // unknown name that unknowns_allowed lets through.
    fn resolve(
        &self,
        name: &str,
        value: Option<&str>,
        unknowns_allowed: bool,
    ) -> Result<Option<Assignment>, FlagError> {
        if let Some(base) = name.strip_prefix("no-") {
            let Some(slot) = self.lookup_slot(base) else {
                if unknowns_allowed {
                    return Ok(None);
                }
                return Err(FlagError::UnknownFlagNegated {
                    name: base.to_string(),
                    via: name.to_string(),
                });
            };
            if !self.slot(slot).is_boolean() {
                return Err(FlagError::NegatedNonBoolean {
                    name: base.to_string(),
                    via: name.to_string(),
                });
            }
            if let Some(text) = value
                && !text.is_empty()
            {
                return Err(FlagError::NegatedWithValue {
                    name: base.to_string(),
                    via: name.to_string(),
                    value: text.to_string(),
                });
            }
            return Ok(Some(Assignment {
                slot,
                used: base.to_string(),
                text: "false".to_string(),
            }));
        }

        let Some(slot) = self.lookup_slot(name) else {
            if unknowns_allowed {
                return Ok(None);
            }
            return Err(FlagError::UnknownFlag {
                name: name.to_string(),
            });
        };

        let text = if self.slot(slot).is_boolean() {
            // Bare presence and an empty value both mean true; environment
            // variables can only express presence as an empty value.
            match value {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => "true".to_string(),
            }
        } else {
            match value {
                Some(text) => text.to_string(),
                None => {
                    return Err(FlagError::MissingValue {
                        name: name.to_string(),
                    });
                }
            }
        };

        Ok(Some(Assignment {
            slot,
            used: name.to_string(),
            text,
        }))
    }

    fn apply(&mut self, assignment: Assignment, warnings: &mut Warnings) -> Result<(), FlagError> {
        let Assignment { slot, used, text } = assignment;

        if self.slot(slot).is_deprecated_alias(&used) {
            warnings.push(format!("Loaded deprecated flag '{used}'"));
        }

        // Error messages keep the text as supplied, even when the stored
        // value came out of a file.
        let contents = match fetch(&text) {
            Ok(contents) => contents,
            Err(source) => {
                return Err(FlagError::InvalidValue {
                    name: used,
                    value: text,
                    source,
                });
            }
        };

        if let Err(source) = self.slot(slot).set(&contents) {
            return Err(FlagError::InvalidValue {
                name: used,
                value: text,
                source,
            });
        }

        if let Err(message) = self.slot(slot).validate() {
            return Err(FlagError::Validation(message));
        }

        self.slot_mut(slot).record_assignment(&used);
        Ok(())
    }
}

/// Resolves `file://` indirection: the value becomes the file's contents.
/// Applies to every flag kind before its codec runs.
fn fetch(text: &str) -> Result<Cow<'_, str>, ValueError> {
    match text.strip_prefix("file://") {
        Some(path) => std::fs::read_to_string(path)
            .map(Cow::Owned)
            .map_err(|e| ValueError::new(format!("Error reading file '{path}': {e}"))),
        None => Ok(Cow::Borrowed(text)),
    }
}

fn map_pairs(values: &ValueMap) -> Vec<(String, Option<String>)> {
    values
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
