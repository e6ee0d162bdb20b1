//! Typed command-line flags for long-running services. Declare once, load
//! from argv, environment variables, and explicit maps with one precedence
//! order.
//!
//! ```
//! use flagstone::{FlagDef, FlagSet};
//!
//! let mut flags = FlagSet::new();
//! let port = flags
//!     .add(FlagDef::<u16>::new("port", "Listen port").default(8080u16))
//!     .unwrap();
//! let verbose = flags
//!     .add_optional(FlagDef::<bool>::new("verbose", "Log more"))
//!     .unwrap();
//!
//! let args: Vec<String> = ["service", "--port=9090", "--verbose"]
//!     .into_iter()
//!     .map(String::from)
//!     .collect();
//! flags.load_args(None, &args).unwrap();
//!
//! assert_eq!(port.get(), 9090);
//! assert_eq!(verbose.get(), Some(true));
//! ```
//!
//! Each [`FlagSet::add`] or [`FlagSet::add_optional`] call hands back a
//! [`FlagRef`]: a cheap handle to the flag's typed storage. Loading writes
//! through the descriptor table into those cells, so the handles you kept at
//! declaration time read the final values with no further lookups.
//!
//! # Declaring flags
//!
//! [`add`](FlagSet::add) registers plain storage `T`. With a
//! [`default`](FlagDef::default) the flag is optional; without one it is
//! **required**, and any load that leaves it unassigned fails. Boolean flags
//! must carry a default here.
//!
//! [`add_optional`](FlagSet::add_optional) registers `Option<T>` storage.
//! The flag starts unset and is never required, which distinguishes "the
//! operator said nothing" from any concrete value. `Option<bool>` is the
//! tri-state boolean: unset, explicitly false, explicitly true.
//!
//! Flags can also carry [aliases](FlagDef::alias) (alternate names that
//! behave exactly like the canonical one) and
//! [validators](FlagDef::validator) (predicates that run on every fresh
//! assignment and abort the load on failure).
//!
//! Every fresh set already contains a boolean `--help` flag; check it with
//! [`FlagSet::help`] after loading and print [`FlagSet::usage`].
//!
//! # Sources and precedence
//!
//! ```text
//! Caller map          explicit pairs handed to load()
//!        ↑ overridden by
//! Environment         PREFIX_name variables
//!        ↑ overridden by
//! Command line        --name=value tokens
//! ```
//!
//! Every source is sparse: it assigns only the flags it names, and anything
//! else falls through to lower layers or declaration defaults. Assigning the
//! same flag twice **within** one source is an error; assigning it in two
//! different sources is just precedence at work and overrides silently.
//!
//! Argv loading ([`load_args`](FlagSet::load_args)) skips tokens that do not
//! start with `--` and stops interpreting at a bare `--` terminator. The
//! [`load_args_in_place`](FlagSet::load_args_in_place) variant additionally
//! rewrites the vector on success to the program name plus the non-flag
//! tokens, ready to hand to the next parsing stage.
//!
//! # Boolean flags
//!
//! A boolean flag accepts `--name=true`, bare `--name` (true), and
//! `--no-name` (false). The `no-` prefix is reserved: registration rejects
//! names starting with it, and `--no-name` on a non-boolean flag is an
//! error. Environment variables express bare presence with an empty value
//! (`PREFIX_name=`).
//!
//! # Value kinds
//!
//! | Storage | Accepted text |
//! |---------|---------------|
//! | `String` | anything, byte for byte |
//! | `i8` ... `u128`, `isize`, `usize` | decimal integers |
//! | `bool` | `true`, `1`, `false`, `0` |
//! | [`Duration`] | scalar plus unit: `250ms`, `15secs`, `2hrs` |
//! | [`JsonObject`] | a JSON object literal, or an absolute path to a file holding one |
//!
//! Any value of any kind may instead be written `file:///path`: the file's
//! contents become the value before the kind's parser runs. Custom kinds
//! implement [`FlagValue`].
//!
//! # Errors and warnings
//!
//! Loads return `Result<Warnings, FlagError>`. The first problem aborts the
//! load and comes back as a [`FlagError`] with a stable, operator-facing
//! message; [`Warnings`] (currently only "loaded via a deprecated alias")
//! accumulate across the whole load and are returned, and kept on the set,
//! only when it succeeds.
//!
//! # Thread affinity
//!
//! A [`FlagSet`] and its [`FlagRef`]s share storage through reference
//! counting without synchronization, so a set lives on the thread that
//! declared it. Load at startup, then move the extracted values, not the
//! set, into worker threads.

pub mod error;

mod args;
mod duration;
mod env;
mod load;
mod registry;
mod usage;
mod value;

#[cfg(test)]
mod fixtures;

pub use duration::Duration;
pub use error::{FlagError, ValueError};
pub use load::{ValueMap, Warning, Warnings};
pub use registry::{Alias, Flag, FlagDef, FlagRef, FlagSet};
pub use value::{FlagValue, JsonObject};
