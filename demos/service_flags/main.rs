//! # flagstone demo service
//!
//! A pretend network service that showcases how to wire
//! [flagstone](https://docs.rs/flagstone) into a real binary. This is **not**
//! a real server. It declares a handful of flags, loads them, and prints
//! what it resolved.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example service_flags -- --port=9090
//! cargo run --example service_flags -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature            | How to exercise it                                              |
//! |--------------------|------------------------------------------------------------------|
//! | Compiled defaults  | `cargo run --example service_flags`                              |
//! | Command line       | `cargo run --example service_flags -- --port=9090`               |
//! | Environment        | `SERVICE_port=9090 cargo run --example service_flags`            |
//! | Precedence         | `SERVICE_port=1 cargo run --example service_flags -- --port=2`   |
//! | Boolean negation   | `cargo run --example service_flags -- --no-verbose`              |
//! | Duration values    | `cargo run --example service_flags -- --timeout=45secs`          |
//! | Aliases            | `cargo run --example service_flags -- --deadline=2mins`          |
//! | Deprecated alias   | `cargo run --example service_flags -- --debug` (prints a warning)|
//! | JSON values        | `cargo run --example service_flags -- --labels='{"az":"eu-1"}'`  |
//! | File indirection   | `cargo run --example service_flags -- --peer=file:///tmp/peer`   |
//! | Validation         | `cargo run --example service_flags -- --workers=0`               |
//! | Non-flag tokens    | `cargo run --example service_flags -- run --port=9090 now`       |
//! | Usage text         | `cargo run --example service_flags -- --help`                    |

use flagstone::{Duration, FlagDef, FlagError, FlagRef, FlagSet, JsonObject};

const ENV_PREFIX: &str = "SERVICE_";

// ---------------------------------------------------------------------------
// Flag declarations
// ---------------------------------------------------------------------------

/// Every flag the service understands, declared up front. The [`FlagRef`]
/// handles read the loaded values after `main` runs a load.
struct ServiceOptions {
    flags: FlagSet,
    port: FlagRef<u16>,
    workers: FlagRef<usize>,
    timeout: FlagRef<Duration>,
    verbose: FlagRef<bool>,
    peer: FlagRef<Option<String>>,
    labels: FlagRef<Option<JsonObject>>,
}

fn declare() -> Result<ServiceOptions, FlagError> {
    let mut flags = FlagSet::new();

    let port = flags.add(FlagDef::<u16>::new("port", "Port to listen on").default(8080u16))?;

    let workers = flags.add(
        FlagDef::<usize>::new("workers", "Worker threads to spawn")
            .default(4usize)
            .validator(|count| {
                if *count == 0 {
                    Err("Expected --workers to be at least 1".to_string())
                } else {
                    Ok(())
                }
            }),
    )?;

    let timeout = flags.add(
        FlagDef::<Duration>::new("timeout", "Give up on an idle peer after this long")
            .default(Duration::seconds(30))
            .alias("deadline"),
    )?;

    let verbose = flags.add(
        FlagDef::<bool>::new("verbose", "Log every request")
            .default(false)
            .deprecated_alias("debug"),
    )?;

    let peer = flags.add_optional(FlagDef::<String>::new("peer", "Upstream peer address"))?;

    let labels = flags.add_optional(FlagDef::<JsonObject>::new(
        "labels",
        "Labels to report upstream, as a JSON object",
    ))?;

    Ok(ServiceOptions {
        flags,
        port,
        workers,
        timeout,
        verbose,
        peer,
        labels,
    })
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let mut options = declare().unwrap_or_else(|error| {
        eprintln!("Bad flag declarations: {error}");
        std::process::exit(1);
    });

    let mut args: Vec<String> = std::env::args().collect();
    let loaded = options
        .flags
        .load_args_in_place(Some(ENV_PREFIX), &mut args);
    let warnings = match loaded {
        Ok(warnings) => warnings,
        Err(error) => {
            eprintln!("{}", options.flags.usage_with_message(&error.to_string()));
            std::process::exit(1);
        }
    };

    if options.flags.help() {
        print!("{}", options.flags.usage());
        return;
    }

    for warning in &warnings.warnings {
        eprintln!("warning: {}", warning.message);
    }

    let entries = [
        ("port", options.port.get().to_string()),
        ("workers", options.workers.get().to_string()),
        ("timeout", options.timeout.get().to_string()),
        ("verbose", options.verbose.get().to_string()),
        (
            "peer",
            options.peer.get().unwrap_or_else(|| "(unset)".to_string()),
        ),
        (
            "labels",
            options
                .labels
                .get()
                .map(|object| serde_json::Value::Object(object).to_string())
                .unwrap_or_else(|| "(unset)".to_string()),
        ),
    ];

    println!("Resolved flags:");
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in &entries {
        println!("  {key:<max_key_len$}  {value}");
    }

    // load_args_in_place compacted argv down to program name + non-flags.
    if args.len() > 1 {
        println!("Remaining arguments: {:?}", &args[1..]);
    }
}
