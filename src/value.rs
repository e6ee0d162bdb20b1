//! String-to-typed-value codecs.
//!
//! Every flag kind is a type implementing [`FlagValue`]: the loader hands it
//! raw text and stores the parsed result; the usage renderer and
//! [`Flag::stringify`](crate::Flag::stringify) go the other way. Implement
//! the trait for your own types to register flags of those types.

use std::path::Path;

use serde_json::Value;

use crate::duration::Duration;
use crate::error::ValueError;

/// The JSON-object flag kind: a top-level JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

/// Conversion between flag text and a typed value.
///
/// `parse` never sees shell quoting; values arrive exactly as the source
/// supplied them (`--limits={"cpu":4}` after the shell has had its say).
/// `render` produces the canonical text form, and parsing that form must
/// reproduce the value.
pub trait FlagValue: Clone + 'static {
    /// True only for `bool`. Boolean flags get bare-presence and `--no-name`
    /// treatment from the loader and `--[no-]name` synopses in usage text.
    const IS_BOOLEAN: bool = false;

    fn parse(text: &str) -> Result<Self, ValueError>;

    fn render(&self) -> String;
}

impl FlagValue for String {
    /// Identity; any text is a valid string value, including the empty one.
    fn parse(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl FlagValue for bool {
    const IS_BOOLEAN: bool = true;

    fn parse(text: &str) -> Result<Self, ValueError> {
        match text {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ValueError::new("Expecting a boolean (e.g., true or false)")),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

macro_rules! integer_flag_value {
    ($($int:ty),* $(,)?) => {
        $(
            impl FlagValue for $int {
                fn parse(text: &str) -> Result<Self, ValueError> {
                    text.parse()
                        .map_err(|_| ValueError::new("Failed to convert into required type"))
                }

                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_flag_value!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize);

impl FlagValue for Duration {
    fn parse(text: &str) -> Result<Self, ValueError> {
        Duration::parse(text)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FlagValue for JsonObject {
    /// Text that does not open an object literal but names an existing
    /// absolute path is read from disk and the file contents parsed instead.
    /// Relative paths are never probed.
    fn parse(text: &str) -> Result<Self, ValueError> {
        if !text.starts_with('{') {
            let path = Path::new(text);
            if path.is_absolute() && path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| ValueError::new(format!("Error reading file '{text}': {e}")))?;
                return parse_object(&contents);
            }
        }
        parse_object(text)
    }

    fn render(&self) -> String {
        Value::Object(self.clone()).to_string()
    }
}

fn parse_object(text: &str) -> Result<JsonObject, ValueError> {
    serde_json::from_str(text).map_err(|e| ValueError::new(e.to_string()))
}
