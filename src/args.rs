//! Command-line source: scanning an argument vector and compacting it
//! after a successful load.

/// What a scan found: flag assignments plus the positions of everything
/// that is not a flag.
pub(crate) struct ScannedArgs {
    /// (name, value) pairs in command-line order. `--key=value` carries
    /// `Some(value)` (possibly empty); bare `--key` carries `None`.
    pub pairs: Vec<(String, Option<String>)>,
    /// Positions of non-flag tokens, in order. The program name at
    /// position 0 is not listed.
    pub nonflags: Vec<usize>,
}

/// Scans `args`, whose first element is the program name.
///
/// A lone `--` ends flag scanning: everything after it is data even when it
/// looks like a flag. Single-dash tokens are data too; there are no short
/// flags. A bare `--key` never consumes the following token, so values must
/// use the `--key=value` form.
pub(crate) fn scan(args: &[String]) -> ScannedArgs {
    let mut pairs = Vec::new();
    let mut nonflags = Vec::new();
    let mut after_terminator = false;

    for (position, arg) in args.iter().enumerate().skip(1) {
        if after_terminator {
            nonflags.push(position);
            continue;
        }
        if arg == "--" {
            after_terminator = true;
            continue;
        }
        let Some(body) = arg.strip_prefix("--") else {
            nonflags.push(position);
            continue;
        };
        match body.split_once('=') {
            Some((name, value)) => pairs.push((name.to_string(), Some(value.to_string()))),
            None => pairs.push((body.to_string(), None)),
        }
    }

    ScannedArgs { pairs, nonflags }
}

/// Rewrites `args` to the program name followed by the non-flag tokens in
/// their original relative order. Flag tokens and the `--` terminator are
/// dropped.
pub(crate) fn compact(args: &mut Vec<String>, nonflags: &[usize]) {
    let mut kept = Vec::with_capacity(1 + nonflags.len());
    if let Some(program) = args.first() {
        kept.push(program.clone());
    }
    for &position in nonflags {
        kept.push(args[position].clone());
    }
    *args = kept;
}
