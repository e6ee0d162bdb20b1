/// Collects flag assignments from environment variables carrying `prefix`.
///
/// `PREFIX_name=value` becomes the pair `("name", Some(value))`; the loader
/// applies the same name resolution as for any other source, so
/// `PREFIX_no-quiet=` switches a boolean flag off and an empty value on a
/// boolean flag means bare presence. A variable whose whole name is the
/// prefix is skipped. Pairs come back sorted by name, making loads from the
/// (unordered) process environment deterministic.
///
/// Takes an iterator so tests can pass synthetic data instead of
/// `std::env::vars()`.
pub(crate) fn prefixed_pairs(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Vec<(String, Option<String>)> {
    let mut pairs: Vec<(String, Option<String>)> = vars
        .into_iter()
        .filter_map(|(key, value)| {
            let rest = key.strip_prefix(prefix)?;
            if rest.is_empty() {
                return None;
            }
            Some((rest.to_string(), Some(value)))
        })
        .collect();
    pairs.sort();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn strips_prefix_and_keeps_value() {
        let pairs = prefixed_pairs("FLAGS_", vars(&[("FLAGS_name1", "ben folds")]));
        assert_eq!(pairs, [("name1".to_string(), Some("ben folds".to_string()))]);
    }

    #[test]
    fn unrelated_vars_ignored() {
        let pairs = prefixed_pairs("FLAGS_", vars(&[("OTHER_name1", "x"), ("PATH", "/bin")]));
        assert!(pairs.is_empty());
    }

    #[test]
    fn bare_prefix_ignored() {
        let pairs = prefixed_pairs("FLAGS_", vars(&[("FLAGS_", "x")]));
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_value_preserved() {
        let pairs = prefixed_pairs("FLAGS_", vars(&[("FLAGS_name5", "")]));
        assert_eq!(pairs, [("name5".to_string(), Some(String::new()))]);
    }

    #[test]
    fn negated_names_pass_through() {
        let pairs = prefixed_pairs("FLAGS_", vars(&[("FLAGS_no-name3", "")]));
        assert_eq!(pairs, [("no-name3".to_string(), Some(String::new()))]);
    }

    #[test]
    fn output_is_sorted_by_name() {
        let pairs = prefixed_pairs(
            "FLAGS_",
            vars(&[("FLAGS_zeta", "1"), ("FLAGS_alpha", "2"), ("FLAGS_mid", "3")]),
        );
        let names: Vec<&str> = pairs.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }
}
