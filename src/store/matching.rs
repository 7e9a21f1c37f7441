//! Host name patterns
// (c) 2024 Ross Younger

/// Is this `Host` argument a pattern rather than a concrete host name?
///
/// Wildcards (`*`, `?`) and negations (`!name`) only ever select other hosts;
/// they never name a connectable entry of their own.
pub(super) fn is_pattern(arg: &str) -> bool {
    arg.is_empty() || arg.starts_with('!') || arg.contains(|c| c == '*' || c == '?')
}

/// The concrete host names declared by a `Host` line, in declaration order
pub(super) fn concrete_names(args: &[String]) -> impl Iterator<Item = &str> {
    args.iter().map(String::as_str).filter(|a| !is_pattern(a))
}

/// Does a `Host` line declare this concrete name?
pub(super) fn declares(args: &[String], name: &str) -> bool {
    concrete_names(args).any(|n| n == name)
}

///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::{concrete_names, declares, is_pattern};
    use anyhow::{anyhow, Context, Result};
    use assertables::assert_eq_as_result;

    #[test]
    fn patterns() -> Result<()> {
        for (arg, result) in [
            ("foo", false),
            ("", true),
            ("*", true),
            ("*.example.com", true),
            ("f?o", true),
            ("!bar", true),
            ("192.168.1.42", false),
            ("web-01.internal", false),
        ] {
            assert_eq_as_result!(is_pattern(arg), result)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("arg {arg}"))?;
        }
        Ok(())
    }

    #[test]
    fn names_from_mixed_line() {
        let args: Vec<String> = ["a", "*.b", "c", "!d"]
            .into_iter()
            .map(std::convert::Into::into)
            .collect();
        assert_eq!(concrete_names(&args).collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(declares(&args, "c"));
        assert!(!declares(&args, "*.b"));
        assert!(!declares(&args, "d"));
    }
}
