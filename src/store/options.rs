//! Conversion between `ssh -o` command-line options and config file directives
// (c) 2024 Ross Younger

/// Converts command-line options (`-o Key=Value -o Other=x`) into config lines (`Key Value`), one per line.
///
/// Both `-o Key=Value` and `-oKey=Value` are recognised. A value may contain spaces;
/// it runs until the next `-o`. Fragments without an `=` are passed through unchanged.
#[must_use]
pub fn to_config(cmdline: &str) -> String {
    let mut options: Vec<Vec<&str>> = Vec::new();
    for token in cmdline.split_whitespace() {
        if token == "-o" {
            options.push(Vec::new());
        } else if let Some(rest) = token.strip_prefix("-o") {
            options.push(vec![rest]);
        } else if let Some(current) = options.last_mut() {
            current.push(token);
        } else {
            // text before any -o; keep it rather than lose it
            options.push(vec![token]);
        }
    }
    options
        .into_iter()
        .map(|words| words.join(" "))
        .filter(|option| !option.is_empty())
        .map(|option| match option.split_once('=') {
            Some((key, value)) => format!("{} {}", key.trim(), value.trim()),
            None => option,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts config lines (`Key Value`, one per line) into command-line options (`-o Key=Value ...`).
///
/// Only the first whitespace separates key from value. Lines without a value are passed through as `-o Line`.
#[must_use]
pub fn to_command(config: &str) -> String {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((key, value)) => format!("-o {key}={}", value.trim_start()),
            None => format!("-o {line}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod test {
    use super::{to_command, to_config};

    #[test]
    fn command_to_config() {
        assert_eq!(
            to_config("-o ForwardAgent=yes -o ServerAliveInterval=30"),
            "ForwardAgent yes\nServerAliveInterval 30"
        );
        assert_eq!(to_config("-oCompression=no"), "Compression no");
        assert_eq!(to_config(""), "");
        assert_eq!(to_config("   -o   "), "");
    }

    #[test]
    fn values_with_spaces() {
        assert_eq!(
            to_config("-o ProxyCommand=ssh -W %h:%p bastion -o Compression=yes"),
            "ProxyCommand ssh -W %h:%p bastion\nCompression yes"
        );
        assert_eq!(
            to_command("ProxyCommand ssh -W %h:%p bastion"),
            "-o ProxyCommand=ssh -W %h:%p bastion"
        );
    }

    #[test]
    fn config_to_command() {
        assert_eq!(
            to_command("ForwardAgent yes\n\n  ServerAliveInterval 30  \n"),
            "-o ForwardAgent=yes -o ServerAliveInterval=30"
        );
        assert_eq!(to_command("Compression=yes"), "-o Compression=yes");
        assert_eq!(to_command(""), "");
    }

    #[test]
    fn malformed_passes_through() {
        assert_eq!(to_config("-o JustAKey"), "JustAKey");
        assert_eq!(to_config("stray -o A=b"), "stray\nA b");
    }

    #[test]
    fn inverse() {
        for config in [
            "ForwardAgent yes",
            "ForwardAgent yes\nCompression no\nLocalForward 8080 localhost:80",
        ] {
            assert_eq!(to_config(&to_command(config)), config);
        }
        for cmdline in ["-o A=1", "-o A=1 -o B=two words"] {
            assert_eq!(to_command(&to_config(cmdline)), cmdline);
        }
    }
}
