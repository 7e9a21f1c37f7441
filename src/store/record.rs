//! Host records
// (c) 2024 Ross Younger

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{
    lines::{quote_arg, TAGS_PREFIX},
    options,
};

/// The port OpenSSH uses when none is configured
pub const DEFAULT_PORT: &str = "22";

const INDENT: &str = "    ";

/// One connectable host, as declared in an ssh config file.
///
/// Records are built afresh on every read. A `Host a b` line yields one record per
/// name, identical apart from [`name`](Self::name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// The host alias
    pub name: String,
    /// `HostName`
    pub hostname: String,
    /// `User`
    pub user: String,
    /// `Port`; `"22"` when the file does not say
    pub port: String,
    /// `IdentityFile`, unquoted
    pub identity: String,
    /// `ProxyJump`
    pub proxy_jump: String,
    /// `RemoteCommand`
    pub remote_command: String,
    /// `RequestTTY`
    pub request_tty: String,
    /// Every other directive of the block, one `Key Value` per line, verbatim and in order
    pub options: String,
    /// Tags from the `# Tags:` comment immediately above the `Host` line
    pub tags: Vec<String>,
    /// The physical file containing this host's declaration
    pub source_file: PathBuf,
}

impl Default for HostRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            hostname: String::new(),
            user: String::new(),
            port: DEFAULT_PORT.to_owned(),
            identity: String::new(),
            proxy_jump: String::new(),
            remote_command: String::new(),
            request_tty: String::new(),
            options: String::new(),
            tags: Vec::new(),
            source_file: PathBuf::new(),
        }
    }
}

impl HostRecord {
    /// Creates an otherwise empty record
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// The record's extra options in command-line form (`-o Key=Value ...`)
    #[must_use]
    pub fn ssh_options(&self) -> String {
        options::to_command(&self.options)
    }

    /// Applies a directive read from a config file.
    ///
    /// `keyword` must be lowercase. `line` is the whole (trimmed) source line, kept
    /// verbatim if the directive is not one we model. As in ssh, the first value of a
    /// keyword is the one that counts; `repeated` says this keyword was already seen in
    /// the block, and such lines are kept verbatim too so a rewrite does not lose them.
    pub(super) fn apply(&mut self, keyword: &str, value: &str, line: &str, repeated: bool) {
        if repeated {
            self.push_option(line);
            return;
        }
        let field = match keyword {
            "hostname" => &mut self.hostname,
            "user" => &mut self.user,
            "port" => &mut self.port,
            "identityfile" => {
                self.identity = unquote(value).to_owned();
                return;
            }
            "proxyjump" => &mut self.proxy_jump,
            "remotecommand" => &mut self.remote_command,
            "requesttty" => &mut self.request_tty,
            _ => {
                self.push_option(line);
                return;
            }
        };
        value.clone_into(field);
    }

    fn push_option(&mut self, line: &str) {
        if !self.options.is_empty() {
            self.options.push('\n');
        }
        self.options.push_str(line);
    }

    /// Renders this record as a standalone block: tag comment, `Host` line and directives.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.render_as(std::slice::from_ref(&self.name))
    }

    /// Renders this record's properties under a `Host` line naming `names`
    pub(super) fn render_as(&self, names: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        if !self.tags.is_empty() {
            out.push(format!("{TAGS_PREFIX} {}", self.tags.join(", ")));
        }
        let names: Vec<String> = names.iter().map(|n| quote_arg(n)).collect();
        out.push(format!("Host {}", names.join(" ")));

        let mut directive = |key: &str, value: &str| {
            if !value.is_empty() {
                out.push(format!("{INDENT}{key} {value}"));
            }
        };
        directive("HostName", &self.hostname);
        directive("User", &self.user);
        if self.port != DEFAULT_PORT {
            directive("Port", &self.port);
        }
        directive("IdentityFile", &quote_arg(&self.identity));
        directive("ProxyJump", &self.proxy_jump);
        directive("RemoteCommand", &self.remote_command);
        directive("RequestTTY", &self.request_tty);
        for line in self.options.lines().map(str::trim).filter(|l| !l.is_empty()) {
            out.push(format!("{INDENT}{line}"));
        }
        out
    }
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value)
}

///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::HostRecord;

    #[test]
    fn defaults() {
        let r = HostRecord::new("web");
        assert_eq!(r.port, "22");
        assert_eq!(r.render(), vec!["Host web"]);
    }

    #[test]
    fn apply_directives() {
        let mut r = HostRecord::new("web");
        r.apply("hostname", "web.example.com", "HostName web.example.com", false);
        r.apply("identityfile", "\"~/.ssh/my key\"", "IdentityFile \"~/.ssh/my key\"", false);
        r.apply("forwardagent", "yes", "ForwardAgent yes", false);
        r.apply("serveraliveinterval", "30", "ServerAliveInterval=30", false);
        assert_eq!(r.hostname, "web.example.com");
        assert_eq!(r.identity, "~/.ssh/my key");
        assert_eq!(r.options, "ForwardAgent yes\nServerAliveInterval=30");
    }

    #[test]
    fn first_value_wins() {
        let mut r = HostRecord::new("web");
        r.apply("hostname", "first", "HostName first", false);
        r.apply("port", "2200", "Port 2200", false);
        r.apply("hostname", "second", "HostName second", true);
        r.apply("port", "2201", "Port=2201", true);
        r.apply("identityfile", "~/.ssh/k1", "IdentityFile ~/.ssh/k1", false);
        r.apply("identityfile", "~/.ssh/k2", "IdentityFile ~/.ssh/k2", true);
        assert_eq!(r.hostname, "first");
        assert_eq!(r.port, "2200");
        assert_eq!(r.identity, "~/.ssh/k1");
        assert_eq!(
            r.options,
            "HostName second\nPort=2201\nIdentityFile ~/.ssh/k2"
        );
    }

    #[test]
    fn render_order() {
        let r = HostRecord {
            name: "db".into(),
            hostname: "db.example.com".into(),
            user: "admin".into(),
            port: "2222".into(),
            identity: "/keys/my key".into(),
            proxy_jump: "bastion".into(),
            remote_command: "tmux attach".into(),
            request_tty: "yes".into(),
            options: "ForwardAgent yes\n\n  Compression yes".into(),
            tags: vec!["prod".into(), "sql".into()],
            ..Default::default()
        };
        assert_eq!(
            r.render(),
            vec![
                "# Tags: prod, sql",
                "Host db",
                "    HostName db.example.com",
                "    User admin",
                "    Port 2222",
                "    IdentityFile \"/keys/my key\"",
                "    ProxyJump bastion",
                "    RemoteCommand tmux attach",
                "    RequestTTY yes",
                "    ForwardAgent yes",
                "    Compression yes",
            ]
        );
    }

    #[test]
    fn render_multiple_names() {
        let mut r = HostRecord::new("a");
        r.user = "root".into();
        let names = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(r.render_as(&names), vec!["Host a b", "    User root"]);
    }

    #[test]
    fn ssh_options() {
        let mut r = HostRecord::new("a");
        r.options = "ForwardAgent yes\nCompression no".into();
        assert_eq!(r.ssh_options(), "-o ForwardAgent=yes -o Compression=no");
    }
}
