// sshdir top-level command-line arguments
// (c) 2024 Ross Younger

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version,
    about,
    before_help = "e.g.   sshdir list\n       sshdir exists my-server",
    infer_long_args(true)
)]
#[command(help_template(
    "\
{name} version {version}
{about-with-newline}
{usage-heading} {usage}
{before-help}
{all-args}{after-help}
"
))]
#[command(styles=super::styles::CLAP_STYLES)]
pub(crate) struct CliArgs {
    /// The ssh client configuration file to read and edit
    ///
    /// [default: from the application configuration, else `~/.ssh/config`]
    #[arg(short = 'F', long, value_name("FILE"), global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode
    ///
    /// Reports only errors
    #[arg(short, long, action, conflicts_with("debug"), global = true)]
    pub quiet: bool,

    // DEBUG ----------------------------
    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=sshdir=trace` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action, help_heading("Debug"), global = true)]
    pub debug: bool,
    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(
        short('l'),
        long,
        action,
        help_heading("Debug"),
        value_name("FILE"),
        global = true
    )]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Lists every host, following Include directives
    List {
        /// Outputs JSON instead of a table
        #[arg(long, action)]
        json: bool,
    },
    /// Checks whether a host is declared. Exit status is 0 if it is, 1 if not.
    Exists {
        /// Host name
        name: String,
    },
    /// Lists the config files reached through Include directives
    Files,
    /// Outputs a host's block, as it would be written out
    Show {
        /// Host name
        name: String,
    },
    /// Removes a host from the file which declares it
    Delete {
        /// Host name
        name: String,
    },
    /// Moves a host to another config file
    Move {
        /// Host name
        name: String,
        /// The file to move it to
        destination: PathBuf,
    },
    /// Converts `-o Key=Value ...` options to config file lines
    OptionsToConfig {
        /// The options, as a single argument
        #[arg(allow_hyphen_values(true))]
        options: String,
    },
    /// Converts config file lines to `-o Key=Value ...` options
    OptionsToCommand {
        /// The config lines, as a single argument
        options: String,
    },
    /// Outputs the application configuration, where each value came from, and the files consulted
    ShowConfig,
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use clap::{CommandFactory as _, Parser as _};

    use super::{CliArgs, Command};

    #[test]
    fn definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parsing() {
        let args = CliArgs::try_parse_from(["sshdir", "-F", "/x/config", "move", "web", "/y"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/x/config")));
        assert_eq!(
            args.command,
            Command::Move {
                name: "web".into(),
                destination: "/y".into()
            }
        );

        let args = CliArgs::try_parse_from(["sshdir", "options-to-config", "-o A=1 -oB=2"]).unwrap();
        assert_eq!(
            args.command,
            Command::OptionsToConfig {
                options: "-o A=1 -oB=2".into()
            }
        );
        let args = CliArgs::try_parse_from(["sshdir", "list", "--json", "--debug"]).unwrap();
        assert!(args.debug);
        assert_eq!(args.command, Command::List { json: true });

        let _ = CliArgs::try_parse_from(["sshdir", "-d", "-q", "files"]).unwrap_err();
        let _ = CliArgs::try_parse_from(["sshdir"]).unwrap_err();
    }
}
