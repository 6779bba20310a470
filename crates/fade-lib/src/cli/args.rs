use crate::config::ProjectType;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8264";

/// Project fields settable on the command line. Shared by `init` and `edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, ClapArgs)]
pub struct ProjectOptions {
    #[arg(long, value_name = "NAME", help = "Package name")]
    pub name: Option<String>,

    #[arg(long = "version", value_name = "VERSION", help = "Package version")]
    pub package_version: Option<String>,

    #[arg(
        long,
        visible_alias = "desc",
        value_name = "TEXT",
        help = "Package description; the first line is the synopsis"
    )]
    pub description: Option<String>,

    #[arg(long, value_name = "URL", help = "Project homepage")]
    pub url: Option<String>,

    #[arg(long, value_name = "PRIORITY", help = "Debian priority (default: optional)")]
    pub priority: Option<String>,

    #[arg(
        long,
        visible_alias = "arch",
        value_name = "ARCH",
        help = "Debian architecture (default: all)"
    )]
    pub architecture: Option<String>,

    #[arg(
        long,
        visible_alias = "cmdline",
        value_name = "COMMAND",
        help = "Command line executed by the launcher"
    )]
    pub run: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub maintainer_name: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub maintainer_email: Option<String>,

    #[arg(long = "type", value_enum, value_name = "TYPE", help = "Launcher type")]
    pub project_type: Option<ProjectType>,

    #[arg(
        long = "depend",
        visible_aliases = ["dependency", "depends"],
        value_name = "DEP",
        help = "Dependency specification; replaces the whole list (repeatable)",
        action = ArgAction::Append
    )]
    pub depends: Vec<String>,

    #[arg(
        long = "blacklist",
        value_name = "PATH",
        help = "Project-relative path excluded from the package; replaces the whole list (repeatable)",
        action = ArgAction::Append
    )]
    pub blacklist: Vec<String>,

    #[arg(long, value_name = "SCRIPT", help = "Shell snippet run by postinst")]
    pub postinst_payload: Option<String>,

    #[arg(long, value_name = "SCRIPT", help = "Shell snippet run by prerm")]
    pub prerm_payload: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "postinst_payload",
        help = "Reads the postinst payload from a file"
    )]
    pub input_postinst: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "prerm_payload",
        help = "Reads the prerm payload from a file"
    )]
    pub input_prerm: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Init {
        path: PathBuf,
        input: Option<String>,
        options: ProjectOptions,
    },
    Edit {
        path: PathBuf,
        options: ProjectOptions,
        depend_add: Vec<String>,
        depend_rm: Vec<String>,
        blacklist_add: Vec<String>,
        blacklist_rm: Vec<String>,
        edit_postinst: bool,
        edit_prerm: bool,
    },
    CreateDeb {
        path: PathBuf,
        output: Option<PathBuf>,
        host: bool,
        bind: String,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "fade",
    version,
    about = "Turn a project directory into an installable Debian package"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Create a new project in an existing directory
    Init {
        #[arg(long, value_name = "DIR", help = "Project root directory")]
        path: PathBuf,

        #[arg(
            short = 'i',
            long = "input",
            value_name = "FILE",
            help = "Imports fields from an existing configuration; explicit flags take precedence"
        )]
        input: Option<String>,

        #[command(flatten)]
        options: ProjectOptions,
    },

    /// Change the configuration of an existing project
    Edit {
        #[arg(long, value_name = "DIR", help = "Project root directory")]
        path: PathBuf,

        #[command(flatten)]
        options: ProjectOptions,

        #[arg(
            long = "depend-add",
            visible_aliases = ["dependency-add", "depends-add"],
            value_name = "DEP",
            help = "Adds a dependency (repeatable)",
            action = ArgAction::Append
        )]
        depend_add: Vec<String>,

        #[arg(
            long = "depend-rm",
            visible_aliases = ["dependency-rm", "depends-rm"],
            value_name = "DEP",
            help = "Removes a dependency (repeatable)",
            action = ArgAction::Append
        )]
        depend_rm: Vec<String>,

        #[arg(
            long = "blacklist-add",
            value_name = "PATH",
            help = "Adds a blacklist entry (repeatable)",
            action = ArgAction::Append
        )]
        blacklist_add: Vec<String>,

        #[arg(
            long = "blacklist-rm",
            value_name = "PATH",
            help = "Removes a blacklist entry (repeatable)",
            action = ArgAction::Append
        )]
        blacklist_rm: Vec<String>,

        #[arg(long, help = "Opens the postinst payload in $VISUAL or $EDITOR")]
        edit_postinst: bool,

        #[arg(long, help = "Opens the prerm payload in $VISUAL or $EDITOR")]
        edit_prerm: bool,
    },

    /// Build the .deb package of a project
    #[command(name = "create-deb", visible_alias = "deb")]
    CreateDeb {
        #[arg(long, value_name = "DIR", help = "Project root directory")]
        path: PathBuf,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "FILE",
            conflicts_with = "host",
            help = "Output file or directory (default: ./<name>_<version>_<arch>.deb)"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Serves the package over HTTP until it has been downloaded once")]
        host: bool,

        #[arg(
            long,
            value_name = "ADDR",
            default_value = DEFAULT_BIND_ADDRESS,
            help = "Address to listen on with --host"
        )]
        bind: String,
    },
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Init {
                path,
                input,
                options,
            } => Command::Init {
                path,
                input,
                options,
            },
            CliCommand::Edit {
                path,
                options,
                depend_add,
                depend_rm,
                blacklist_add,
                blacklist_rm,
                edit_postinst,
                edit_prerm,
            } => Command::Edit {
                path,
                options,
                depend_add,
                depend_rm,
                blacklist_add,
                blacklist_rm,
                edit_postinst,
                edit_prerm,
            },
            CliCommand::CreateDeb {
                path,
                output,
                host,
                bind,
            } => Command::CreateDeb {
                path,
                output,
                host,
                bind,
            },
        }
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Parses the process arguments and installs the tracing subscriber.
pub fn parse_args() -> Args {
    let cli = Cli::parse();
    let log_level = log_level(cli.verbose);

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    Args {
        command: cli.command.into(),
        log_level,
    }
}

/// Parses `args` without touching global state.
pub fn try_parse_command<I, T>(args: I) -> Result<Command, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map(|cli| cli.command.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_aliases() {
        let command = try_parse_command([
            "fade",
            "init",
            "--path",
            "/srv/demo",
            "--name",
            "demo",
            "--version",
            "1.0",
            "--desc",
            "Demo project",
            "--cmdline",
            "echo hi",
            "--type",
            "isolated",
            "--depends",
            "bash",
            "--dependency",
            "coreutils",
        ])
        .unwrap();

        let Command::Init { path, options, .. } = command else {
            panic!("expected init");
        };
        assert_eq!(path, PathBuf::from("/srv/demo"));
        assert_eq!(options.package_version.as_deref(), Some("1.0"));
        assert_eq!(options.description.as_deref(), Some("Demo project"));
        assert_eq!(options.run.as_deref(), Some("echo hi"));
        assert_eq!(options.project_type, Some(ProjectType::Isolated));
        assert_eq!(options.depends, vec!["bash", "coreutils"]);
    }

    #[test]
    fn test_edit_list_deltas() {
        let command = try_parse_command([
            "fade",
            "edit",
            "--path",
            ".",
            "--depend-add",
            "curl",
            "--depend-rm",
            "bash",
            "--blacklist-add",
            "logs/",
            "--edit-prerm",
        ])
        .unwrap();

        let Command::Edit {
            depend_add,
            depend_rm,
            blacklist_add,
            blacklist_rm,
            edit_postinst,
            edit_prerm,
            ..
        } = command
        else {
            panic!("expected edit");
        };
        assert_eq!(depend_add, vec!["curl"]);
        assert_eq!(depend_rm, vec!["bash"]);
        assert_eq!(blacklist_add, vec!["logs/"]);
        assert!(blacklist_rm.is_empty());
        assert!(!edit_postinst);
        assert!(edit_prerm);
    }

    #[test]
    fn test_create_deb_alias_and_defaults() {
        let command = try_parse_command(["fade", "deb", "--path", "."]).unwrap();

        let Command::CreateDeb {
            output, host, bind, ..
        } = command
        else {
            panic!("expected create-deb");
        };
        assert!(output.is_none());
        assert!(!host);
        assert_eq!(bind, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_output_conflicts_with_host() {
        assert!(
            try_parse_command(["fade", "create-deb", "--path", ".", "-o", "x.deb", "--host"])
                .is_err()
        );
    }

    #[test]
    fn test_path_is_required() {
        assert!(try_parse_command(["fade", "edit", "--name", "demo"]).is_err());
    }

    #[test]
    fn test_payload_text_conflicts_with_file() {
        assert!(
            try_parse_command([
                "fade",
                "edit",
                "--path",
                ".",
                "--postinst-payload",
                "echo",
                "--input-postinst",
                "post.sh",
            ])
            .is_err()
        );
    }
}
