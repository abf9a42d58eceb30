//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use libsmith::core::options::{TestEnvironment, UnitTestRunner};
use libsmith::util::shell::ColorChoice;

/// libsmith - Scaffold libraries in Nx-style workspaces
#[derive(Parser)]
#[command(name = "libsmith")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, env = "LIBSMITH_COLOR", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a library in the current workspace
    Library(LibraryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct LibraryArgs {
    /// Library name
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Library name (same as NAME)
    #[arg(long = "name", value_name = "NAME", conflicts_with = "name")]
    pub name_flag: Option<String>,

    /// Directory the library is placed in, under the libs directory
    #[arg(long, short = 'd')]
    pub directory: Option<String>,

    /// Package name the library is imported by
    #[arg(long = "importPath", visible_alias = "import-path", value_name = "PATH")]
    pub import_path: Option<String>,

    /// Comma-separated tags (e.g. scope:shared,type:util)
    #[arg(long, short = 't')]
    pub tags: Option<String>,

    /// Generate a publishable library
    #[arg(long)]
    pub publishable: bool,

    /// Generate a buildable library (`--buildable=false` overrides config)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_name = "BOOL")]
    pub buildable: Option<bool>,

    /// Generate JavaScript files instead of TypeScript (`--js=false` overrides config)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_name = "BOOL")]
    pub js: Option<bool>,

    /// Test runner for unit tests: jest, none
    #[arg(long = "unitTestRunner", visible_alias = "unit-test-runner", value_name = "RUNNER")]
    pub unit_test_runner: Option<UnitTestRunner>,

    /// Compilation root passed to the build target
    #[arg(long = "rootDir", visible_alias = "root-dir", value_name = "DIR")]
    pub root_dir: Option<String>,

    /// Jest test environment: node, jsdom
    #[arg(long = "testEnvironment", visible_alias = "test-environment", value_name = "ENV")]
    pub test_environment: Option<TestEnvironment>,

    /// Do not format the generated files (`--skipFormat=false` overrides config)
    #[arg(
        long = "skipFormat",
        visible_alias = "skip-format",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub skip_format: Option<bool>,

    /// Do not add the import path to tsconfig.base.json
    #[arg(long = "skipTsConfig", visible_alias = "skip-ts-config")]
    pub skip_ts_config: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl LibraryArgs {
    /// The library name, from NAME or `--name`.
    pub fn library_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.name_flag.as_deref())
    }
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "libsmith",
            "library",
            "foo",
            "--verbose",
            "--color",
            "never",
            "--message-format",
            "json",
        ]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.message_format, MessageFormat::Json);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["libsmith", "-q", "-v", "library", "foo"]).is_err());
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["libsmith", "completions", "bash"]);
        match cli.command {
            Commands::Completions(args) => assert_eq!(args.shell, CompletionShell::Bash),
            _ => panic!("expected completions"),
        }
    }
}
