//! `libsmith library` command

use std::time::Instant;

use anyhow::Result;

use crate::cli::LibraryArgs;
use libsmith::core::errors::GenerateError;
use libsmith::core::options::LibraryOptions;
use libsmith::ops::generate_library::{generate_library, GeneratorSettings};
use libsmith::util::config::Config;
use libsmith::util::shell::{format_duration, Shell, Status};
use libsmith::util::GlobalContext;

/// Build generator options from the command line, filling gaps from config.
///
/// Flags win; config fills in what was not given.
pub fn library_options(args: &LibraryArgs, config: &Config) -> Result<LibraryOptions, GenerateError> {
    let name = args
        .library_name()
        .ok_or_else(|| GenerateError::config("a library name is required (pass NAME or --name)"))?;

    let defaults = &config.library;

    Ok(LibraryOptions {
        name: name.to_string(),
        directory: args.directory.clone(),
        import_path: args.import_path.clone(),
        tags: args.tags.clone(),
        publishable: args.publishable,
        buildable: args.buildable.or(defaults.buildable).unwrap_or(false),
        js: args.js.or(defaults.js).unwrap_or(false),
        unit_test_runner: args
            .unit_test_runner
            .or(defaults.unit_test_runner)
            .unwrap_or_default(),
        test_environment: args
            .test_environment
            .or(defaults.test_environment)
            .unwrap_or_default(),
        root_dir: args.root_dir.clone(),
        skip_format: args.skip_format.or(defaults.skip_format).unwrap_or(false),
        skip_ts_config: args.skip_ts_config,
    })
}

pub fn execute(args: LibraryArgs, shell: &Shell, ctx: &GlobalContext) -> Result<()> {
    let start = Instant::now();

    let (workspace, config) = ctx.workspace()?;
    let options = library_options(&args, &config)?;
    let settings = GeneratorSettings::from_config(&config)?;

    shell.status(
        Status::Generating,
        format!("library `{}`", options.name),
    );

    let result = generate_library(&workspace, &options, &settings, args.dry_run)?;

    for change in &result.changes {
        shell.file_change(change, result.dry_run);
    }

    shell.json_event(&serde_json::json!({
        "reason": "library-generated",
        "project": result.options.name,
        "root": result.options.project_root,
        "import_path": result.options.import_path,
        "changes": result.changes.len(),
        "dry_run": result.dry_run
    }));

    if result.dry_run {
        shell.warn("dry run; no changes were written");
    } else {
        shell.status(
            Status::Finished,
            format!(
                "`{}` at {} in {}",
                result.options.name,
                result.options.project_root,
                format_duration(start.elapsed())
            ),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use libsmith::core::options::{TestEnvironment, UnitTestRunner};
    use libsmith::util::config::LibraryConfig;

    /// Helper to parse LibraryArgs from command-line strings.
    fn parse_library_args(args: &[&str]) -> LibraryArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            library: LibraryArgs,
        }
        TestCli::parse_from(args).library
    }

    // =========================================================================
    // Name Tests
    // =========================================================================

    #[test]
    fn test_positional_name() {
        let args = parse_library_args(&["test", "foo"]);
        assert_eq!(args.library_name(), Some("foo"));
        assert!(!args.publishable);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_name_flag() {
        let args = parse_library_args(&["test", "--name", "foo"]);
        assert_eq!(args.library_name(), Some("foo"));
    }

    #[test]
    fn test_missing_name() {
        let args = parse_library_args(&["test"]);
        let err = library_options(&args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("library name is required"));
    }

    // =========================================================================
    // Flag Spelling Tests
    // =========================================================================

    #[test]
    fn test_camel_case_flags() {
        let args = parse_library_args(&[
            "test",
            "foo",
            "--directory",
            "shared",
            "--importPath",
            "@acme/foo",
            "--unitTestRunner",
            "none",
            "--testEnvironment",
            "jsdom",
            "--rootDir",
            "libs/shared",
            "--skipFormat",
            "--skipTsConfig",
        ]);

        assert_eq!(args.directory.as_deref(), Some("shared"));
        assert_eq!(args.import_path.as_deref(), Some("@acme/foo"));
        assert_eq!(args.unit_test_runner, Some(UnitTestRunner::None));
        assert_eq!(args.test_environment, Some(TestEnvironment::Jsdom));
        assert_eq!(args.root_dir.as_deref(), Some("libs/shared"));
        assert_eq!(args.skip_format, Some(true));
        assert!(args.skip_ts_config);
    }

    #[test]
    fn test_kebab_case_aliases() {
        let args = parse_library_args(&[
            "test",
            "foo",
            "--import-path",
            "@acme/foo",
            "--unit-test-runner",
            "jest",
            "--skip-format",
        ]);

        assert_eq!(args.import_path.as_deref(), Some("@acme/foo"));
        assert_eq!(args.unit_test_runner, Some(UnitTestRunner::Jest));
        assert_eq!(args.skip_format, Some(true));
    }

    #[test]
    fn test_invalid_runner_is_rejected() {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            library: LibraryArgs,
        }
        assert!(TestCli::try_parse_from(["test", "foo", "--unitTestRunner", "mocha"]).is_err());
    }

    // =========================================================================
    // Config Merge Tests
    // =========================================================================

    #[test]
    fn test_config_fills_defaults() {
        let config = Config {
            library: LibraryConfig {
                unit_test_runner: Some(UnitTestRunner::None),
                test_environment: Some(TestEnvironment::Jsdom),
                js: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let opts = library_options(&parse_library_args(&["test", "foo"]), &config).unwrap();
        assert_eq!(opts.unit_test_runner, UnitTestRunner::None);
        assert_eq!(opts.test_environment, TestEnvironment::Jsdom);
        assert!(opts.js);
        assert!(!opts.buildable);
    }

    #[test]
    fn test_flags_win_over_config() {
        let config = Config {
            library: LibraryConfig {
                unit_test_runner: Some(UnitTestRunner::None),
                ..Default::default()
            },
            ..Default::default()
        };

        let args = parse_library_args(&["test", "foo", "--unitTestRunner", "jest", "--publishable"]);
        let opts = library_options(&args, &config).unwrap();
        assert_eq!(opts.unit_test_runner, UnitTestRunner::Jest);
        assert!(opts.publishable);
    }

    #[test]
    fn test_flag_turns_off_config_boolean() {
        let config = Config {
            library: LibraryConfig {
                js: Some(true),
                buildable: Some(true),
                skip_format: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let args = parse_library_args(&["test", "--js=false", "--buildable=false", "foo"]);
        assert_eq!(args.js, Some(false));
        assert_eq!(args.library_name(), Some("foo"));

        let opts = library_options(&args, &config).unwrap();
        assert!(!opts.js);
        assert!(!opts.buildable);
        assert!(opts.skip_format);
    }

    #[test]
    fn test_bare_boolean_flags() {
        let args = parse_library_args(&["test", "--js", "--buildable", "foo"]);
        assert_eq!(args.js, Some(true));
        assert_eq!(args.buildable, Some(true));
        assert!(args.skip_format.is_none());
        assert_eq!(args.library_name(), Some("foo"));
    }

    #[test]
    fn test_builtin_defaults() {
        let opts =
            library_options(&parse_library_args(&["test", "foo"]), &Config::default()).unwrap();
        assert_eq!(opts.unit_test_runner, UnitTestRunner::Jest);
        assert_eq!(opts.test_environment, TestEnvironment::Node);
        assert!(!opts.js);
        assert!(opts.import_path.is_none());
    }
}
