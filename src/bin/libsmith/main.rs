//! libsmith CLI - scaffold libraries in Nx-style workspaces

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use libsmith::core::errors::GenerateError;
use libsmith::util::diagnostic;
use libsmith::util::shell::Shell;
use libsmith::util::GlobalContext;

fn main() {
    let cli = Cli::parse();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if shell.is_verbose() {
        EnvFilter::new("libsmith=debug")
    } else if shell.is_quiet() {
        EnvFilter::new("libsmith=error")
    } else {
        EnvFilter::new("libsmith=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(shell.use_color())
        .with_target(false)
        .without_time()
        .init();

    let ctx = GlobalContext::new()?;

    match cli.command {
        Commands::Library(args) => commands::library::execute(args, shell, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(e: &anyhow::Error, shell: &Shell) {
    if shell.is_json() {
        shell.error(format!("{:#}", e));
        return;
    }

    match e.downcast_ref::<GenerateError>() {
        Some(err) => diagnostic::emit(&err.to_diagnostic(), shell.use_color()),
        None => eprintln!("error: {:#}", e),
    }
}
