use std::io;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, Config};
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Initialize tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `--verbose` logs at debug and everything else
/// at warn. Logs go to stderr so stdout stays parseable.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::EnvFilter;

    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    // Path lookup must work even when the file itself is broken
    if let Commands::Config {
        command: Some(ConfigCommands::Path),
    } = &cli.command
    {
        let ctx = CommandContext::new(cli, &Config::default());
        return commands::config::execute_path(&ctx);
    }
    if let Commands::Completions { shell } = &cli.command {
        return Ok(commands::completions::execute(shell)?);
    }

    let config = load_config()?;
    let ctx = CommandContext::new(cli, &config);

    match &cli.command {
        Commands::Fmt { expr } => commands::fmt::execute(&ctx, expr),
        Commands::Sort { expr } => commands::sort::execute(&ctx, expr),
        Commands::Split { expr, chunk_size } => commands::split::execute(&ctx, expr, *chunk_size),
        Commands::Match { expr, input } => {
            commands::matching::execute(&ctx, expr, input.as_deref())
        }
        Commands::Config { .. } => commands::config::execute_show(&ctx),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(err) if err.is_syntax() => "SYNTAX_ERROR",
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Filter(_) => ExitCode::from(1),
        CommandError::Json(_) => ExitCode::from(1),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Config(_) => ExitCode::from(5),
    }
}
