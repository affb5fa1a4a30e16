#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use treepath_core::config;
use treepath_core::error::ErrorCode;

#[derive(Parser, Debug)]
#[command(
    name = "tp",
    author,
    version,
    about = "tp: find a node in tree-shaped data and print its ancestor path",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Suppress non-essential output. Results are always printed.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Find the first matching node",
        long_about = "Search a forest depth-first (pre-order) and print the path from the root to the first node matching every --where clause.",
        after_help = "EXAMPLES:\n    # Find node 4 in a JSON forest\n    tp find tree.json --where id==4\n\n    # Combine clauses and use a custom children field\n    tp find menu.yaml -w 'name~child' -w 'id>5' --children-key items\n\n    # Read from stdin and emit JSON\n    cat tree.json | tp find -w id==4 --json"
    )]
    Find(cmd::find::FindArgs),

    #[command(
        about = "Show effective configuration",
        long_about = "Show the configuration resolved from .treepath.toml, the user config file and defaults."
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tp completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn default_log_filter(verbose: bool, quiet: bool, debug_env: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose || debug_env {
        "treepath=debug,info"
    } else {
        "treepath=info,warn"
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("TREEPATH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_log_filter(
            verbose,
            quiet,
            env::var("DEBUG").is_ok(),
        ))
    });

    let format = env::var("TREEPATH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, output: OutputMode, config: &config::TreepathConfig) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    match cli.command {
        Commands::Find(ref args) => cmd::find::run_find(args, config, output),
        Commands::Config(ref args) => cmd::config::run_config(args, config, &project_root, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    // Config decides the output mode, so its errors render with flags only.
    let early_mode = resolve_output_mode(cli.format, cli.json, None);
    let loaded = env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|root| config::load_effective_config(&root));
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            let cli_error = CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError);
            let _ = render_error(early_mode, &cli_error);
            return ExitCode::FAILURE;
        }
    };

    let output = resolve_output_mode(cli.format, cli.json, config.output.format);
    debug!(?output, "output mode resolved");

    match run(cli, output, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = render_error(output, &CliError::from_anyhow(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_subcommand_parses_clauses() {
        let cli = Cli::parse_from(["tp", "find", "tree.json", "-w", "id==4", "--where", "name~x"]);
        let Commands::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert_eq!(args.input.as_deref(), Some(std::path::Path::new("tree.json")));
        assert_eq!(args.clauses, vec!["id==4", "name~x"]);
        assert!(args.children_key.is_none());
        assert!(!args.fail_on_miss);
    }

    #[test]
    fn find_accepts_children_key_and_format() {
        let cli = Cli::parse_from([
            "tp",
            "find",
            "-k",
            "items",
            "--input-format",
            "yaml",
            "--fail-on-miss",
        ]);
        let Commands::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert!(args.input.is_none());
        assert_eq!(args.children_key.as_deref(), Some("items"));
        assert_eq!(
            args.input_format,
            Some(treepath_core::decode::InputFormat::Yaml)
        );
        assert!(args.fail_on_miss);
    }

    #[test]
    fn unknown_input_format_is_rejected() {
        let result = Cli::try_parse_from(["tp", "find", "--input-format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["tp", "find", "-w", "id=1", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["tp", "--format", "text", "config"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn quiet_flag_parsed() {
        let cli = Cli::parse_from(["tp", "-q", "find"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tp", "-q", "-v", "find"]).is_err());
    }

    #[test]
    fn quiet_only_limits_logging() {
        assert_eq!(default_log_filter(false, true, true), "error");
        assert_eq!(default_log_filter(true, false, false), "treepath=debug,info");
        assert_eq!(default_log_filter(false, false, true), "treepath=debug,info");
        assert_eq!(default_log_filter(false, false, false), "treepath=info,warn");
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tp", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn command_is_named_after_binary() {
        assert_eq!(Cli::command().get_name(), "tp");
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
