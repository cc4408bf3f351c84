use anyhow::{Context, Result};
use compatgen::cli::{parse_args, Cli};
use compatgen::config::{load_config, GenerateOptions};
use compatgen::observability::install_panic_hook;
use compatgen::{run_generate, CompatError};
use tracing_subscriber::EnvFilter;

fn main() {
    install_panic_hook();
    let cli = parse_args();
    init_tracing(&cli);

    if let Err(err) = run(&cli) {
        eprintln!("{err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    let file_config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let options = GenerateOptions::resolve(cli.overrides(), file_config)?;
    tracing::debug!(?options, "options resolved");

    let outcome = run_generate(&options)?;

    println!("Loaded {} previous native signatures.", outcome.loaded);
    match &outcome.written {
        Some(path) => println!(
            "{} change(s) found, compatibility file generated at '{}'",
            outcome.changes,
            path.display()
        ),
        None => println!(
            "{} change(s) found, skipped compatibility file generation.",
            outcome.changes
        ),
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CompatError>())
        .map_or(1, CompatError::exit_code)
}
