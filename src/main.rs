//! llmsay - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use llmsay::{
    cli::{display, prompt, resolve_config_path, Args, Commands, SpinnerSink},
    Credentials, ModelRouter, Provider,
};
use std::path::PathBuf;

/// Exit code after Ctrl-C, matching shell convention for SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        display::show_error(&e);
        std::process::exit(2);
    }

    if let Err(e) = llmsay::logging::init(args.verbosity()) {
        display::show_warning(&e.to_string());
    }

    let code = match run(&args).await {
        Ok(code) => code,
        Err(e) => {
            display::show_error(&format!("{:#}", e));
            1
        }
    };

    std::process::exit(code);
}

async fn run(args: &Args) -> Result<i32> {
    match &args.command {
        Some(Commands::Configure {
            provider,
            key,
            file,
        }) => configure(provider, key, file.as_ref()),
        Some(Commands::Models) => list_models(),
        None => ask(args).await,
    }
}

/// Stream one completion to stdout
async fn ask(args: &Args) -> Result<i32> {
    let router = ModelRouter::builtin();

    // Model and credentials are settled before stdin or the network
    let config_path = args.config_path()?;
    let client = router
        .client_from_config(&args.model, &config_path)?
        .with_max_tokens(args.max_tokens);

    let prompt = prompt::acquire(args.prompt.as_deref())?;

    let spinner = if args.verbosity().show_progress() {
        display::waiting_spinner(&args.model)
    } else {
        None
    };
    let mut sink = SpinnerSink::new(std::io::stdout(), spinner);

    tokio::select! {
        result = client.stream_completion(&args.model, &prompt, &mut sink) => {
            let outcome = result.with_context(|| {
                format!("{} stream for model {} failed", client.provider(), args.model)
            });
            // Partial output stays; just close the line before reporting
            sink.finish_line().ok();
            outcome?;
            Ok(0)
        }
        _ = tokio::signal::ctrl_c() => {
            sink.finish_line().ok();
            display::show_warning("Interrupted");
            Ok(EXIT_INTERRUPTED)
        }
    }
}

/// Store an API key for a provider, keeping other entries
fn configure(provider: &str, key: &str, file: Option<&PathBuf>) -> Result<i32> {
    let provider: Provider = provider.parse()?;
    let path = resolve_config_path(file)?;

    let mut credentials = Credentials::load_or_default(&path)?;
    credentials.set_key(provider, key);
    credentials
        .save(&path)
        .with_context(|| format!("Could not save {}", path.display()))?;

    display::show_success(&format!(
        "Saved {} key to {}",
        provider,
        path.display()
    ));
    Ok(0)
}

fn list_models() -> Result<i32> {
    let router = ModelRouter::builtin();

    println!("Available models:");
    for (model, provider) in router.routes() {
        println!("  • {} {}", format!("{:<16}", model).bold(), provider.to_string().dimmed());
    }

    Ok(0)
}
