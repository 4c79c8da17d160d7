//! release-helper - action entry point.
//!
//! Logs go to stderr. Stdout carries only the encoded result line, which is
//! printed last on every run, including failed ones.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_helper::config::ActionConfig;
use release_helper::github::GitHubHost;
use release_helper::release::default_output;
use release_helper::{ActionArgs, Outcome, ReleaseManager};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match ActionArgs::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            println!("{}", default_output());
            return Err(anyhow::Error::new(e).context("Failed to read action inputs"));
        }
    };
    init_tracing(args.verbose);

    match run(args).await {
        Ok(outcome) => {
            println!("{}", outcome.output_line());
            Ok(())
        }
        Err(e) => {
            println!("{}", default_output());
            Err(e)
        }
    }
}

async fn run(args: ActionArgs) -> Result<Outcome> {
    let config: ActionConfig = args.into_config().context("Invalid action inputs")?;

    let host = GitHubHost::new(
        &config.github.token,
        &config.github.repo.owner,
        &config.github.repo.name,
        &config.github.organization,
        config.github.api_url.as_deref(),
    )
    .context("Failed to set up GitHub access")?;

    let outcome = ReleaseManager::new(&host, &config.release)
        .run()
        .await
        .with_context(|| format!("Operation '{}' failed", config.release.operation))?;

    tracing::debug!("Finished with {:?}", outcome);
    Ok(outcome)
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
