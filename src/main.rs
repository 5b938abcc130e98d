mod config;
mod error;
mod output;
mod poster;
#[cfg(test)]
mod test_server;
mod types;
mod validate;

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Args;
use crate::error::Result;
use crate::output::OutputTarget;
use crate::poster::Poster;
use crate::types::*;
use crate::validate::{validate, Submission};

fn main() -> ExitCode {
    // stdout is reserved for legacy output markers
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let build = BuildInfo::current();
    tracing::info!(
        version = build.version,
        revision = build.revision,
        build_time = build.build_time,
        "toot-action starting"
    );

    match run(args, &build, &OutputTarget::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            tracing::error!("{:#}", anyhow::Error::new(e));
            ExitCode::from(code)
        }
    }
}

fn run(args: Args, build: &BuildInfo, target: &OutputTarget) -> Result<()> {
    let submission = prepare(args, Utc::now())?;
    let poster = Poster::new(&submission.url, &submission.access_token, build)?;
    submit(&poster, &submission, target)?;
    Ok(())
}

/// Everything that can fail before a request goes out.
fn prepare(args: Args, now: DateTime<Utc>) -> Result<Submission> {
    validate(args.resolve()?, now)
}

fn submit(poster: &Poster, submission: &Submission, target: &OutputTarget) -> Result<Outcome> {
    let outcome = poster.post_status(&submission.request)?;
    match &outcome {
        Outcome::Posted(s) => {
            tracing::debug!(content = %s.content, "rendered status");
            tracing::info!(
                id = %s.id,
                url = %s.url,
                created_at = %s.created_at,
                visibility = %s.visibility,
                "status posted"
            )
        }
        Outcome::Scheduled(s) => {
            tracing::info!(id = %s.id, scheduled_at = %s.scheduled_at, "status scheduled")
        }
    }
    // The status exists at this point, so a reporting failure does not fail the step
    if let Err(e) = target.set_outputs(&outcome.outputs()) {
        tracing::error!("cannot write step outputs: {e}");
    }
    Ok(outcome)
}
