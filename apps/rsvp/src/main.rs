use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{load_settings, FormController, HttpSubmissionClient, Settings, SubmitOutcome};
use shared::{
    domain::EventDetails,
    error::SUBMISSION_FAILED_MESSAGE,
    protocol::{ResponseMode, WireFormat},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rsvp", about = "Farewell invitation RSVP client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Leave a note for the hosts.
    Send(SendArgs),
    /// Print the date, time and venue.
    Details,
}

#[derive(Args, Debug)]
struct SendArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    message: String,
    /// Collector URL; overrides `rsvp.toml` and `RSVP_ENDPOINT`.
    #[arg(long)]
    endpoint: Option<String>,
    /// `multipart` or `json`.
    #[arg(long)]
    format: Option<WireFormat>,
    /// Do not inspect the response status.
    #[arg(long)]
    opaque: bool,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl SendArgs {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(format) = self.format {
            settings.wire_format = format;
        }
        if self.opaque {
            settings.response_mode = ResponseMode::Opaque;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Details => {
            let details = EventDetails::default();
            println!("Date:  {}", details.date);
            println!("Time:  {}", details.time);
            println!("Venue: {}", details.venue);
            Ok(())
        }
        Command::Send(args) => send(args).await,
    }
}

async fn send(args: SendArgs) -> Result<()> {
    let mut settings = load_settings()?;
    args.apply_overrides(&mut settings);
    let thank_you = submit_rsvp(&settings, args.name, args.message).await?;
    println!("{thank_you}");
    println!("Your message has been beautifully recorded ✦");
    Ok(())
}

/// Runs one submission and returns the thank-you line. Every non-success
/// outcome is an error so the process exits non-zero.
async fn submit_rsvp(settings: &Settings, name: String, message: String) -> Result<String> {
    tracing::info!(
        endpoint = %settings.endpoint,
        wire_format = %settings.wire_format,
        response_mode = %settings.response_mode,
        timeout_secs = settings.timeout_secs,
        "rsvp: submitting"
    );

    let controller = FormController::new(HttpSubmissionClient::new(settings)?);
    controller.set_name(name);
    controller.set_message(message);

    match controller.submit().await {
        SubmitOutcome::Submitted => controller
            .view()
            .thank_you
            .context("submitted form has no thank-you line"),
        SubmitOutcome::Incomplete => {
            bail!("a name and a non-blank message are both required")
        }
        SubmitOutcome::Failed => bail!(SUBMISSION_FAILED_MESSAGE),
        outcome @ (SubmitOutcome::AlreadyInFlight
        | SubmitOutcome::AlreadySubmitted
        | SubmitOutcome::Stale) => {
            bail!("submission was not attempted: {outcome:?}")
        }
    }
}
