use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;

use sourcing_copilot::channels::{Channel, CliChannel, StatusUpdate};
use sourcing_copilot::config::CopilotConfig;
use sourcing_copilot::copilot::{
    CopilotSession, Input, InputParser, Mode, ModeRequest, SearchCallback, SessionEvent,
    templates,
};
use sourcing_copilot::error::Result;
use sourcing_copilot::model::SourceKey;
use sourcing_copilot::repository::{CandidateRepository, InMemoryRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    run().await?;
    Ok(())
}

async fn run() -> Result<()> {
    let config = CopilotConfig::from_env()?;
    let job_id = config.job_id.clone();
    let repo = InMemoryRepository::with_fixtures();
    let job = repo.job(&job_id).await?;

    eprintln!("🤖 Sourcing Co-pilot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Job: {} ({})", job.title, job.id);
    eprintln!("   Location: {}", job.location);
    eprintln!("   Type a message and press Enter. /help for commands, /quit to exit.\n");

    let on_search: SearchCallback = Box::new(|sources: &[SourceKey]| {
        let labels: Vec<_> = sources.iter().map(|s| s.label()).collect();
        tracing::info!(sources = %labels.join(", "), "Refreshing candidate pools");
    });
    let session = CopilotSession::open(&repo, config, Some(on_search)).await?;
    let channel = Arc::new(CliChannel::new());

    for message in session.messages().await {
        channel.render(&message).await?;
    }
    channel
        .status(StatusUpdate::Info(format!(
            "Try /suggest <n>:\n{}",
            templates::suggestion_chips()
        )))
        .await?;

    // ── Renderer ────────────────────────────────────────────────────────
    let mut events = session.subscribe();
    let renderer = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Renderer fell behind");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let result = match &event {
                    SessionEvent::MessageAppended(message) => channel.render(message).await,
                    other => match StatusUpdate::from_event(other) {
                        Some(status) => channel.status(status).await,
                        None => Ok(()),
                    },
                };
                if let Err(e) = result {
                    tracing::error!("Render failed: {}", e);
                }
            }
        })
    };

    // ── Input loop ──────────────────────────────────────────────────────
    let mut input = channel.start().await?;
    while let Some(line) = input.next().await {
        match InputParser::parse(&line) {
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Text(text) => session.submit_text(&text).await,
            Input::Action(action) => session.apply(action).await,
            Input::SwitchMode { mode, count } => {
                let candidates = if mode.requires_candidates() {
                    repo.all_candidates(&job_id)
                        .await?
                        .into_iter()
                        .take(count.unwrap_or(1))
                        .collect()
                } else {
                    Vec::new()
                };
                session
                    .enter_mode(ModeRequest::new(mode).with_candidates(candidates))
                    .await;
            }
            Input::Suggest(None) => {
                channel
                    .status(StatusUpdate::Info(templates::suggestion_chips()))
                    .await?;
            }
            Input::Suggest(Some(n)) => {
                if !session.submit_suggestion(n).await {
                    channel
                        .status(StatusUpdate::Info(format!(
                            "There is no suggestion {n}. Pick 1 to {}.",
                            templates::CHAT_SUGGESTIONS.len()
                        )))
                        .await?;
                }
            }
            Input::Unknown(command) => {
                channel
                    .status(StatusUpdate::Info(format!(
                        "Unknown command {command}. Type /help for the list."
                    )))
                    .await?;
            }
        }
    }

    session.settle().await;
    renderer.abort();
    eprintln!("Goodbye.");
    Ok(())
}

fn print_help() {
    let modes: Vec<String> = Mode::ALL.iter().map(|m| m.to_string()).collect();
    eprintln!("Commands:");
    eprintln!("  /mode <mode> [n]     enter a mode for the top n candidates");
    eprintln!("                       modes: {}", modes.join(", "));
    eprintln!("  /channel <name>      pick whatsapp, email or linkedin");
    eprintln!("  /edit <text>         replace the outreach draft");
    eprintln!("  /send                send the outreach draft");
    eprintln!("  /source <key>        toggle talentMatch, syndication or autoSourcing");
    eprintln!("  /start               start the refined search");
    eprintln!("  /add                 add a rule");
    eprintln!("  /toggle <n|id>       pause or resume a rule");
    eprintln!("  /delete <n|id>       delete a rule");
    eprintln!("  /cancel              leave the current flow");
    eprintln!("  /suggest [n]         list suggestions, or send suggestion n");
    for chip in templates::suggestion_chips().lines() {
        eprintln!("                       {chip}");
    }
    eprintln!("  /quit                exit");
}
