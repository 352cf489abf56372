//! CLI channel: stdin/stdout REPL for driving the co-pilot locally.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, InputStream, StatusUpdate};
use crate::error::ChannelError;
use crate::model::{ChatMessage, Role};

/// Reads lines from stdin and prints the conversation to stdout.
#[derive(Debug, Default)]
pub struct CliChannel {
    /// Stdin has a single reader; a second `start` is refused.
    started: AtomicBool,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_stdin(&self) -> Result<(), ChannelError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ChannelError::StartupFailed {
                name: "cli".to_string(),
                reason: "stdin reader already running".to_string(),
            });
        }
        Ok(())
    }
}

/// Render an assistant message the way the panel shows it.
pub fn format_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        Role::Assistant => "Co-pilot",
        Role::User => "You",
    };
    format!("[{}] {}:\n{}", message.timestamp, speaker, message.content)
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<InputStream, ChannelError> {
        self.claim_stdin()?;
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let reader = BufReader::new(tokio::io::stdin());
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|line| (line, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn render(&self, message: &ChatMessage) -> Result<(), ChannelError> {
        // The terminal already shows what the user typed
        if message.role == Role::User {
            return Ok(());
        }
        {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "\n{}\n", format_message(message))
                .and_then(|()| stdout.flush())
                .map_err(|e| ChannelError::SendFailed {
                    name: self.name().to_string(),
                    reason: e.to_string(),
                })?;
        }
        eprint!("> ");
        Ok(())
    }

    async fn status(&self, status: StatusUpdate) -> Result<(), ChannelError> {
        match status {
            StatusUpdate::Typing(true) => eprintln!("⏳ Co-pilot is typing..."),
            StatusUpdate::Typing(false) => {}
            StatusUpdate::ModeChanged { from, to } => {
                eprintln!("ℹ️  Mode: {} → {}", from.label(), to.label());
            }
            StatusUpdate::SearchStarted(sources) => {
                let labels: Vec<_> = sources.iter().map(|s| s.label()).collect();
                eprintln!("🔎 Searching {}", labels.join(", "));
            }
            StatusUpdate::RulesChanged(scope) => eprintln!("✅ {} rules updated", scope),
            StatusUpdate::Info(msg) => eprintln!("ℹ️  {}", msg),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_timestamp_and_speaker() {
        let message = ChatMessage::assistant("Hello").with_timestamp("10:00 AM");
        assert_eq!(format_message(&message), "[10:00 AM] Co-pilot:\nHello");

        let message = ChatMessage::user("Hi").with_timestamp("10:01 AM");
        assert_eq!(format_message(&message), "[10:01 AM] You:\nHi");
    }

    #[test]
    fn stdin_can_only_be_claimed_once() {
        let channel = CliChannel::new();
        assert!(channel.claim_stdin().is_ok());
        match channel.claim_stdin() {
            Err(ChannelError::StartupFailed { name, .. }) => assert_eq!(name, "cli"),
            other => panic!("expected StartupFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn user_turns_are_not_echoed() {
        let channel = CliChannel::new();
        assert!(channel.render(&ChatMessage::user("hi")).await.is_ok());
    }

    #[test]
    fn typing_event_maps_to_status() {
        use crate::copilot::SessionEvent;

        assert_eq!(
            StatusUpdate::from_event(&SessionEvent::TypingChanged(true)),
            Some(StatusUpdate::Typing(true))
        );
        let appended = SessionEvent::MessageAppended(ChatMessage::assistant("x"));
        assert_eq!(StatusUpdate::from_event(&appended), None);
    }
}
