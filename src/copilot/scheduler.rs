//! Reply scheduler: delivers pending replies after their simulated delay.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use super::controller::{ModeController, PendingReply};
use super::session::SessionEvent;

#[derive(Default)]
struct Tracked {
    /// Most recently scheduled delivery; the next one waits on it.
    tail: Option<JoinHandle<()>>,
    aborts: Vec<AbortHandle>,
}

/// Owns the timer tasks for in-flight replies.
///
/// Each reply gets its own task that sleeps, waits for the reply scheduled
/// before it, then hands the reply back to the controller. The controller
/// decides whether the reply is still current; the scheduler only keeps
/// replies in order and lets a mode change abort everything still waiting.
#[derive(Default)]
pub struct ReplyScheduler {
    tracked: Mutex<Tracked>,
}

impl ReplyScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a delivery task for `reply`.
    pub async fn schedule(
        &self,
        reply: PendingReply,
        controller: Arc<Mutex<ModeController>>,
        tx: broadcast::Sender<SessionEvent>,
    ) {
        let mut tracked = self.tracked.lock().await;
        let previous = tracked.tail.take();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(reply.delay).await;
            if let Some(previous) = previous {
                let _ = previous.await;
            }

            let message = reply.message.clone();
            let (delivered, typing) = {
                let mut controller = controller.lock().await;
                let delivered = controller.deliver(reply);
                (delivered, controller.is_typing())
            };

            if delivered {
                // Ok if nobody is listening
                let _ = tx.send(SessionEvent::MessageAppended(message));
                if !typing {
                    let _ = tx.send(SessionEvent::TypingChanged(false));
                }
            }
        });

        tracked.aborts.retain(|h| !h.is_finished());
        tracked.aborts.push(handle.abort_handle());
        tracked.tail = Some(handle);
    }

    /// Abort every delivery still waiting. Returns how many were aborted.
    pub async fn cancel_all(&self) -> usize {
        let mut tracked = self.tracked.lock().await;
        tracked.tail = None;
        let mut aborted = 0;
        for handle in tracked.aborts.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        if aborted > 0 {
            debug!(aborted, "Cancelled pending replies");
        }
        aborted
    }

    /// Number of deliveries that have not completed yet.
    pub async fn pending(&self) -> usize {
        let tracked = self.tracked.lock().await;
        tracked.aborts.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every scheduled delivery has run or been aborted.
    pub async fn settle(&self) {
        loop {
            let tail = self.tracked.lock().await.tail.take();
            match tail {
                // Awaiting the tail awaits everything chained before it
                Some(handle) => {
                    let _ = handle.await;
                }
                None => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::CopilotConfig;
    use crate::copilot::{Mode, ModeRequest};
    use crate::model::Job;
    use crate::repository::PipelineSummary;

    fn controller() -> Arc<Mutex<ModeController>> {
        let config = CopilotConfig {
            seed: Some(1),
            ..CopilotConfig::default()
        };
        let job = Job {
            id: "job-001".into(),
            title: "Senior Software Engineer".into(),
            department: "Engineering".into(),
            location: "Bengaluru".into(),
            employment_type: "Full-time".into(),
            experience: "5-8 years".into(),
            salary: "30-45 LPA".into(),
            description: String::new(),
            skills: Vec::new(),
        };
        let summary = PipelineSummary {
            talent_match: 0,
            syndication: 0,
            auto_sourcing: 0,
            top_score: None,
        };
        Arc::new(Mutex::new(ModeController::new(config, job, &summary)))
    }

    #[tokio::test(start_paused = true)]
    async fn reply_lands_after_its_delay() {
        let controller = controller();
        let (tx, mut rx) = broadcast::channel(16);
        let scheduler = ReplyScheduler::new();

        let outcome = controller.lock().await.submit_text("hello");
        let reply = outcome.replies.into_iter().next().unwrap();
        assert_eq!(reply.delay, Duration::from_millis(1500));
        let before = controller.lock().await.messages().len();

        scheduler.schedule(reply, controller.clone(), tx.clone()).await;
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(controller.lock().await.messages().len(), before);
        assert_eq!(scheduler.pending().await, 1);

        scheduler.settle().await;
        assert_eq!(controller.lock().await.messages().len(), before + 1);
        assert!(matches!(rx.recv().await, Ok(SessionEvent::MessageAppended(_))));
        assert!(matches!(rx.recv().await, Ok(SessionEvent::TypingChanged(false))));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_aborts_waiting_replies() {
        let controller = controller();
        let (tx, _rx) = broadcast::channel(16);
        let scheduler = ReplyScheduler::new();

        let outcome = controller
            .lock()
            .await
            .enter_mode(ModeRequest::new(Mode::Search));
        for reply in outcome.replies {
            scheduler.schedule(reply, controller.clone(), tx.clone()).await;
        }
        let before = controller.lock().await.messages().len();

        assert_eq!(scheduler.cancel_all().await, 1);
        tokio::time::sleep(Duration::from_secs(5)).await;
        scheduler.settle().await;
        assert_eq!(controller.lock().await.messages().len(), before);
        assert_eq!(scheduler.pending().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_reply_is_not_broadcast() {
        let controller = controller();
        let (tx, mut rx) = broadcast::channel(16);
        let scheduler = ReplyScheduler::new();

        let outcome = controller
            .lock()
            .await
            .enter_mode(ModeRequest::new(Mode::Search));
        let stale = outcome.replies.into_iter().next().unwrap();
        controller
            .lock()
            .await
            .enter_mode(ModeRequest::new(Mode::Default));

        scheduler.schedule(stale, controller.clone(), tx).await;
        scheduler.settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn later_reply_waits_for_earlier_one() {
        let controller = controller();
        let (tx, _rx) = broadcast::channel(16);
        let scheduler = ReplyScheduler::new();

        let slow = controller.lock().await.submit_text("first");
        let fast = controller
            .lock()
            .await
            .enter_mode(ModeRequest::new(Mode::Rules));
        // the rules prompt belongs to a newer epoch, so restamp the chat reply
        let mut slow = slow.replies.into_iter().next().unwrap();
        slow.epoch = controller.lock().await.epoch();
        let fast = fast.replies.into_iter().next().unwrap();
        assert!(fast.delay < slow.delay);

        scheduler.schedule(slow, controller.clone(), tx.clone()).await;
        scheduler.schedule(fast, controller.clone(), tx).await;
        scheduler.settle().await;

        let messages = controller.lock().await.messages().as_slice().to_vec();
        let n = messages.len();
        assert!(messages[n - 1].content.contains("automation rules"));
        let chat = messages[n - 2].content.as_str();
        assert!(crate::copilot::templates::CANNED_REPLIES.contains(&chat));
    }
}
