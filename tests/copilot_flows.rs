//! Integration tests for the co-pilot session.
//!
//! Each test opens a session against the fixture repository with the real
//! simulated delays, on a paused clock so timers resolve instantly and in
//! deadline order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;

use sourcing_copilot::config::CopilotConfig;
use sourcing_copilot::copilot::{
    CopilotSession, Input, InputParser, Mode, ModeRequest, OutreachChannel, PanelAction, RuleRef,
    SearchCallback, SessionEvent, templates,
};
use sourcing_copilot::error::{Error, RepositoryError};
use sourcing_copilot::model::{Candidate, Role, RuleScope, SourceKey};
use sourcing_copilot::repository::{CandidateRepository, InMemoryRepository};

fn config() -> CopilotConfig {
    CopilotConfig {
        seed: Some(42),
        ..CopilotConfig::default()
    }
}

async fn open() -> (CopilotSession, InMemoryRepository) {
    let repo = InMemoryRepository::with_fixtures();
    let session = CopilotSession::open(&repo, config(), None).await.unwrap();
    (session, repo)
}

async fn arjun(repo: &InMemoryRepository) -> Vec<Candidate> {
    repo.candidates_by_source("job-001", SourceKey::TalentMatch)
        .await
        .unwrap()
        .into_iter()
        .take(1)
        .collect()
}

async fn last_message(session: &CopilotSession) -> String {
    session.messages().await.last().unwrap().content.clone()
}

/// Drain everything currently buffered on a receiver.
fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn greeting_reflects_fixture_pools() {
    let (session, _repo) = open().await;
    let messages = session.messages().await;

    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.role == Role::Assistant));
    assert!(messages[1].content.contains("6 strong matches"));
    assert!(messages[1].content.contains("96% match score"));
    assert_eq!(session.mode().await, Mode::Default);
}

#[tokio::test(start_paused = true)]
async fn unknown_job_fails_to_open() {
    let repo = InMemoryRepository::with_fixtures();
    let config = CopilotConfig {
        job_id: "job-999".into(),
        ..config()
    };
    let result = CopilotSession::open(&repo, config, None).await;
    assert!(matches!(
        result,
        Err(Error::Repository(RepositoryError::JobNotFound { .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn typing_indicator_tracks_pending_reply() {
    let (session, _repo) = open().await;
    let mut rx = session.subscribe();

    session.submit_text("prioritize fintech backgrounds").await;
    assert!(session.is_typing().await);
    // user turn shows up before the reply
    assert_eq!(session.messages().await.len(), 3);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(session.is_typing().await);
    assert_eq!(session.messages().await.len(), 3);

    session.settle().await;
    assert!(!session.is_typing().await);
    assert_eq!(session.messages().await.len(), 4);

    let events = drain(&mut rx);
    assert!(matches!(
        events.first(),
        Some(SessionEvent::MessageAppended(m)) if m.role == Role::User
    ));
    assert_eq!(events.last(), Some(&SessionEvent::TypingChanged(false)));
}

#[tokio::test(start_paused = true)]
async fn outreach_email_scenario() {
    let (session, repo) = open().await;
    let candidates = arjun(&repo).await;
    assert_eq!(candidates[0].name, "Arjun Krishnamurthy");

    session
        .enter_mode(ModeRequest::new(Mode::Outreach).with_candidates(candidates))
        .await;
    session.settle().await;
    assert_eq!(session.inspect(|c| c.step()).await, 1);

    session
        .apply(PanelAction::SelectChannel(OutreachChannel::Email))
        .await;
    session.settle().await;
    let prompt = last_message(&session).await;
    assert!(prompt.contains("Dear Arjun"));
    assert!(prompt.contains("https://1recruit.ai/apply/job-001"));

    let before = session.messages().await.len();
    session.submit_text("yes").await;
    session.settle().await;

    let messages = session.messages().await;
    assert_eq!(messages.len(), before + 2);
    assert_eq!(messages[before].content, "yes");
    assert!(messages[before + 1].content.contains("queued"));
    assert_eq!(session.mode().await, Mode::Default);
}

#[tokio::test(start_paused = true)]
async fn search_scenario_reports_sources() {
    let repo = InMemoryRepository::with_fixtures();
    let started = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&started);
    let callback: SearchCallback = Box::new(move |sources: &[SourceKey]| {
        sink.lock().unwrap().push(sources.to_vec());
    });
    let session = CopilotSession::open(&repo, config(), Some(callback))
        .await
        .unwrap();
    let mut rx = session.subscribe();

    session.enter_mode(ModeRequest::new(Mode::Search)).await;
    session.settle().await;
    for answer in ["Go, Kubernetes", "no freshers", "fintech"] {
        session.submit_text(answer).await;
        session.settle().await;
    }
    assert_eq!(session.inspect(|c| c.step()).await, 4);

    session
        .apply(PanelAction::ToggleSource(SourceKey::AutoSourcing))
        .await;
    session
        .apply(PanelAction::ToggleSource(SourceKey::TalentMatch))
        .await;
    session.apply(PanelAction::StartSearch).await;
    session.settle().await;

    let summary = last_message(&session).await;
    for expected in ["Go, Kubernetes", "no freshers", "fintech"] {
        assert!(summary.contains(expected));
    }
    assert!(summary.contains("Talent Match, Auto Sourcing"));

    let expected = vec![SourceKey::TalentMatch, SourceKey::AutoSourcing];
    assert_eq!(*started.lock().unwrap(), vec![expected.clone()]);
    assert!(drain(&mut rx).contains(&SessionEvent::SearchStarted { sources: expected }));
    assert_eq!(session.mode().await, Mode::Default);
}

#[tokio::test(start_paused = true)]
async fn stale_reply_discarded_after_mode_switch() {
    let (session, _repo) = open().await;

    session.enter_mode(ModeRequest::new(Mode::Search)).await;
    // switch before the search intro has been delivered
    session.enter_mode(ModeRequest::new(Mode::Rules)).await;
    session.settle().await;

    let messages = session.messages().await;
    assert_eq!(messages.len(), 3);
    assert!(messages[2].content.contains("sourcing automation rules"));
    assert!(!messages.iter().any(|m| m.content.contains("refine the search")));
    assert!(!session.is_typing().await);
}

#[tokio::test(start_paused = true)]
async fn reentering_default_keeps_pending_chat_reply() {
    let (session, _repo) = open().await;
    let mut rx = session.subscribe();

    session.submit_text("hello").await;
    session.enter_mode(ModeRequest::new(Mode::Default)).await;
    session.settle().await;

    let messages = session.messages().await;
    // greeting, user turn, canned reply
    assert_eq!(messages.len(), 4);
    assert!(templates::CANNED_REPLIES.contains(&messages[3].content.as_str()));
    assert!(
        !drain(&mut rx)
            .iter()
            .any(|e| matches!(e, SessionEvent::ModeChanged { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn leaving_flow_before_reply_clears_typing() {
    let (session, _repo) = open().await;
    let mut rx = session.subscribe();

    session.enter_mode(ModeRequest::new(Mode::Search)).await;
    session.enter_mode(ModeRequest::new(Mode::Default)).await;
    session.settle().await;

    assert!(!session.is_typing().await);
    let last_typing = drain(&mut rx).into_iter().rev().find_map(|e| match e {
        SessionEvent::TypingChanged(typing) => Some(typing),
        _ => None,
    });
    assert_eq!(last_typing, Some(false));
}

#[tokio::test(start_paused = true)]
async fn suggestion_is_sent_as_user_turn() {
    let (session, _repo) = open().await;

    assert!(session.submit_suggestion(2).await);
    assert!(!session.submit_suggestion(9).await);
    session.settle().await;

    let messages = session.messages().await;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role, Role::User);
    assert_eq!(messages[2].content, templates::CHAT_SUGGESTIONS[1]);
    assert!(templates::CANNED_REPLIES.contains(&messages[3].content.as_str()));
}

#[tokio::test(start_paused = true)]
async fn free_text_reply_dropped_when_flow_starts() {
    let (session, repo) = open().await;

    session.submit_text("any update?").await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    session
        .enter_mode(ModeRequest::new(Mode::ScreenaiCall).with_candidates(arjun(&repo).await))
        .await;
    session.settle().await;

    let messages = session.messages().await;
    // greeting, user turn, confirm prompt
    assert_eq!(messages.len(), 4);
    assert!(messages[3].content.contains("Shall I proceed?"));
}

#[tokio::test(start_paused = true)]
async fn outreach_without_candidates_stays_in_default() {
    let (session, _repo) = open().await;
    session.enter_mode(ModeRequest::new(Mode::Outreach)).await;
    session.settle().await;

    assert_eq!(session.mode().await, Mode::Default);
    assert!(last_message(&session).await.contains("Select at least one candidate"));
}

#[tokio::test(start_paused = true)]
async fn rule_edits_reply_in_order() {
    let (session, _repo) = open().await;
    let mut rx = session.subscribe();
    session.enter_mode(ModeRequest::new(Mode::ScreeningRules)).await;
    session.settle().await;
    let start = session.messages().await.len();
    let count = session.inspect(|c| c.rules(RuleScope::Screening).len()).await;

    session
        .apply(PanelAction::ToggleRule(RuleRef::Position(1)))
        .await;
    session
        .apply(PanelAction::DeleteRule(RuleRef::Position(2)))
        .await;
    session.settle().await;

    let messages = session.messages().await;
    assert_eq!(messages.len(), start + 2);
    // second listing no longer has a second rule
    assert!(messages[start].content.contains("2. "));
    assert!(!messages[start + 1].content.contains("2. "));
    assert_eq!(
        session.inspect(|c| c.rules(RuleScope::Screening).len()).await,
        count - 1
    );

    let changed = drain(&mut rx)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                SessionEvent::RulesChanged {
                    scope: RuleScope::Screening
                }
            )
        })
        .count();
    assert_eq!(changed, 2);
}

#[tokio::test(start_paused = true)]
async fn parsed_lines_drive_confirmation() {
    let (session, repo) = open().await;
    let lines = ["/mode priority_review", "hmm", "yes please"];

    for line in lines {
        match InputParser::parse(line) {
            Input::SwitchMode { mode, count } => {
                let candidates = repo
                    .all_candidates("job-001")
                    .await
                    .unwrap()
                    .into_iter()
                    .take(count.unwrap_or(1))
                    .collect();
                session
                    .enter_mode(ModeRequest::new(mode).with_candidates(candidates))
                    .await;
            }
            Input::Text(text) => session.submit_text(&text).await,
            other => panic!("unexpected input {other:?}"),
        }
        session.settle().await;
    }

    let messages = session.messages().await;
    let prompt = &messages[2].content;
    assert!(prompt.contains("Meera Joshi"));
    assert!(messages[4].content.contains("reply \"yes\""));
    assert!(last_message(&session).await.contains("completed for 1 candidate"));
    assert_eq!(session.mode().await, Mode::Default);
}
