//! Canned copy for the co-pilot: greetings, prompts, and outreach drafts.
//!
//! Every function here is pure; the same inputs always render the same text.

use crate::model::{Candidate, Job, Rule, RuleBook, RuleScope, SourceKey};
use crate::repository::PipelineSummary;

use super::flow::{DraftAnswers, Question, SEARCH_QUESTIONS};
use super::mode::{Mode, OutreachChannel, ScreeningAction};

/// Timestamp shown on the seeded greeting.
pub const GREETING_TIMESTAMP: &str = "10:00 AM";

pub const GREETING_INTRO: &str = "Hi! I'm your sourcing co-pilot. I've analyzed the job requirements and started matching candidates. Here's what I found so far:";

/// Acknowledgements for free-form chat. Unrelated to what the user said.
pub const CANNED_REPLIES: [&str; 4] = [
    "Got it! I'll refine the candidate search based on your criteria. Let me re-rank the candidates.",
    "Understood. I've updated the sourcing filters. You should see updated results in the candidate lists.",
    "Thanks for the input. I'm adjusting the matching algorithm to prioritize your preferences.",
    "I'll factor that into the scoring model. The consolidated rankings will reflect this change shortly.",
];

/// Follow-up questions offered as one-tap prompts under the chat.
pub const CHAT_SUGGESTIONS: [&str; 5] = [
    "What specific skills should I exclude from candidates?",
    "Which companies are you targeting for sourcing?",
    "What's the ideal notice period you're looking for?",
    "Should I prioritize candidates from product companies?",
    "Any preferred programming languages beyond the listed ones?",
];

/// How many suggestions the panel shows at once.
pub const VISIBLE_SUGGESTIONS: usize = 3;

const SUGGESTION_CHIP_WIDTH: usize = 40;

/// The `n`th suggestion, counting from 1.
pub fn suggestion(n: usize) -> Option<&'static str> {
    n.checked_sub(1).and_then(|i| CHAT_SUGGESTIONS.get(i)).copied()
}

/// Short label for a suggestion, cut at the chip width.
pub fn suggestion_chip(text: &str) -> String {
    if text.chars().count() <= SUGGESTION_CHIP_WIDTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(SUGGESTION_CHIP_WIDTH).collect();
    format!("{cut}...")
}

/// Numbered chips for the visible suggestions.
pub fn suggestion_chips() -> String {
    CHAT_SUGGESTIONS
        .iter()
        .take(VISIBLE_SUGGESTIONS)
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, suggestion_chip(s)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn greeting_summary(summary: &PipelineSummary) -> String {
    let top = match summary.top_score {
        Some(score) => format!(" The top candidate has a {score}% match score."),
        None => String::new(),
    };
    format!(
        "I found {} strong matches in your internal database, {} from job boards, and {} passive candidates on LinkedIn.{} Would you like to refine the search criteria?",
        summary.talent_match, summary.syndication, summary.auto_sourcing, top
    )
}

pub fn no_candidates(mode: Mode) -> String {
    format!(
        "Select at least one candidate before starting {}.",
        mode.label()
    )
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn full_names(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_names(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.first_name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Outreach ────────────────────────────────────────────────────────────

pub fn channel_prompt(candidates: &[Candidate]) -> String {
    let options = OutreachChannel::ALL
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Let's reach out to {} candidate{}: {}. Which channel should I use? ({})",
        candidates.len(),
        plural(candidates.len()),
        full_names(candidates),
        options
    )
}

pub const CHANNEL_REPROMPT: &str =
    "Please pick a channel: WhatsApp, Email, or LinkedIn InMail.";

/// Everything a draft is rendered from.
pub struct DraftContext<'a> {
    pub job: &'a Job,
    pub company: &'a str,
    pub apply_link: &'a str,
}

/// Render the outreach draft for a channel.
///
/// One recipient is greeted by first name; several get a generic greeting.
pub fn outreach_draft(
    channel: OutreachChannel,
    candidates: &[Candidate],
    ctx: &DraftContext<'_>,
) -> String {
    let job = ctx.job;
    let company = ctx.company;
    let link = ctx.apply_link;
    let single = candidates.len() == 1;
    let names = first_names(candidates);

    match channel {
        OutreachChannel::Whatsapp => {
            let greeting = if single { names.as_str() } else { "there" };
            format!(
                "Hi {greeting},\n\n\
                 We came across your profile and were impressed by your experience. \
                 We have an exciting opportunity for the role of *{title}* at *{company}*.\n\n\
                 *Role Details:*\n\
                 - Position: {title}\n\
                 - Location: {location}\n\
                 - Experience: {experience}\n\
                 - Compensation: {salary}\n\
                 - Notice Period: Immediate to 30 days preferred\n\n\
                 If you're interested, please apply here: {link}\n\n\
                 Looking forward to hearing from you!\n\n\
                 Best,\nTalent Acquisition Team\n{company}",
                title = job.title,
                location = job.location,
                experience = job.experience,
                salary = job.salary,
            )
        }
        OutreachChannel::Email => {
            let greeting = if single { names.as_str() } else { "Candidate" };
            format!(
                "Subject: Exciting {title} Opportunity at {company} - {location}\n\n\
                 Dear {greeting},\n\n\
                 I'm reaching out from {company} about an opportunity that aligns with your background. \
                 We are hiring for the position of {title} based in {location}.\n\n\
                 Role Highlights:\n\
                 - Department: {department}\n\
                 - Experience Required: {experience}\n\
                 - Compensation: {salary}\n\
                 - Type: {kind}\n\
                 - Notice Period: Immediate to 30 days preferred\n\n\
                 About the Role:\n{description}\n\n\
                 Key Skills: {skills}\n\n\
                 If this sounds interesting, I'd love to schedule a quick call. \
                 You can also apply directly here: {link}\n\n\
                 Best regards,\nTalent Acquisition Team\n{company}\n{location}",
                title = job.title,
                location = job.location,
                department = job.department,
                experience = job.experience,
                salary = job.salary,
                kind = job.employment_type,
                description = job.description,
                skills = job.skills.join(", "),
            )
        }
        OutreachChannel::Linkedin => {
            let greeting = if single { names.as_str() } else { "there" };
            let skills = job.skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
            format!(
                "Hi {greeting},\n\n\
                 I'm reaching out from {company} - we're hiring a {title} for our {location} office.\n\n\
                 Quick overview:\n\
                 - {experience} experience\n\
                 - {salary} compensation\n\
                 - Key Skills: {skills}\n\
                 - Notice Period: Immediate to 30 days preferred\n\n\
                 Your profile caught our attention. Would you be open to a brief conversation?\n\n\
                 Apply here: {link}\n\n\
                 Best,\n{company} Talent Team",
                title = job.title,
                location = job.location,
                experience = job.experience,
                salary = job.salary,
            )
        }
    }
}

pub fn compose_prompt(channel: OutreachChannel, draft: &str) -> String {
    format!(
        "Here's a draft {} message:\n\n{}\n\nReply \"send\" to queue it, or type your changes to edit the draft.",
        channel.label(),
        draft
    )
}

pub fn draft_updated(draft: &str) -> String {
    format!(
        "Updated the draft:\n\n{draft}\n\nSay \"yes\" to send it, or keep editing."
    )
}

pub const DRAFT_NOT_READY: &str = "Pick a channel first so I can draft the message.";

pub fn outreach_queued(channel: OutreachChannel, recipients: usize) -> String {
    format!(
        "Your {} message has been queued and will be sent to {} candidate{} shortly.",
        channel.label(),
        recipients,
        plural(recipients)
    )
}

pub const OUTREACH_CANCELLED: &str = "Outreach cancelled. I've discarded the draft.";

// ── Search refinement ───────────────────────────────────────────────────

pub fn search_intro() -> String {
    format!(
        "Let's refine the search. I'll ask a few quick questions.\n\n{}",
        SEARCH_QUESTIONS[0].prompt
    )
}

pub fn next_question(question: &Question) -> String {
    format!("Got it. {}", question.prompt)
}

pub fn sources_prompt() -> String {
    let options = SourceKey::ALL
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Which sources should I search? Select any of {options}, then start the search."
    )
}

pub const NEED_SOURCE: &str = "Select at least one source before starting the search.";

pub const SOURCES_REPROMPT: &str =
    "Toggle the sources you want, then say \"start\" to begin the search.";

/// Summary echoed back when a refined search starts.
pub fn search_summary(answers: &DraftAnswers, sources: &[SourceKey]) -> String {
    let mut lines = vec!["Starting a refined search with:".to_string()];
    for question in &SEARCH_QUESTIONS {
        if let Some(answer) = answers.get(question.key) {
            lines.push(format!("- {}: {}", question.label, answer));
        }
    }
    let labels = sources
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("- Sources: {labels}"));
    lines.push("I'll refresh those candidate lists as results come in.".to_string());
    lines.join("\n")
}

pub const SEARCH_CANCELLED: &str = "Search refinement cancelled. Your current results are unchanged.";

// ── Rules ───────────────────────────────────────────────────────────────

fn rule_line(position: usize, rule: &Rule) -> String {
    let state = if rule.active { "active" } else { "paused" };
    format!("{position}. {} ({state})", rule.label)
}

pub fn rules_listing(book: &RuleBook) -> String {
    let heading = match book.scope() {
        RuleScope::Sourcing => "Here are your sourcing automation rules:",
        RuleScope::Screening => "Here are your screening automation rules:",
    };
    let body = if book.is_empty() {
        "(no rules yet)".to_string()
    } else {
        book.rules()
            .iter()
            .enumerate()
            .map(|(i, r)| rule_line(i + 1, r))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "{heading}\n{body}\n\nSay \"add\" to create a rule, or \"done\" when you're finished."
    )
}

/// Concatenate rule-authoring answers into one rule label.
pub fn rule_label(trigger: &str, action: &str, timing: &str) -> String {
    format!("When {trigger}, {action} ({timing})")
}

pub fn rule_added(label: &str, book: &RuleBook) -> String {
    format!("Added rule: {label}\n\n{}", rules_listing(book))
}

pub fn add_rule_intro(question: &Question) -> String {
    format!("Let's add a rule. {}", question.prompt)
}

pub const RULE_NOT_FOUND: &str = "I couldn't find that rule.";

pub const RULES_REPROMPT: &str =
    "Say \"add\" to create a rule, or \"done\" to save and close.";

pub fn rules_saved(scope: RuleScope) -> String {
    format!("Your {scope} rules are saved.")
}

pub fn rules_cancelled(scope: RuleScope) -> String {
    format!("Closed the {scope} rules editor.")
}

// ── Screening confirmations ─────────────────────────────────────────────

pub fn confirm_prompt(action: ScreeningAction, candidates: &[Candidate]) -> String {
    let n = candidates.len();
    let what = match action {
        ScreeningAction::AutoaiCall => "place automated AutoAI screening calls to",
        ScreeningAction::PriorityReview => "flag for priority review",
        ScreeningAction::ScreenaiCall => "schedule ScreenAI interview calls with",
    };
    format!(
        "I'll {what} {n} candidate{}: {}. Shall I proceed? (yes / cancel)",
        plural(n),
        full_names(candidates)
    )
}

pub fn confirm_completed(action: ScreeningAction, recipients: usize) -> String {
    format!(
        "Done! {} completed for {} candidate{}. You'll see the outcomes in the communications table.",
        action.label(),
        recipients,
        plural(recipients)
    )
}

pub fn confirm_cancelled(action: ScreeningAction) -> String {
    format!(
        "Sorry about that. I've cancelled the {} request.",
        action.label()
    )
}

pub const CONFIRM_REPROMPT: &str = "Please reply \"yes\" to proceed or \"cancel\" to stop.";
