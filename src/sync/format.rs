//! Message rendering.
//!
//! Everything here is a pure function of its inputs: the same action and PR
//! snapshot always produce the same text.

use crate::chat::truncate_chars;
use crate::types::{PullRequest, Review, ReviewState, User};

use super::ThreadAction;

/// Characters of the PR title kept in a thread name.
pub const THREAD_TITLE_MAX_CHARS: usize = 90;

/// Discord's limit on thread names, in characters.
pub const THREAD_NAME_MAX_CHARS: usize = 100;

const NO_DESCRIPTION: &str = "No description provided";

fn login_or<'a>(user: Option<&'a User>, fallback: &'a str) -> &'a str {
    user.map_or(fallback, |u| u.login.as_str())
}

/// Renders the thread name, e.g. `PR #42: Fix bug`.
///
/// The title is cut to [`THREAD_TITLE_MAX_CHARS`], and further if the
/// `PR #<n>: ` prefix would push the name past [`THREAD_NAME_MAX_CHARS`].
pub fn thread_name(pr: &PullRequest) -> String {
    let prefix = format!("PR {}: ", pr.number);
    let budget = THREAD_NAME_MAX_CHARS
        .saturating_sub(prefix.chars().count())
        .min(THREAD_TITLE_MAX_CHARS);
    let mut name = prefix;
    name.push_str(truncate_chars(&pr.title, budget));
    name
}

/// Renders the first message posted into a new thread.
pub fn intro_message(pr: &PullRequest) -> String {
    let description = pr
        .body
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    format!(
        "**New PR opened by {}**\n\n\
         **Title:** {}\n\
         **Description:** {}\n\
         **Link:** {}\n\n\
         This thread will be updated as the PR status changes.",
        pr.author.login, pr.title, description, pr.html_url
    )
}

/// Renders the message for an update action.
///
/// Returns `None` only for [`ThreadAction::ReviewSubmitted`] on a snapshot
/// without an attached review.
pub fn update_message(action: ThreadAction, pr: &PullRequest) -> Option<String> {
    let text = match action {
        ThreadAction::Closed if pr.merged => format!(
            "PR {} was merged by {} 🎉",
            pr.number,
            login_or(pr.merged_by.as_ref(), "unknown")
        ),
        ThreadAction::Closed => format!(
            "PR {} was closed without merging by {} ❌",
            pr.number,
            login_or(pr.closed_by.as_ref(), "unknown")
        ),
        ThreadAction::Reopened => {
            format!("PR {} was reopened by {} 🔄", pr.number, pr.author.login)
        }
        ThreadAction::Synchronize => {
            format!("PR {} was updated with new commits 📝", pr.number)
        }
        ThreadAction::ReviewRequested => format!(
            "Review requested for PR {} from {} 👀",
            pr.number,
            login_or(pr.requested_reviewer.as_ref(), "reviewers")
        ),
        ThreadAction::ReviewSubmitted => review_message(pr.review.as_ref()?),
    };
    Some(text)
}

/// Renders a submitted review, quoting its body when there is one.
pub fn review_message(review: &Review) -> String {
    let verdict = match &review.state {
        ReviewState::Approved => "✅ Approved",
        ReviewState::ChangesRequested => "🔄 Changes requested",
        ReviewState::Commented => "💬 Commented",
        other => other.as_str(),
    };

    let mut message = format!("Review submitted by {}: {}", review.author.login, verdict);

    if let Some(body) = review.body.as_deref().filter(|b| !b.is_empty()) {
        message.push_str("\n\n");
        message.push_str(&quote(body));
    }

    message
}

/// Prefixes every line with `> `.
fn quote(body: &str) -> String {
    body.lines()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
