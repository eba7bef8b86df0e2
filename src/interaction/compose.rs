//! Builds the issue cards posted back to the channel.
//!
//! Any closed pull request is shown as merged: the issue listing does not say
//! whether a closed pull request was merged or abandoned.

use crate::base::types::{IssueMessage, IssueRecord, IssueState, MissPolicy};

/// Side-bar color of open items.
pub const OPEN_COLOR: &str = "#67C63D";
/// Side-bar color of closed issues.
pub const CLOSED_COLOR: &str = "#B52003";
/// Side-bar color of closed pull requests.
pub const MERGED_COLOR: &str = "#65488D";
/// Side-bar color of the "not found" card.
pub const NOT_FOUND_COLOR: &str = "#D3D3D3";

/// Picks the side-bar color for a record.
pub fn state_color(record: &IssueRecord) -> &'static str {
    match (record.state, record.is_pull_request) {
        (IssueState::Open, _) => OPEN_COLOR,
        (IssueState::Closed, false) => CLOSED_COLOR,
        (IssueState::Closed, true) => MERGED_COLOR,
    }
}

/// Builds the card for a resolved record.
pub fn compose_issue_message(record: &IssueRecord) -> IssueMessage {
    let kind = if record.is_pull_request { "Pull Requests" } else { "Issues" };

    IssueMessage {
        fallback: format!("{} - {}", record.number, record.title),
        title: record.title.clone(),
        title_link: Some(record.html_url.clone()),
        text: record.body.clone(),
        color: state_color(record).to_string(),
        thumb_url: Some(record.author_avatar_url.clone()).filter(|url| !url.is_empty()),
        footer: format!("GitHub {kind}"),
        ts: Some(record.created_at.timestamp()),
    }
}

/// Builds the card for a number that could not be resolved, if the policy posts one.
pub fn compose_miss_message(number: u64, policy: MissPolicy) -> Option<IssueMessage> {
    match policy {
        MissPolicy::Ignore => None,
        MissPolicy::Notify => Some(IssueMessage {
            fallback: format!("{number} - not found"),
            title: format!("#{number} not found"),
            title_link: None,
            text: String::new(),
            color: NOT_FOUND_COLOR.to_string(),
            thumb_url: None,
            footer: "GitHub".to_string(),
            ts: None,
        }),
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(state: IssueState, is_pull_request: bool) -> IssueRecord {
        IssueRecord {
            number: 42,
            title: "Make it faster".to_string(),
            body: "It is slow.".to_string(),
            html_url: "https://github.com/octo/repo/issues/42".to_string(),
            state,
            is_pull_request,
            author_avatar_url: "https://avatars.example/u/1".to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
        }
    }

    #[test]
    fn test_state_colors() {
        assert_eq!(state_color(&record(IssueState::Open, false)), OPEN_COLOR);
        assert_eq!(state_color(&record(IssueState::Open, true)), OPEN_COLOR);
        assert_eq!(state_color(&record(IssueState::Closed, false)), CLOSED_COLOR);
        assert_eq!(state_color(&record(IssueState::Closed, true)), MERGED_COLOR);
    }

    #[test]
    fn test_compose_issue_message() {
        let message = compose_issue_message(&record(IssueState::Open, false));

        assert_eq!(message.fallback, "42 - Make it faster");
        assert_eq!(message.title, "Make it faster");
        assert_eq!(message.title_link.as_deref(), Some("https://github.com/octo/repo/issues/42"));
        assert_eq!(message.text, "It is slow.");
        assert_eq!(message.color, OPEN_COLOR);
        assert_eq!(message.thumb_url.as_deref(), Some("https://avatars.example/u/1"));
        assert_eq!(message.footer, "GitHub Issues");
        assert_eq!(message.ts, Some(1_700_000_000));
    }

    #[test]
    fn test_compose_pull_request_footer() {
        let message = compose_issue_message(&record(IssueState::Closed, true));

        assert_eq!(message.footer, "GitHub Pull Requests");
        assert_eq!(message.color, MERGED_COLOR);
    }

    #[test]
    fn test_compose_miss_message() {
        assert!(compose_miss_message(9, MissPolicy::Ignore).is_none());

        let message = compose_miss_message(9, MissPolicy::Notify).unwrap();
        assert_eq!(message.color, NOT_FOUND_COLOR);
        assert_eq!(message.title, "#9 not found");
        assert!(message.title_link.is_none());
    }
}
