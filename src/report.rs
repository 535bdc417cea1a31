use crate::gitlab::types::{MergeRequest, MergeRequestState};
use colored::Colorize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize merge request: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Print the approved merge request as pretty JSON on stdout.
pub fn print_json(merge_request: &MergeRequest) -> Result<(), ReportError> {
    println!("{}", serde_json::to_string_pretty(merge_request)?);
    Ok(())
}

/// Print a short colored summary of the approved merge request.
///
/// !42 "Add OAuth2 login flow" [opened]
/// feature/oauth → main | by alice
/// Merge status: can_be_merged
/// https://gitlab.example.com/group/app/-/merge_requests/42
pub fn print_summary(merge_request: &MergeRequest) {
    println!();
    println!("{} {}", "✔ Approved".green().bold(), format_summary(merge_request));
    println!();
}

fn format_summary(merge_request: &MergeRequest) -> String {
    let mut lines = vec![
        format!(
            "!{} \"{}\" [{}]",
            merge_request.iid,
            merge_request.title,
            colorize_state(merge_request.state)
        ),
        format!(
            "{} → {} | by {}",
            merge_request.source_branch, merge_request.target_branch, merge_request.author.username
        ),
    ];

    if let Some(status) = merge_request
        .detailed_merge_status
        .as_deref()
        .or(merge_request.merge_status.as_deref())
    {
        lines.push(format!("Merge status: {}", status));
    }
    if let Some(error) = &merge_request.merge_error {
        lines.push(format!("Merge error: {}", error.red()));
    }
    lines.push(merge_request.web_url.clone());

    lines.join("\n")
}

fn colorize_state(state: MergeRequestState) -> colored::ColoredString {
    let label = state.to_string();
    match state {
        MergeRequestState::Opened => label.green().bold(),
        MergeRequestState::Merged => label.blue().bold(),
        MergeRequestState::Closed | MergeRequestState::Locked => label.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_merge_request() -> MergeRequest {
        serde_json::from_value(json!({
            "id": 900,
            "iid": 42,
            "project_id": 7,
            "title": "Add OAuth2 login flow",
            "description": null,
            "state": "opened",
            "author": { "id": 3, "username": "alice", "name": "Alice" },
            "source_branch": "feature/oauth",
            "target_branch": "main",
            "web_url": "https://gitlab.example.com/group/app/-/merge_requests/42",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z",
            "merged_at": null,
            "closed_at": null,
            "merge_commit_sha": null,
            "merge_error": null,
            "merge_status": "can_be_merged"
        }))
        .unwrap()
    }

    #[test]
    fn test_summary_contents() {
        colored::control::set_override(false);
        let summary = format_summary(&sample_merge_request());
        assert!(summary.contains("!42 \"Add OAuth2 login flow\" [opened]"));
        assert!(summary.contains("feature/oauth → main | by alice"));
        assert!(summary.contains("Merge status: can_be_merged"));
        assert!(summary.ends_with("/merge_requests/42"));
        assert!(!summary.contains("Merge error"));
    }

    #[test]
    fn test_detailed_status_preferred() {
        colored::control::set_override(false);
        let mut mr = sample_merge_request();
        mr.detailed_merge_status = Some("not_approved".to_string());
        mr.merge_error = Some("conflicts".to_string());
        let summary = format_summary(&mr);
        assert!(summary.contains("Merge status: not_approved"));
        assert!(summary.contains("Merge error: conflicts"));
    }

    #[test]
    fn test_print_does_not_panic() {
        let mr = sample_merge_request();
        print_summary(&mr);
        print_json(&mr).unwrap();
    }
}
