use serde_json::Value;

use super::TaskSuggestion;

pub(super) const SUMMARY_SYSTEM_PROMPT: &str = "You summarize a single email for a mailbox client. \
Reply with a short plain-text summary (2-4 sentences) of the message below. \
Do not add headings, labels, or commentary.";

pub(super) const TASKS_SYSTEM_PROMPT: &str = "You extract actionable tasks from an email. \
Reply with a JSON array only. Each element: \
{\"title\": string, \"description\": string|null, \"due_date\": string|null, \"priority\": \"low\"|\"normal\"|\"high\"}. \
Reply with [] when the email contains no actionable task.";

pub(super) const TERMS_SYSTEM_PROMPT: &str = "You suggest related search terms for a mailbox search box. \
Given one term, reply with a JSON array of up to 8 related terms (strings only). No commentary.";

pub(super) fn build_summary_user_prompt(text: &str) -> String {
    format!("Email:\n{}", text)
}

pub(super) fn build_tasks_user_prompt(text: &str) -> String {
    format!("Email:\n{}", text)
}

pub(super) fn build_terms_user_prompt(term: &str) -> String {
    format!("Term: {}", term)
}

/// Models wrap JSON replies in markdown fences often enough that we strip
/// them before parsing.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

pub(super) fn parse_task_suggestions(reply: &str) -> Result<Vec<TaskSuggestion>, String> {
    let payload = strip_code_fences(reply);
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| format!("task extraction reply is not valid JSON: {e}"))?;
    let items = value
        .as_array()
        .ok_or_else(|| "task extraction reply is not a JSON array".to_string())?;

    let mut tasks = Vec::new();
    for item in items {
        let title = item
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let Some(title) = title else {
            continue;
        };
        tasks.push(TaskSuggestion {
            title: title.to_string(),
            description: item
                .get("description")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| d.to_string()),
            due_date: item
                .get("due_date")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| d.to_string()),
            priority: item
                .get("priority")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or("normal")
                .to_string(),
        });
    }
    Ok(tasks)
}

pub(super) fn parse_term_list(reply: &str) -> Result<Vec<String>, String> {
    let payload = strip_code_fences(reply);
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| format!("related terms reply is not valid JSON: {e}"))?;
    let items = value
        .as_array()
        .ok_or_else(|| "related terms reply is not a JSON array".to_string())?;

    Ok(items
        .iter()
        .filter_map(|item| item.as_str())
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| term.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_task_suggestions_reads_fenced_arrays() {
        let reply = "```json\n[{\"title\": \"Send invoice\", \"description\": null, \"due_date\": \"2026-09-01\", \"priority\": \"high\"}]\n```";
        let tasks = parse_task_suggestions(reply).expect("parse");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Send invoice");
        assert_eq!(tasks[0].due_date.as_deref(), Some("2026-09-01"));
        assert_eq!(tasks[0].priority, "high");
        assert!(tasks[0].description.is_none());
    }

    #[test]
    fn parse_task_suggestions_skips_untitled_items_and_defaults_priority() {
        let reply = r#"[{"title": "  "}, {"title": "Reply to Sam"}]"#;
        let tasks = parse_task_suggestions(reply).expect("parse");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Reply to Sam");
        assert_eq!(tasks[0].priority, "normal");
    }

    #[test]
    fn parse_task_suggestions_rejects_non_arrays() {
        assert!(parse_task_suggestions("{\"title\": \"x\"}").is_err());
        assert!(parse_task_suggestions("not json").is_err());
    }

    #[test]
    fn parse_term_list_filters_blanks() {
        let terms = parse_term_list(r#"["invoice", "  ", "billing", 42]"#).expect("parse");
        assert_eq!(terms, vec!["invoice".to_string(), "billing".to_string()]);
    }
}
