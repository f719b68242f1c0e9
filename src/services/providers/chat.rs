use std::time::Duration;

use serde_json::{json, Value};

/// One non-streaming chat-completions round trip against an OpenAI-compatible
/// endpoint. Failures come back as strings carrying the upstream status and
/// body so the router can classify them by content.
pub(super) async fn chat_completion(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    label: &str,
) -> Result<String, String> {
    if base_url.trim().is_empty() {
        return Err(format!("{label} provider base url not configured"));
    }

    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let body = json!({
        "model": model,
        "temperature": 0.2,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
    });

    let mut request = client.post(&url).json(&body);
    if !api_key.trim().is_empty() {
        request = request.bearer_auth(api_key.trim());
    }

    let response = request
        .send()
        .await
        .map_err(|e| format!("{label} provider request failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response
            .text()
            .await
            .unwrap_or_else(|e| format!("failed to read error body: {e}"))
            .trim()
            .to_string();
        return Err(format!("{label} provider error (status {status}): {detail}"));
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|e| format!("{label} provider returned invalid JSON: {e}"))?;

    let content = payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::trim)
        .unwrap_or("");

    if content.is_empty() {
        return Err(format!("{label} provider returned no text content"));
    }
    Ok(content.to_string())
}

pub(super) fn build_http_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| format!("build provider http client failed: {e}"))
}
