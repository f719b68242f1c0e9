use super::chat::{build_http_client, chat_completion};
use super::prompts::{
    build_summary_user_prompt, build_tasks_user_prompt, build_terms_user_prompt,
    parse_task_suggestions, parse_term_list, SUMMARY_SYSTEM_PROMPT, TASKS_SYSTEM_PROMPT,
    TERMS_SYSTEM_PROMPT,
};
use super::{AiProvider, ProviderFuture, TaskSuggestion};
use crate::config::Config;

/// Hosted OpenAI-compatible provider. Slower than the local endpoint but
/// preferred where output quality matters (task extraction, term suggestion).
pub struct HostedAiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl HostedAiProvider {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, String> {
        Ok(Self {
            api_key,
            base_url,
            model,
            client: build_http_client()?,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, String> {
        Self::new(
            cfg.openai_api_key.clone(),
            cfg.openai_base_url.clone(),
            cfg.openai_model.clone(),
        )
    }

    pub fn is_configured(cfg: &Config) -> bool {
        !cfg.openai_api_key.trim().is_empty()
    }

    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        if self.api_key.trim().is_empty() {
            return Err("hosted provider api key not configured".to_string());
        }
        chat_completion(
            &self.client,
            &self.base_url,
            &self.api_key,
            &self.model,
            system_prompt,
            user_prompt,
            "hosted",
        )
        .await
    }
}

impl AiProvider for HostedAiProvider {
    fn name(&self) -> &'static str {
        "hosted"
    }

    fn summarize<'a>(&'a self, text: &'a str) -> ProviderFuture<'a, Result<String, String>> {
        Box::pin(async move {
            self.chat(SUMMARY_SYSTEM_PROMPT, &build_summary_user_prompt(text))
                .await
        })
    }

    fn extract_tasks<'a>(
        &'a self,
        text: &'a str,
    ) -> ProviderFuture<'a, Result<Vec<TaskSuggestion>, String>> {
        Box::pin(async move {
            let reply = self
                .chat(TASKS_SYSTEM_PROMPT, &build_tasks_user_prompt(text))
                .await?;
            parse_task_suggestions(&reply)
        })
    }

    fn suggest_related_terms<'a>(
        &'a self,
        term: &'a str,
    ) -> ProviderFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move {
            let reply = self
                .chat(TERMS_SYSTEM_PROMPT, &build_terms_user_prompt(term))
                .await?;
            parse_term_list(&reply)
        })
    }
}
