use std::sync::Arc;

use super::chat::{build_http_client, chat_completion};
use super::prompts::{
    build_summary_user_prompt, build_tasks_user_prompt, build_terms_user_prompt,
    parse_task_suggestions, parse_term_list, SUMMARY_SYSTEM_PROMPT, TASKS_SYSTEM_PROMPT,
    TERMS_SYSTEM_PROMPT,
};
use super::settings::LocalAiSettings;
use super::{AiProvider, ProviderFuture, TaskSuggestion};

/// Fast local OpenAI-compatible provider (e.g. an Ollama endpoint). Base URL
/// and model come from the settings accessor on every call, so runtime
/// configuration changes apply without rebuilding the provider.
pub struct LocalAiProvider {
    settings: Arc<dyn LocalAiSettings>,
    api_key: String,
    client: reqwest::Client,
}

impl LocalAiProvider {
    pub fn new(settings: Arc<dyn LocalAiSettings>, api_key: String) -> Result<Self, String> {
        Ok(Self {
            settings,
            api_key,
            client: build_http_client()?,
        })
    }

    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        let base_url = self.settings.base_url();
        let model = self.settings.model();
        chat_completion(
            &self.client,
            &base_url,
            &self.api_key,
            &model,
            system_prompt,
            user_prompt,
            "local",
        )
        .await
    }
}

impl AiProvider for LocalAiProvider {
    fn name(&self) -> &'static str {
        "local"
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
