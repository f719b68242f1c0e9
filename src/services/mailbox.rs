use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;

pub type MailboxBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Deserialize)]
pub struct MailMessage {
    pub subject: String,
    pub body: String,
}

/// Message lookup against the mailbox provider. Used by intake only when a
/// fingerprint is neither cached nor already in flight.
pub trait MailboxClient: Send + Sync {
    fn get_message<'a>(
        &'a self,
        account_id: &'a str,
        message_id: &'a str,
    ) -> MailboxBoxFuture<'a, Result<MailMessage, String>>;
}

pub struct HttpMailboxClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpMailboxClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| format!("build mailbox http client failed: {e}"))?;
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, String> {
        Self::new(cfg.mailbox_base_url.clone(), cfg.mailbox_api_key.clone())
    }
}

impl MailboxClient for HttpMailboxClient {
    fn get_message<'a>(
        &'a self,
        account_id: &'a str,
        message_id: &'a str,
    ) -> MailboxBoxFuture<'a, Result<MailMessage, String>> {
        Box::pin(async move {
            let url = format!(
                "{}/accounts/{}/messages/{}",
                self.base_url.trim_end_matches('/'),
                account_id,
                message_id
            );

            let mut request = self.client.get(&url);
            if !self.api_key.trim().is_empty() {
                request = request.bearer_auth(self.api_key.trim());
            }

            let response = request
                .send()
                .await
                .map_err(|e| format!("mailbox request failed: {e}"))?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!("mailbox error (status {status}) for message {message_id}"));
            }

            response
                .json::<MailMessage>()
                .await
                .map_err(|e| format!("mailbox returned invalid message payload: {e}"))
        })
    }
}
