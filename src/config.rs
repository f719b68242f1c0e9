#![allow(dead_code)]
use once_cell::sync::OnceCell;

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_max_files: String,
    pub cors_origins: Vec<String>,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub local_ai_base_url: String,
    pub local_ai_model: String,
    pub local_ai_api_key: String,
    pub mailbox_base_url: String,
    pub mailbox_api_key: String,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    pub fn init_global() -> Result<&'static Config, String> {
        let cfg = Config::from_env()?;
        CONFIG.set(cfg).map_err(|_| "Config already initialized".to_string())?;
        Ok(CONFIG.get().expect("config"))
    }

    pub fn get() -> &'static Config {
        CONFIG.get().expect("Config not initialized")
    }

    fn from_env() -> Result<Config, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()).unwrap_or(3002);

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_max_files = std::env::var("LOG_MAX_FILES").unwrap_or_else(|_| "7d".to_string());

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(v) => v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            Err(_) => vec!["*".to_string()],
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let openai_model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let local_ai_base_url = std::env::var("LOCAL_AI_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:11434/v1".to_string());
        let local_ai_model = std::env::var("LOCAL_AI_MODEL").unwrap_or_else(|_| "llama3.1".to_string());
        let local_ai_api_key = std::env::var("LOCAL_AI_API_KEY").unwrap_or_default();

        let mailbox_base_url = std::env::var("MAILBOX_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string());
        let mailbox_api_key = std::env::var("MAILBOX_API_KEY").unwrap_or_default();

        Ok(Config {
            app_env,
            host,
            port,
            log_level,
            log_max_files,
            cors_origins,
            openai_api_key,
            openai_base_url,
            openai_model,
            local_ai_base_url,
            local_ai_model,
            local_ai_api_key,
            mailbox_base_url,
            mailbox_api_key,
        })
    }

    pub fn print(&self) {
        println!("Current configuration:");
        println!("  - APP_ENV: {}", self.app_env);
        println!("  - HOST: {}", self.host);
        println!("  - PORT: {}", self.port);
        println!("  - LOG_LEVEL: {}", self.log_level);
        println!("  - MAILBOX_BASE_URL: {}", self.mailbox_base_url);
        println!("  - AI providers:");
        println!("    - OPENAI_BASE_URL: {}", self.openai_base_url);
        println!("    - OPENAI_MODEL: {}", self.openai_model);
        println!(
            "    - OPENAI_API_KEY: {}",
            if self.openai_api_key.is_empty() { "not set" } else { "set" }
        );
        println!("    - LOCAL_AI_BASE_URL: {}", self.local_ai_base_url);
        println!("    - LOCAL_AI_MODEL: {}", self.local_ai_model);
    }
}
