use clap::Parser;
use std::time::Duration;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-relay")]
#[command(about = "Rate limited relay in front of an OpenAI-compatible chat API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // API key for the completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Model identifier sent with every completion request
    #[arg(short, long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    // Base URL of the chat completions API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    // Upper bound on a single completion call, in seconds
    #[arg(long, env = "OPENAI_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout: u64,
}

impl Args {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
