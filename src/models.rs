use serde::{Deserialize, Serialize};

// Inbound body of POST /chat, unknown fields are ignored
#[derive(Deserialize, Debug, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

// Successful body of POST /chat
#[derive(Serialize, Deserialize, Debug)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// OpenAI chat completions request format
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

// OpenAI chat completions response format.
// Every field is optional so an odd but valid JSON body still decodes.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    // legacy completions field
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    // first choice's message.content, then legacy text, None if both empty
    pub fn reply_text(&self) -> Option<&str> {
        let choice = self.choices.first()?;
        choice
            .message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.is_empty())
            .or_else(|| choice.text.as_deref().filter(|s| !s.is_empty()))
    }
}

// Error envelope returned by the provider on non-2xx responses
#[derive(Deserialize, Debug)]
pub struct ProviderErrorBody {
    pub error: ProviderErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct ProviderErrorDetail {
    pub message: String,
}
