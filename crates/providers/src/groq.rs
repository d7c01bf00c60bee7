//! Outline text from the Groq chat-completions API.

use crate::config::GroqConfig;
use deckgen_core::{DetailLevel, Error, Result, TextGenerator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are an expert presentation writer. \
Answer with the outline only, using exactly the markup you are given.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Build the user prompt for a topic.
pub fn outline_prompt(topic: &str, detail: DetailLevel) -> String {
    let shape = match detail {
        DetailLevel::Simple => {
            "Write 5 to 6 sections with 3 to 4 concise bullet points each."
        }
        DetailLevel::Detailed => {
            "Write 8 to 10 sections with 4 to 6 bullet points each. \
             Give most bullet points one or two sub-points with examples or data."
        }
    };

    format!(
        "Create a presentation outline about \"{topic}\".\n\
         {shape}\n\
         Start with an Introduction section and end with a Conclusion section.\n\n\
         Format:\n\
         *Presentation Title*\n\
         \n\
         **Section Title**\n\
         • Bullet point\n\
         \x20\x20• Sub-point, indented two spaces\n\
         \n\
         Put the title on the first line wrapped in single asterisks, wrap every \
         section title in double asterisks and start every bullet with •. \
         Do not number the sections or add any other text."
    )
}

/// Text generator backed by Groq.
pub struct GroqClient {
    config: GroqConfig,
    client: Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Upstream(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

impl TextGenerator for GroqClient {
    fn generate(&self, topic: &str, detail: DetailLevel) -> Result<String> {
        let prompt = outline_prompt(topic, detail);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        log::info!("Requesting {} outline for '{}' from {}", detail, topic, self.config.model);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Upstream(format!("Groq request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Upstream(format!("Groq returned {}: {}", status, body)));
        }

        let reply: ChatResponse = response
            .json()
            .map_err(|e| Error::Upstream(format!("Unreadable Groq response: {}", e)))?;
        reply_content(reply)
    }
}

fn reply_content(reply: ChatResponse) -> Result<String> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| Error::Upstream("Groq response had no content".into()))
}
