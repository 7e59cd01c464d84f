use std::collections::HashSet;

use color_eyre::Result;
use color_eyre::eyre::{Context, OptionExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::ports::ArtistRecommender;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-3.5-turbo";

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    prompt: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            prompt: config.prompt.clone(),
        }
    }
}

#[async_trait::async_trait]
impl ArtistRecommender for OpenAiClient {
    /// One completion request per run. The model is expected to reply
    /// with one artist name per line.
    async fn recommend(&self, roster: &[String]) -> Result<Vec<String>> {
        let full_prompt = format!("{}\n{}", self.prompt, roster.join("\n"));

        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: &full_prompt,
            }],
            temperature: 0.5,
            max_tokens: 150,
        };

        log::debug!("Requesting recommendations for {} artists", roster.len());

        let response: ChatResponse = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .wrap_err("Failed to send OpenAI completion request")?
            .error_for_status()
            .wrap_err("OpenAI completion request was rejected")?
            .json()
            .await
            .wrap_err("Failed to parse OpenAI completion response")?;

        let reply = response
            .choices
            .first()
            .ok_or_eyre("OpenAI response contained no choices")?;

        Ok(parse_recommendations(&reply.message.content))
    }
}

/// Split a reply into candidate names: one per line, trimmed, blank lines
/// dropped, duplicates collapsed. First-seen order is kept but callers
/// must not rely on it.
fn parse_recommendations(reply: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_lines() {
        let parsed = parse_recommendations("Bon Iver\nFleet Foxes");
        assert_eq!(parsed, vec!["Bon Iver", "Fleet Foxes"]);
    }

    #[test]
    fn test_parse_deduplicates() {
        let parsed = parse_recommendations("Bon Iver\nFleet Foxes\nFleet Foxes");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains(&"Bon Iver".to_string()));
        assert!(parsed.contains(&"Fleet Foxes".to_string()));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let parsed = parse_recommendations("  Bon Iver \n\tFleet Foxes\t");
        assert_eq!(parsed, vec!["Bon Iver", "Fleet Foxes"]);
    }

    #[test]
    fn test_parse_collapses_whitespace_differing_duplicates() {
        let parsed = parse_recommendations("Fleet Foxes\n  Fleet Foxes  \nFleet Foxes\t");
        assert_eq!(parsed, vec!["Fleet Foxes"]);
    }

    #[test]
    fn test_parse_drops_blank_lines() {
        let parsed = parse_recommendations("Bon Iver\n\n   \nFleet Foxes\n");
        assert_eq!(parsed, vec!["Bon Iver", "Fleet Foxes"]);
    }

    #[test]
    fn test_parse_empty_reply() {
        assert!(parse_recommendations("").is_empty());
    }
}
