use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Everything the suggester is told about the address book.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub contact_name: String,
    pub existing_contact_names: Vec<String>,
    pub family_group_names: Vec<String>,
    pub friend_group_names: Vec<String>,
}

/// A group name proposed for a contact, with confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSuggestion {
    pub suggested_group: Option<String>,
    pub confidence: f64,
}

/// Anything that can propose a group for a contact name. The suggestion is
/// advisory: callers look the name up themselves.
pub trait GroupSuggester {
    fn suggest(&self, request: &SuggestionRequest) -> Result<GroupSuggestion, String>;
}

/// Asks a local Ollama model for a suggestion.
pub struct OllamaSuggester {
    url: String,
    model: String,
}

impl OllamaSuggester {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ollama_url.clone(), config.model.clone())
    }

    /// Check that Ollama is running and reachable.
    pub fn check(&self) -> Result<(), String> {
        ureq::get(&self.url)
            .timeout(std::time::Duration::from_secs(3))
            .call()
            .map_err(|_| format!(
                "Cannot connect to Ollama at {}. Is it running?\n  Install: https://ollama.ai\n  Start:   ollama serve",
                self.url
            ))?;
        Ok(())
    }
}

impl GroupSuggester for OllamaSuggester {
    fn suggest(&self, request: &SuggestionRequest) -> Result<GroupSuggestion, String> {
        let system_prompt = format!(
            r#"You are a contact management assistant helping users organize their contacts.
Existing contacts: [{contacts}]
Family groups: [{family}]
Friend groups: [{friends}]
Respond with JSON only, no other text.
JSON schema: {{ "suggestedGroup": "..." | null, "confidence": 0.0 }}
Rules:
- Suggest whether the contact belongs in one of the family or friend groups above, based on name similarity with existing contacts.
- suggestedGroup must be copied exactly from one of the listed group names, or null if no suggestion is appropriate.
- confidence is a number between 0 and 1."#,
            contacts = request.existing_contact_names.join(", "),
            family = request.family_group_names.join(", "),
            friends = request.friend_group_names.join(", "),
        );

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": request.contact_name }
            ],
            "format": "json",
            "stream": false
        });

        let api_url = format!("{}/api/chat", self.url);
        log::debug!("requesting group suggestion for {} from {}", request.contact_name, api_url);

        let response = ureq::post(&api_url)
            .set("Content-Type", "application/json")
            .timeout(std::time::Duration::from_secs(120))
            .send_json(request_body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let body = resp.into_string().unwrap_or_default();
                    let snippet: String = body.chars().take(200).collect();
                    format!("Ollama request failed (HTTP {}): {}", code, snippet)
                }
                ureq::Error::Transport(t) => {
                    if t.to_string().contains("timed out") {
                        "Request timed out. Local models can be slow on first run, try again.".into()
                    } else {
                        format!("Could not connect to Ollama: {}", t)
                    }
                }
            })?;

        let json: serde_json::Value = response
            .into_json()
            .map_err(|e| format!("Failed to parse Ollama response: {}", e))?;

        let content = json
            .pointer("/message/content")
            .and_then(|v| v.as_str())
            .ok_or("No content in Ollama response")?;

        parse_suggestion_json(content)
    }
}

/// Reads the model's JSON answer. Accepts camelCase or snake_case keys and
/// clamps confidence into `[0, 1]`; a blank group name means no suggestion.
pub fn parse_suggestion_json(content: &str) -> Result<GroupSuggestion, String> {
    let json: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("Failed to parse LLM response: {}", e))?;

    if !json.is_object() {
        return Err("LLM response is not a JSON object".into());
    }

    let suggested_group = json
        .get("suggestedGroup")
        .or_else(|| json.get("suggested_group"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"));

    let confidence = json
        .get("confidence")
        .and_then(|v| v.as_f64())
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    Ok(GroupSuggestion {
        suggested_group,
        confidence,
    })
}
