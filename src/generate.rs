//! Text generation through the Gemini `generateContent` REST endpoint.
//!
//! The renderer only ever sees the returned string; everything here is a thin
//! client around one POST request.

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

use crate::config::GenerationConfig;
use crate::error::GenerateError;
use crate::lesson::{LessonInput, build_prompt};

/// Anything that can turn a prompt into generated text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Validate the input, build the prompt and ask the generator for text.
pub fn generate_lesson(
    generator: &dyn TextGenerator,
    input: &LessonInput,
) -> Result<String, GenerateError> {
    input.validate()?;
    let prompt = build_prompt(input);
    tracing::info!(subject = %input.subject, "requesting lesson plan");
    let text = generator.generate(&prompt)?;
    tracing::info!(chars = text.len(), "lesson plan received");
    Ok(text)
}

pub struct GeminiClient {
    agent: Agent,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig, api_key: String) -> Self {
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Self {
            agent: agent(Duration::from_secs(config.timeout_secs)),
            url,
            api_key,
        }
    }

    /// Build a client with the API key read from the configured environment variable.
    pub fn from_env(config: &GenerationConfig) -> Result<Self, GenerateError> {
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(config, key)),
            _ => Err(GenerateError::MissingApiKey(config.api_key_env.clone())),
        }
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let payload = request_body(prompt);
        tracing::debug!(url = %self.url, "POST generateContent");

        let mut body = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.as_str())
            .send(payload.as_bytes())?
            .into_body();

        let raw = body.read_to_string()?;
        extract_text(&raw)
    }
}

/// HTTP agent using native-tls with the platform's root certificates.
fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .build()
        .into()
}

fn request_body(prompt: &str) -> String {
    serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    })
    .to_string()
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(raw: &str) -> Result<String, GenerateError> {
    let response: GenerateResponse = serde_json::from_str(raw)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeGenerator {
        reply: Result<String, ()>,
        seen: RefCell<Option<String>>,
    }

    impl TextGenerator for FakeGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            *self.seen.borrow_mut() = Some(prompt.to_string());
            self.reply.clone().map_err(|_| GenerateError::EmptyResponse)
        }
    }

    fn input() -> LessonInput {
        LessonInput {
            subject: "Matematika".to_string(),
            learning_outcomes: "Bilangan".to_string(),
            learning_objectives: "Menjumlah".to_string(),
            ..LessonInput::default()
        }
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r##"{
            "candidates": [
                {"content": {"parts": [{"text": "# Judul\n"}, {"text": "- a"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 10}
        }"##;
        assert_eq!(extract_text(raw).unwrap(), "# Judul\n- a");
    }

    #[test]
    fn no_candidates_is_empty_response() {
        assert!(matches!(
            extract_text(r#"{"candidates": []}"#),
            Err(GenerateError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(GenerateError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        assert!(matches!(
            extract_text("<html>oops</html>"),
            Err(GenerateError::Decode(_))
        ));
    }

    #[test]
    fn request_body_shape() {
        let body: serde_json::Value = serde_json::from_str(&request_body("hi \"x\"")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi \"x\"");
    }

    #[test]
    fn url_from_config() {
        let config = GenerationConfig {
            endpoint: "https://example.test/v1beta/".to_string(),
            model: "m-1".to_string(),
            ..GenerationConfig::default()
        };
        let client = GeminiClient::new(&config, "k".to_string());
        assert_eq!(client.url, "https://example.test/v1beta/models/m-1:generateContent");
    }

    #[test]
    fn missing_api_key() {
        let config = GenerationConfig {
            api_key_env: "LESSONPLAN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..GenerationConfig::default()
        };
        let err = GeminiClient::from_env(&config).err().unwrap();
        assert_eq!(
            err.to_string(),
            "generation failed: environment variable LESSONPLAN_TEST_KEY_THAT_IS_NEVER_SET is not set"
        );
    }

    #[test]
    fn generate_lesson_sends_built_prompt() {
        let fake = FakeGenerator {
            reply: Ok("# MODUL AJAR: MATEMATIKA".to_string()),
            seen: RefCell::new(None),
        };
        let text = generate_lesson(&fake, &input()).unwrap();
        assert_eq!(text, "# MODUL AJAR: MATEMATIKA");
        let prompt = fake.seen.borrow().clone().unwrap();
        assert!(prompt.contains("# MODUL AJAR: MATEMATIKA\n"));
    }

    #[test]
    fn generate_lesson_validates_before_calling() {
        let fake = FakeGenerator {
            reply: Ok("unused".to_string()),
            seen: RefCell::new(None),
        };
        let mut bad = input();
        bad.learning_objectives.clear();
        assert!(generate_lesson(&fake, &bad).is_err());
        assert!(fake.seen.borrow().is_none());
    }
}
