//! Vision inference client
//!
//! Sends image bytes to the Gemini `generateContent` endpoint with a
//! schema-constrained JSON response, so the breed analysis comes back as
//! structured data rather than free text.

use crate::models::BreedGuess;
use crate::types::{InferenceError, VisionAnalysis, VisionInference};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const USER_AGENT: &str = "breedscan/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

const INSTRUCTION_PROMPT: &str = "Analyze the provided image to identify the dog's breed.\n\
    1. Determine if a dog is present in the image.\n\
    2. If a dog is present, identify its breed(s) and confidence scores. \
    For mixed breeds, list the top components.\n\
    3. Provide one interesting or fun fact about the most prominent breed identified.\n\
    4. Respond strictly in the provided JSON format. If no dog is found, set 'isDog' \
    to false and provide empty information.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Schema the model is constrained to answer with
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "isDog": {
                "type": "BOOLEAN",
                "description": "Is there a dog in the photo? Must be true or false."
            },
            "breeds": {
                "type": "ARRAY",
                "description": "Identified dog breeds and their confidence scores. \
                    Always provide at least one breed if a dog is present, even if \
                    confidence is low.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "Name of the dog breed. E.g., 'Labrador Retriever' or 'Mixed Breed'."
                        },
                        "percentage": {
                            "type": "NUMBER",
                            "description": "Confidence score from 0 to 100."
                        }
                    },
                    "required": ["name", "percentage"]
                }
            },
            "interestingFact": {
                "type": "STRING",
                "description": "A fun or interesting fact about the primary identified breed. \
                    If no dog is detected, provide an empty string."
            }
        },
        "required": ["isDog", "breeds", "interestingFact"]
    })
}

/// Gemini-backed vision inference client
pub struct VisionClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Result<Self, InferenceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    fn build_request(&self, image: &[u8]) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: BASE64.encode(image),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(INSTRUCTION_PROMPT.to_string()),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature: 0.2,
            },
        }
    }
}

/// Parse the model's JSON text into a sorted analysis
///
/// Breeds are re-sorted descending by confidence regardless of the order the
/// model produced; the orchestrator and presenters rely on index 0 being the
/// primary breed.
fn parse_analysis(text: &str) -> Result<VisionAnalysis, InferenceError> {
    let mut analysis: VisionAnalysis = serde_json::from_str(text.trim())
        .map_err(|e| InferenceError::Parse(e.to_string()))?;
    sort_breeds(&mut analysis.breeds);
    Ok(analysis)
}

fn sort_breeds(breeds: &mut [BreedGuess]) {
    breeds.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

#[async_trait::async_trait]
impl VisionInference for VisionClient {
    async fn identify(&self, image: &[u8]) -> Result<VisionAnalysis, InferenceError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, GEMINI_MODEL);
        let request = self.build_request(image);

        tracing::debug!(image_bytes = image.len(), "Querying vision inference API");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        let text = body
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| if p.is_empty() { None } else { Some(p.remove(0)) })
            .and_then(|p| p.text)
            .ok_or_else(|| {
                InferenceError::MalformedResponse("no text candidate in response".to_string())
            })?;

        let analysis = parse_analysis(&text)?;

        tracing::info!(
            is_dog = analysis.is_dog,
            breeds = analysis.breeds.len(),
            top_breed = analysis.breeds.first().map(|b| b.name.as_str()).unwrap_or("none"),
            "Vision inference completed"
        );

        Ok(analysis)
    }
}
